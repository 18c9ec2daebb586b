//! Core error types for admin-inlines.
//!
//! Formset operations themselves never fail: a missing template or counter
//! turns an operation into a no-op. Errors are reserved for the edges of the
//! system, i.e. loading configuration, parsing the options a page embeds,
//! and validating a submitted formset the way the server would.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Represents a validation error with optional field-level errors.
///
/// # Examples
///
/// ```
/// use inlines_core::error::ValidationError;
///
/// let err = ValidationError::new("Please submit at least 2 forms.", "too_few_forms")
///     .with_param("min_num", "2");
/// assert_eq!(err.to_string(), "Please submit at least 2 forms.");
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the failure (e.g. "missing_management_form").
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
    /// Per-field validation errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` containing per-field errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<Self>>) -> Self {
        Self {
            message: String::new(),
            code: String::new(),
            params: HashMap::new(),
            field_errors,
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        } else if !self.field_errors.is_empty() {
            let mut fields: Vec<&String> = self.field_errors.keys().collect();
            fields.sort();
            let mut first = true;
            for field in fields {
                for error in &self.field_errors[field] {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {error}")?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for admin-inlines.
#[derive(Error, Debug)]
pub enum InlinesError {
    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A page embeds formset options that cannot be used.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A page declares an inline layout other than `stacked` or `tabular`.
    #[error("Unknown inline type: {0}")]
    UnknownInlineType(String),

    // ── Validation ───────────────────────────────────────────────────

    /// A submitted formset failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ValidationError> for InlinesError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

impl From<serde_json::Error> for InlinesError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl InlinesError {
    /// Returns `true` for errors caused by the page markup rather than by
    /// the local configuration.
    pub const fn is_markup_error(&self) -> bool {
        matches!(
            self,
            Self::ImproperlyConfigured(_) | Self::UnknownInlineType(_) | Self::SerializationError(_)
        )
    }
}

/// A convenience type alias for `Result<T, InlinesError>`.
pub type InlinesResult<T> = Result<T, InlinesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("Please submit at most 3 forms.", "too_many_forms");
        assert_eq!(err.to_string(), "Please submit at most 3 forms.");
    }

    #[test]
    fn test_validation_error_display_field_errors_sorted() {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "task-1-title".to_string(),
            vec![ValidationError::new("Unexpected index.", "invalid")],
        );
        field_errors.insert(
            "task-0-title".to_string(),
            vec![ValidationError::new("Missing.", "required")],
        );
        let err = ValidationError::with_field_errors(field_errors);
        assert_eq!(
            err.to_string(),
            "task-0-title: Missing.; task-1-title: Unexpected index."
        );
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too few.", "too_few_forms").with_param("min_num", "2");
        assert_eq!(err.params.get("min_num").unwrap(), "2");
    }

    #[test]
    fn test_inlines_error_display() {
        let err = InlinesError::UnknownInlineType("grid".into());
        assert_eq!(err.to_string(), "Unknown inline type: grid");
        assert!(err.is_markup_error());
        assert!(!InlinesError::ConfigurationError("x".into()).is_markup_error());
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: InlinesError = ValidationError::new("bad", "invalid").into();
        assert!(matches!(err, InlinesError::ValidationError(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: InlinesError = json_err.into();
        assert!(err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: InlinesError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
