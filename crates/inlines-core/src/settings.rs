//! Settings for admin-inlines.
//!
//! [`Settings`] holds the logging configuration and the [`InlineDefaults`]
//! that every formset manager starts from. There is no process-wide settings
//! instance: callers load a `Settings` value and derive per-formset options
//! from it explicitly.

use serde::{Deserialize, Serialize};

/// Default texts, CSS classes, and timings applied to every inline formset.
///
/// A page may still override the prefix and the add/delete texts per formset
/// through its embedded options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineDefaults {
    /// The formset prefix used when a page does not supply one.
    pub prefix: String,
    /// Text of the add control.
    pub add_text: String,
    /// Text of each delete control.
    pub delete_text: String,
    /// Class of the element wrapping the add control.
    pub add_css_class: String,
    /// Class of each delete control.
    pub delete_css_class: String,
    /// Class marking the template row.
    pub empty_css_class: String,
    /// Class marking a live row.
    pub form_css_class: String,
    /// Class set on a row while its removal transition runs.
    pub pending_css_class: String,
    /// Length of the removal fade, in milliseconds.
    pub transition_ms: u64,
}

impl Default for InlineDefaults {
    fn default() -> Self {
        Self {
            prefix: "form".to_string(),
            add_text: "Add another".to_string(),
            delete_text: "Remove".to_string(),
            add_css_class: "add-row".to_string(),
            delete_css_class: "delete-row".to_string(),
            empty_css_class: "empty-row".to_string(),
            form_css_class: "dynamic-form".to_string(),
            pending_css_class: "removing".to_string(),
            transition_ms: 300,
        }
    }
}

/// The complete set of admin-inlines settings.
///
/// # Examples
///
/// ```
/// use inlines_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.inlines.add_text, "Add another");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log filter directive (e.g. "info", "inlines_formset=debug").
    pub log_level: String,
    /// Defaults applied to every formset manager.
    pub inlines: InlineDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            inlines: InlineDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn test_default_inline_classes() {
        let d = InlineDefaults::default();
        assert_eq!(d.prefix, "form");
        assert_eq!(d.delete_text, "Remove");
        assert_eq!(d.add_css_class, "add-row");
        assert_eq!(d.delete_css_class, "delete-row");
        assert_eq!(d.empty_css_class, "empty-row");
        assert_eq!(d.form_css_class, "dynamic-form");
        assert_eq!(d.transition_ms, 300);
    }

    #[test]
    fn test_settings_roundtrip_through_json() {
        let mut s = Settings::default();
        s.inlines.transition_ms = 0;
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["inlines"]["transition_ms"], 0);
        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back.inlines, s.inlines);
    }
}
