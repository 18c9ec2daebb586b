//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `INLINES_DEBUG` | `debug` |
//! | `INLINES_LOG_LEVEL` | `log_level` |
//! | `INLINES_ADD_TEXT` | `inlines.add_text` |
//! | `INLINES_DELETE_TEXT` | `inlines.delete_text` |
//! | `INLINES_TRANSITION_MS` | `inlines.transition_ms` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use inlines_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/inlines.toml").unwrap();
//! let settings = settings_loader::from_json_file_with_env("config/inlines.json").unwrap();
//! ```

use std::path::Path;

use crate::error::InlinesError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any key not present in the TOML keeps its default value, including keys
/// nested in the `[inlines]` table.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, InlinesError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| InlinesError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_into_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, InlinesError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, InlinesError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, InlinesError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| InlinesError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_into_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, InlinesError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from a JSON file and then applies environment overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, InlinesError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a file, picking the format from its extension.
///
/// `.json` files are read as JSON, everything else as TOML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, InlinesError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json_file_with_env(path),
        _ => from_toml_file_with_env(path),
    }
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Unparseable numeric values are ignored and leave the setting unchanged.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("INLINES_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("INLINES_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("INLINES_ADD_TEXT") {
        settings.inlines.add_text = val;
    }

    if let Ok(val) = std::env::var("INLINES_DELETE_TEXT") {
        settings.inlines.delete_text = val;
    }

    if let Ok(val) = std::env::var("INLINES_TRANSITION_MS") {
        if let Ok(ms) = val.trim().parse::<u64>() {
            settings.inlines.transition_ms = ms;
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, InlinesError> {
    std::fs::read_to_string(path).map_err(|e| {
        InlinesError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_into_defaults(value: serde_json::Value, format: &str) -> Result<Settings, InlinesError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        InlinesError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        InlinesError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_v) => merge_json(base_v, override_v),
                    None => override_v,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "inlines_formset=debug"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "inlines_formset=debug");
        assert_eq!(settings.inlines.add_text, "Add another");
    }

    #[test]
    fn test_from_toml_str_partial_inline_table() {
        let toml = r#"
            [inlines]
            delete_text = "Delete"
            transition_ms = 0
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.inlines.delete_text, "Delete");
        assert_eq!(settings.inlines.transition_ms, 0);
        // Siblings in the same table keep their defaults.
        assert_eq!(settings.inlines.form_css_class, "dynamic-form");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings.inlines, crate::settings::InlineDefaults::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(from_toml_str("this is [not valid").is_err());
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let err = from_toml_str("[inlines]\ntransition_ms = \"slow\"").unwrap_err();
        assert!(err.to_string().contains("deserialize"));
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{"debug": false, "inlines": {"add_text": "Add task"}}"#;
        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.inlines.add_text, "Add task");
        assert_eq!(settings.inlines.delete_text, "Remove");
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inlines.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_from_file_picks_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inlines.json");
        std::fs::write(&path, r#"{"inlines": {"prefix": "task"}}"#).unwrap();

        let settings = from_file_with_env(&path).unwrap();
        assert_eq!(settings.inlines.prefix, "task");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/nonexistent/path/inlines.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    // ── Environment variable overrides ──────────────────────────────

    #[test]
    fn test_env_overrides() {
        std::env::set_var("INLINES_DELETE_TEXT", "Drop");
        std::env::set_var("INLINES_TRANSITION_MS", "125");
        let settings = from_env();
        assert_eq!(settings.inlines.delete_text, "Drop");
        assert_eq!(settings.inlines.transition_ms, 125);
        std::env::remove_var("INLINES_DELETE_TEXT");
        std::env::remove_var("INLINES_TRANSITION_MS");
    }

    #[test]
    fn test_toml_with_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inlines_env.toml");
        std::fs::write(&path, "[inlines]\nadd_text = \"Add row\"\n").unwrap();

        std::env::set_var("INLINES_ADD_TEXT", "Add from env");
        let settings = from_toml_file_with_env(&path).unwrap();
        assert_eq!(settings.inlines.add_text, "Add from env");
        std::env::remove_var("INLINES_ADD_TEXT");
    }

    // ── merge_json helper ───────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"outer": {"a": 1, "b": 2}});
        let over = serde_json::json!({"outer": {"b": 3}});
        let merged = merge_json(base, over);
        assert_eq!(merged["outer"]["a"], 1);
        assert_eq!(merged["outer"]["b"], 3);
    }

    #[test]
    fn test_merge_json_array_override() {
        let base = serde_json::json!({"list": [1, 2, 3]});
        let over = serde_json::json!({"list": [4, 5]});
        assert_eq!(merge_json(base, over)["list"], serde_json::json!([4, 5]));
    }
}
