//! The `check` management command.
//!
//! Inspects the loaded settings for inline defaults that would make the
//! manager misbehave on a page.

use async_trait::async_trait;
use inlines_core::{InlinesError, Settings};

use crate::command::ManagementCommand;

/// Validates the inline settings.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// Severity.
    pub level: CheckLevel,
    /// What is wrong.
    pub msg: String,
    /// How to fix it.
    pub hint: Option<String>,
    /// A stable identifier, e.g. `inlines.E001`.
    pub id: String,
}

impl CheckMessage {
    fn new(level: CheckLevel, id: &str, msg: impl Into<String>, hint: Option<&str>) -> Self {
        Self {
            level,
            msg: msg.into(),
            hint: hint.map(str::to_string),
            id: id.to_string(),
        }
    }
}

/// Severity levels for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// Informational message.
    Info,
    /// A warning that may indicate a problem.
    Warning,
    /// An error that must be resolved.
    Error,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Longest removal fade that still feels responsive, in milliseconds.
const MAX_TRANSITION_MS: u64 = 5_000;

/// Runs every check against `settings`.
pub fn run_checks(settings: &Settings) -> Vec<CheckMessage> {
    let inlines = &settings.inlines;
    let mut messages = Vec::new();

    let classes = [
        ("add_css_class", &inlines.add_css_class),
        ("delete_css_class", &inlines.delete_css_class),
        ("empty_css_class", &inlines.empty_css_class),
        ("form_css_class", &inlines.form_css_class),
        ("pending_css_class", &inlines.pending_css_class),
    ];
    for (name, class) in classes {
        if class.trim().is_empty() || class.contains(char::is_whitespace) {
            messages.push(CheckMessage::new(
                CheckLevel::Error,
                "inlines.E001",
                format!("{name} must be a single non-empty class, got '{class}'"),
                Some("Use one CSS class name without spaces"),
            ));
        }
    }

    if !inlines.form_css_class.is_empty() && inlines.form_css_class == inlines.empty_css_class {
        messages.push(CheckMessage::new(
            CheckLevel::Error,
            "inlines.E002",
            "form_css_class and empty_css_class are the same",
            Some("The template row would be counted as a live row"),
        ));
    }

    if inlines.prefix.is_empty() || inlines.prefix.contains(char::is_whitespace) {
        messages.push(CheckMessage::new(
            CheckLevel::Error,
            "inlines.E003",
            format!("prefix '{}' cannot be used in field names", inlines.prefix),
            None,
        ));
    }

    if inlines.add_text.trim().is_empty() {
        messages.push(CheckMessage::new(
            CheckLevel::Warning,
            "inlines.W001",
            "add_text is empty",
            Some("The add control would render without a label"),
        ));
    }

    if inlines.delete_text.trim().is_empty() {
        messages.push(CheckMessage::new(
            CheckLevel::Warning,
            "inlines.W002",
            "delete_text is empty",
            Some("Delete controls would render without a label"),
        ));
    }

    if inlines.transition_ms > MAX_TRANSITION_MS {
        messages.push(CheckMessage::new(
            CheckLevel::Warning,
            "inlines.W003",
            format!("transition_ms is {} ms", inlines.transition_ms),
            Some("Rows keep counting toward TOTAL_FORMS until the fade ends"),
        ));
    }

    if !LOG_LEVELS.contains(&settings.log_level.to_lowercase().as_str()) {
        messages.push(CheckMessage::new(
            CheckLevel::Warning,
            "logging.W001",
            format!("unknown log level '{}'", settings.log_level),
            Some("Use one of trace, debug, info, warn, error"),
        ));
    }

    if settings.debug {
        messages.push(CheckMessage::new(
            CheckLevel::Info,
            "logging.I001",
            "DEBUG is on; logs are pretty-printed",
            None,
        ));
    }

    messages
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check the inline settings for problems"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("fail-level")
                .long("fail-level")
                .value_parser(["warning", "error"])
                .default_value("error")
                .help("Lowest level that makes the command fail"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), InlinesError> {
        let fail_level = match matches.get_one::<String>("fail-level").map(String::as_str) {
            Some("warning") => CheckLevel::Warning,
            _ => CheckLevel::Error,
        };
        let messages = run_checks(settings);
        let issues: Vec<_> = messages.iter().filter(|m| m.level > CheckLevel::Info).collect();

        if issues.is_empty() {
            tracing::info!("Settings check identified no issues");
            return Ok(());
        }

        for msg in &issues {
            let hint_text = msg
                .hint
                .as_ref()
                .map_or(String::new(), |h| format!("\n\tHINT: {h}"));
            tracing::warn!("{} ({}): {}{}", msg.level, msg.id, msg.msg, hint_text);
        }

        let failing = issues.iter().filter(|m| m.level >= fail_level).count();
        tracing::info!("Settings check identified {} issue(s)", issues.len());

        if failing > 0 {
            return Err(InlinesError::ImproperlyConfigured(format!(
                "settings check found {failing} issue(s) at or above {fail_level}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass() {
        let messages = run_checks(&Settings::default());
        assert!(messages.iter().all(|m| m.level == CheckLevel::Info));
    }

    #[test]
    fn test_bad_classes() {
        let mut settings = Settings::default();
        settings.inlines.form_css_class = "row".to_string();
        settings.inlines.empty_css_class = "row".to_string();
        settings.inlines.delete_css_class = "delete row".to_string();
        let ids: Vec<String> = run_checks(&settings).into_iter().map(|m| m.id).collect();
        assert!(ids.contains(&"inlines.E001".to_string()));
        assert!(ids.contains(&"inlines.E002".to_string()));
    }

    #[test]
    fn test_warnings() {
        let mut settings = Settings::default();
        settings.inlines.add_text = " ".to_string();
        settings.inlines.transition_ms = 60_000;
        settings.log_level = "loud".to_string();
        let ids: Vec<String> = run_checks(&settings).into_iter().map(|m| m.id).collect();
        assert!(ids.contains(&"inlines.W001".to_string()));
        assert!(ids.contains(&"inlines.W003".to_string()));
        assert!(ids.contains(&"logging.W001".to_string()));
    }

    #[tokio::test]
    async fn test_handle_fails_on_errors() {
        let mut settings = Settings::default();
        settings.inlines.prefix = String::new();
        let cmd = CheckCommand;
        let matches = cmd
            .add_arguments(clap::Command::new("check"))
            .try_get_matches_from(["check"])
            .unwrap();
        assert!(cmd.handle(&matches, &settings).await.is_err());
        assert!(cmd.handle(&matches, &Settings::default()).await.is_ok());
    }
}
