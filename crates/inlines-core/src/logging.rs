//! Logging integration for admin-inlines.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-formset spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise a structured JSON format.
/// Installing a second subscriber is silently ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one formset.
///
/// Every event a manager emits is recorded inside this span, so log lines
/// from different formsets on the same page can be told apart by prefix.
///
/// # Examples
///
/// ```
/// use inlines_core::logging::formset_span;
///
/// let span = formset_span("task");
/// let _guard = span.enter();
/// tracing::debug!("row added");
/// ```
pub fn formset_span(prefix: &str) -> tracing::Span {
    tracing::debug_span!("formset", prefix = prefix)
}
