//! # inlines-cli
//!
//! The `inlines` management binary and its command framework.
//!
//! - `inlines simulate` renders an inline formset, replays add/remove
//!   operations, and reports the counters after each step.
//! - `inlines check` validates a settings file.
//!
//! ## Quick Start
//!
//! ```rust
//! use inlines_cli::command::CommandRegistry;
//! use inlines_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! assert_eq!(registry.list_commands(), vec!["check", "simulate"]);
//! ```

// - result_large_err: InlinesError is the workspace-wide error type
// - unused_async: command handlers keep one async signature
#![allow(clippy::result_large_err)]
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};

use std::path::Path;

use inlines_core::{settings_loader, InlinesResult, Settings};

/// Loads settings from `path` when given, otherwise from defaults, with
/// `INLINES_*` environment overrides applied either way.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_settings(path: Option<&Path>) -> InlinesResult<Settings> {
    match path {
        Some(path) => settings_loader::from_file_with_env(path),
        None => Ok(settings_loader::from_env()),
    }
}
