//! # inlines-core
//!
//! Core types, settings, and error types shared by the admin-inlines crates.
//! This crate has no dependency on the element tree or the formset manager.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`utils`] - Utility types (`MultiValueDict`)
//! - [`settings`] - Inline formset defaults and logging configuration
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{InlinesError, InlinesResult, ValidationError};
pub use settings::{InlineDefaults, Settings};
