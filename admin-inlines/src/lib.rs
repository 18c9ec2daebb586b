//! # admin-inlines
//!
//! Dynamic inline formsets for admin change forms.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on
//! `admin-inlines` for everything, or on the individual crates for
//! finer-grained control.
//!
//! ```rust,no_run
//! use admin_inlines::dom::Document;
//! use admin_inlines::formset::markup::FormsetMarkup;
//! use admin_inlines::formset::{init_inline_formsets, FormsetOptions};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! FormsetMarkup::tabular("item").initial(2).build(&mut doc, body).unwrap();
//!
//! let mut managers = init_inline_formsets(&mut doc, &FormsetOptions::default());
//! managers[0].add_row(&mut doc);
//! assert_eq!(managers[0].total_forms(), 3);
//! ```

/// Settings, error types, logging setup, and the multi-value dictionary.
pub use inlines_core as core;

/// Arena element tree with queries and HTML rendering.
pub use inlines_dom as dom;

/// Typed row-added and row-removed notifications.
#[cfg(feature = "signals")]
pub use inlines_signals as signals;

/// The formset manager, layout presets, markup builder, and submission checks.
#[cfg(feature = "formset")]
pub use inlines_formset as formset;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use inlines_cli as cli;

/// Re-exported third-party crates.
pub mod deps {
    pub use serde;
    pub use serde_json;
    pub use tokio;
    pub use tracing;
    pub use tracing_subscriber;
}

/// Commonly used items.
pub mod prelude {
    pub use inlines_core::{InlinesError, InlinesResult, Settings};
    pub use inlines_dom::{Document, NodeId};

    #[cfg(feature = "formset")]
    pub use inlines_formset::markup::FormsetMarkup;
    #[cfg(feature = "formset")]
    pub use inlines_formset::submission::FormsetSubmission;
    #[cfg(feature = "formset")]
    pub use inlines_formset::{init_inline_formsets, FormsetManager, FormsetOptions, InlineType};
}
