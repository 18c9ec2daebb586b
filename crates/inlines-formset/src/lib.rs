//! # inlines-formset
//!
//! The inline formset manager: keeps a group of repeated form rows, their
//! index-encoded field names, and the hidden management counters consistent
//! while rows are added and removed on a page.
//!
//! ## Modules
//!
//! - [`options`] - Per-formset configuration and hooks
//! - [`index`] - Relabelling `prefix-<n>` in `name`/`id`/`for` attributes
//! - [`management`] - The `TOTAL_FORMS`/`MIN_NUM_FORMS`/`MAX_NUM_FORMS` counters
//! - [`manager`] - [`FormsetManager`]: attach, add, remove, renumber
//! - [`events`] - Row-added and row-removed notification payloads
//! - [`widgets`] - Re-initialization of date/time, select-filter, and prepopulated widgets
//! - [`presets`] - Tabular and stacked inline configurations
//! - [`bootstrap`] - Discovering and attaching every inline formset on a page
//! - [`markup`] - Rendering a server-side inline formset into a document
//! - [`submission`] - Collecting and validating a submitted formset

pub mod bootstrap;
pub mod events;
pub mod index;
pub mod management;
pub mod manager;
pub mod markup;
pub mod options;
pub mod presets;
pub mod submission;
pub mod widgets;

pub use bootstrap::init_inline_formsets;
pub use events::{RowAdded, RowRemoved};
pub use manager::{FormsetManager, RowId, RowState};
pub use options::FormsetOptions;
pub use presets::{InlineOptions, InlineType};
