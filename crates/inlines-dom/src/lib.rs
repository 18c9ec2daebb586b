//! # inlines-dom
//!
//! An in-memory element tree standing in for a server-rendered admin page.
//!
//! Nodes live in an arena owned by a [`Document`] and are addressed by
//! [`NodeId`]. Removing a node only detaches it from its parent, so ids held
//! by callers stay valid (the node simply stops being part of the page).
//!
//! ## Modules
//!
//! - [`node`] - Node ids and element data
//! - [`document`] - The arena, tree mutation, and queries
//! - [`render`] - Serializing a subtree back to HTML

pub mod document;
pub mod node;
pub mod render;

pub use document::Document;
pub use node::{Element, NodeId, NodeKind};
pub use render::escape_html;
