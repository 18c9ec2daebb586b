//! Relabelling the row index embedded in field attributes.
//!
//! Every field of row `n` in formset `task` is named `task-n-<field>`, has id
//! `id_task-n-<field>`, and its label points at it with `for`. The template
//! row uses the placeholder `__prefix__` in place of `n`. Moving a row to a
//! new position means rewriting the first `task-<n|__prefix__>` occurrence in
//! each of those three attributes.

use std::borrow::Cow;

use inlines_dom::{Document, NodeId};
use regex::Regex;

/// The placeholder used by the template row instead of an index.
pub const TEMPLATE_PLACEHOLDER: &str = "__prefix__";

/// Attributes that embed the row index.
const INDEXED_ATTRS: [&str; 3] = ["for", "id", "name"];

/// Where an attribute value places its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowIndex {
    /// A live row at this index.
    Index(usize),
    /// The template row.
    Template,
}

/// A compiled `prefix-(<digits>|__prefix__)` matcher for one formset.
#[derive(Debug, Clone)]
pub struct IndexPattern {
    prefix: String,
    regex: Regex,
}

impl IndexPattern {
    /// Compiles the matcher for a prefix. The prefix is matched literally.
    pub fn new(prefix: &str) -> Self {
        let pattern = format!(
            "({}-(\\d+|{TEMPLATE_PLACEHOLDER}))",
            regex::escape(prefix)
        );
        Self {
            prefix: prefix.to_string(),
            regex: Regex::new(&pattern).expect("escaped prefix always forms a valid pattern"),
        }
    }

    /// Returns the prefix this pattern matches.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Rewrites the first index occurrence in `value` to `index`.
    pub fn relabel<'a>(&self, value: &'a str, index: usize) -> Cow<'a, str> {
        let replacement = format!("{}-{index}", self.prefix);
        self.regex.replacen(value, 1, regex::NoExpand(&replacement))
    }

    /// Returns the row that `value` refers to, if any.
    pub fn row_index(&self, value: &str) -> Option<RowIndex> {
        let caps = self.regex.captures(value)?;
        let raw = caps.get(2)?.as_str();
        if raw == TEMPLATE_PLACEHOLDER {
            return Some(RowIndex::Template);
        }
        raw.parse().ok().map(RowIndex::Index)
    }

    /// Rewrites the `for`, `id`, and `name` attributes of one element.
    ///
    /// Empty or absent attributes are left alone.
    pub fn update_element_index(&self, doc: &mut Document, node: NodeId, index: usize) {
        let Some(element) = doc.element_mut(node) else {
            return;
        };
        for attr in INDEXED_ATTRS {
            let updated = match element.attr(attr) {
                Some(current) if !current.is_empty() => match self.relabel(current, index) {
                    Cow::Owned(updated) => updated,
                    Cow::Borrowed(_) => continue,
                },
                _ => continue,
            };
            element.set_attr(attr, updated);
        }
    }

    /// Rewrites every element below `root` (and `root` itself when
    /// `include_root` is set).
    pub fn relabel_subtree(&self, doc: &mut Document, root: NodeId, index: usize, include_root: bool) {
        if include_root {
            self.update_element_index(doc, root, index);
        }
        for node in doc.descendants(root) {
            self.update_element_index(doc, node, index);
        }
    }
}

/// Returns the `name` of field `field` in row `index`.
pub fn field_name(prefix: &str, index: usize, field: &str) -> String {
    format!("{prefix}-{index}-{field}")
}

/// Returns the element id of field `field` in row `index`.
pub fn field_id(prefix: &str, index: usize, field: &str) -> String {
    format!("id_{prefix}-{index}-{field}")
}

/// Returns the element id of the row at `index`.
pub fn row_id(prefix: &str, index: usize) -> String {
    format!("{prefix}-{index}")
}

/// Returns the element id of the template row.
pub fn template_id(prefix: &str) -> String {
    format!("{prefix}-empty")
}
