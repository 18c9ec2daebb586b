//! Discovering and attaching every inline formset on a page.
//!
//! The admin marks each inline with `.js-inline-admin-formset` and two data
//! attributes: `data-inline-type` (`tabular` or `stacked`) and
//! `data-inline-formset`, a JSON object naming the group and carrying the
//! preset options:
//!
//! ```json
//! {"name": "#task", "options": {"prefix": "task", "addText": "Add another Task", "deleteText": "Remove"}}
//! ```

use inlines_core::{InlinesError, InlinesResult};
use inlines_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};

use crate::manager::FormsetManager;
use crate::options::FormsetOptions;
use crate::presets::{self, InlineOptions, InlineType, INLINE_RELATED_CLASS};

/// Class marking an inline formset container.
pub const INLINE_FORMSET_CLASS: &str = "js-inline-admin-formset";

/// The `data-inline-formset` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineFormsetData {
    /// The group selector, e.g. `#task`.
    pub name: String,
    /// The preset options.
    pub options: InlineOptions,
}

impl InlineFormsetData {
    /// Returns the id of the group element, `<name>-group`.
    pub fn group_id(&self) -> String {
        format!("{}-group", self.name.trim_start_matches('#'))
    }
}

/// Attaches a manager to every inline formset on the page.
///
/// Containers that cannot be attached are logged and skipped so the rest of
/// the page stays interactive. Managers are returned in document order.
///
/// Each formset gets its own add control; an `add_button` in `base` is
/// ignored here since one element cannot serve several prefixes.
pub fn init_inline_formsets(doc: &mut Document, base: &FormsetOptions) -> Vec<FormsetManager> {
    let mut base = base.clone();
    if base.add_button.take().is_some() {
        tracing::debug!("page-level add button ignored during bootstrap");
    }
    let containers = doc.find_by_class(doc.root(), INLINE_FORMSET_CLASS);
    let mut managers = Vec::with_capacity(containers.len());
    for container in containers {
        match try_init_inline_formset(doc, container, &base) {
            Ok(Some(manager)) => managers.push(manager),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%err, container = %container, "inline formset not initialized");
            }
        }
    }
    tracing::debug!(count = managers.len(), "inline formsets initialized");
    managers
}

/// Attaches a manager to one `.js-inline-admin-formset` container.
///
/// Returns `Ok(None)` when the container carries no options or its group is
/// not on the page.
///
/// # Errors
///
/// Returns [`InlinesError::UnknownInlineType`] for an unrecognized
/// `data-inline-type` and [`InlinesError::SerializationError`] when
/// `data-inline-formset` is not valid JSON.
pub fn try_init_inline_formset(
    doc: &mut Document,
    container: NodeId,
    base: &FormsetOptions,
) -> InlinesResult<Option<FormsetManager>> {
    let Some(raw) = doc.attr(container, "data-inline-formset") else {
        tracing::trace!(container = %container, "no inline formset data");
        return Ok(None);
    };
    let data: InlineFormsetData = serde_json::from_str(raw)?;
    let inline_type: InlineType = doc
        .attr(container, "data-inline-type")
        .ok_or_else(|| InlinesError::UnknownInlineType(String::new()))?
        .parse()?;

    let Some(group) = doc.by_id(&data.group_id()) else {
        tracing::trace!(group = %data.group_id(), "inline group missing");
        return Ok(None);
    };
    let rows = select_rows(doc, group, inline_type);
    Ok(Some(presets::attach_preset(
        doc,
        inline_type,
        &rows,
        &data.options,
        base,
    )))
}

/// Returns the row set of a group, template included.
///
/// Stacked rows are the `.inline-related` blocks of the group. Tabular rows
/// are the `tr.form-row` children of the first `tbody` inside the group's
/// `.tabular.inline-related` wrapper.
pub fn select_rows(doc: &Document, group: NodeId, inline_type: InlineType) -> Vec<NodeId> {
    match inline_type {
        InlineType::Stacked => doc.find_by_class(group, INLINE_RELATED_CLASS),
        InlineType::Tabular => doc
            .find(group, |e| e.has_class("tabular") && e.has_class(INLINE_RELATED_CLASS))
            .first()
            .and_then(|wrapper| doc.find_by_tag(*wrapper, "tbody").first().copied())
            .map(|tbody| {
                doc.element_children(tbody)
                    .into_iter()
                    .filter(|n| doc.tag(*n) == Some("tr") && doc.has_class(*n, "form-row"))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{FieldKind, FormsetMarkup};

    #[test]
    fn test_group_id() {
        let data: InlineFormsetData = serde_json::from_str(
            r##"{"name": "#task", "options": {"prefix": "task", "addText": "Add", "deleteText": "Remove"}}"##,
        )
        .unwrap();
        assert_eq!(data.group_id(), "task-group");
    }

    #[test]
    fn test_select_rows_tabular_includes_template() {
        let mut doc = Document::new();
        let body = doc.body();
        let rendered = FormsetMarkup::tabular("task")
            .field("title", FieldKind::Text)
            .extra(2)
            .row_error(1, "Required")
            .build(&mut doc, body)
            .unwrap();
        let rows = select_rows(&doc, rendered.group, InlineType::Tabular);
        assert_eq!(rows, rendered.selection());
    }

    #[test]
    fn test_missing_data_is_skipped() {
        let mut doc = Document::new();
        let body = doc.body();
        let container = doc.create_element_with("div", &[("class", INLINE_FORMSET_CLASS)]);
        doc.append_child(body, container);
        let result = try_init_inline_formset(&mut doc, container, &FormsetOptions::default());
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let mut doc = Document::new();
        let body = doc.body();
        let rendered = FormsetMarkup::tabular("task").build(&mut doc, body).unwrap();
        doc.set_attr(rendered.group, "data-inline-type", "grid");
        let result = try_init_inline_formset(&mut doc, rendered.group, &FormsetOptions::default());
        assert!(matches!(result, Err(InlinesError::UnknownInlineType(_))));
        assert!(init_inline_formsets(&mut doc, &FormsetOptions::default()).is_empty());
    }
}
