//! Re-initialization of the auxiliary admin widgets inside a new row.
//!
//! A row cloned from the template carries the raw inputs but none of the
//! wiring the page's widget scripts attached on load. The presets run these
//! after every add.

use inlines_dom::{Document, NodeId};

/// Class of the date/time shortcut container placed after an input.
pub const SHORTCUTS_CLASS: &str = "datetimeshortcuts";

const DATE_FIELD_CLASS: &str = "vDateField";
const TIME_FIELD_CLASS: &str = "vTimeField";

/// Which layout a prepopulated dependency is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    /// Fields are cells of a table row.
    Tabular,
    /// Fields are `.form-row` blocks of a fieldset.
    Stacked,
}

/// Rebuilds the date/time shortcuts across the whole page.
///
/// Every existing shortcut container is dropped and one fresh container is
/// placed right after each date and time input, so rows added later get
/// theirs and nothing is duplicated. Returns the number of containers made.
pub fn reinit_datetime_shortcuts(doc: &mut Document) -> usize {
    let body = doc.body();
    for stale in doc.find_by_class(body, SHORTCUTS_CLASS) {
        doc.remove(stale);
    }

    let inputs = doc.find(body, |e| {
        e.is("input") && (e.has_class(DATE_FIELD_CLASS) || e.has_class(TIME_FIELD_CLASS))
    });
    for &input in &inputs {
        // Template inputs get their shortcuts once cloned.
        if doc.attr(input, "name").is_some_and(|n| n.contains("__prefix__")) {
            continue;
        }
        let kind = if doc.has_class(input, DATE_FIELD_CLASS) {
            "date"
        } else {
            "time"
        };
        let span = doc.create_element_with(
            "span",
            &[("class", SHORTCUTS_CLASS), ("data-shortcut-kind", kind)],
        );
        doc.insert_after(span, input);
    }
    inputs.len()
}

/// Marks the select-filter widgets of a row as initialized.
///
/// `.selectfilter` and `.selectfilterstacked` selects get
/// `data-filter-initialized`; the stacked variant is recorded in
/// `data-filter-stacked`. Already initialized selects are skipped.
pub fn init_select_filters(doc: &mut Document, row: NodeId) -> usize {
    let selects = doc.find(row, |e| {
        e.is("select")
            && (e.has_class("selectfilter") || e.has_class("selectfilterstacked"))
            && e.attr("data-filter-initialized").is_none()
    });
    for &select in &selects {
        let stacked = doc.has_class(select, "selectfilterstacked");
        doc.set_attr(select, "data-filter-initialized", "true");
        doc.set_attr(select, "data-filter-stacked", if stacked { "1" } else { "0" });
    }
    selects.len()
}

/// Wires the prepopulated fields of a row to the inputs they derive from.
///
/// Each `.prepopulated_field` input lists its dependencies by field name in
/// a JSON `data-dependency_list` attribute. The matching inputs of the same
/// row are looked up by their `.field-<name>` container and their ids are
/// recorded, comma-separated, in `data-prepopulated-from`. Malformed lists
/// are skipped.
pub fn init_prepopulated_fields(doc: &mut Document, row: NodeId, layout: FieldLayout) -> usize {
    let fields = doc.find(row, |e| {
        e.has_class("prepopulated_field") && e.attr("data-dependency_list").is_some()
    });
    let mut wired = 0;
    for field in fields {
        let Some(raw) = doc.attr(field, "data-dependency_list") else {
            continue;
        };
        let names: Vec<String> = match serde_json::from_str(raw) {
            Ok(names) => names,
            Err(err) => {
                tracing::trace!(%err, "skipping malformed dependency list");
                continue;
            }
        };

        let ids: Vec<String> = names
            .iter()
            .filter_map(|name| dependency_input(doc, row, name, layout))
            .filter_map(|input| doc.attr(input, "id").map(str::to_string))
            .collect();
        if ids.is_empty() {
            continue;
        }
        doc.set_attr(field, "data-prepopulated-from", &ids.join(","));
        if let Some(max_length) = doc.attr(field, "maxlength").map(str::to_string) {
            doc.set_attr(field, "data-prepopulated-maxlength", &max_length);
        }
        wired += 1;
    }
    wired
}

fn dependency_input(doc: &Document, row: NodeId, name: &str, layout: FieldLayout) -> Option<NodeId> {
    let class = format!("field-{name}");
    let container = match layout {
        FieldLayout::Tabular => doc.find_by_class(row, &class).first().copied(),
        FieldLayout::Stacked => doc
            .find_by_class(row, "form-row")
            .into_iter()
            .find_map(|block| doc.find_by_class(block, &class).first().copied())
            .or_else(|| {
                doc.find(row, |e| e.has_class("form-row") && e.has_class(&class))
                    .first()
                    .copied()
            }),
    }?;
    doc.find(container, |e| e.is("input") || e.is("select") || e.is("textarea"))
        .first()
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinit_datetime_shortcuts_is_not_cumulative() {
        let mut doc = Document::new();
        let body = doc.body();
        let date = doc.create_element_with("input", &[("class", "vDateField"), ("name", "t-0-due")]);
        let time = doc.create_element_with("input", &[("class", "vTimeField"), ("name", "t-0-at")]);
        doc.append_child(body, date);
        doc.append_child(body, time);

        assert_eq!(reinit_datetime_shortcuts(&mut doc), 2);
        reinit_datetime_shortcuts(&mut doc);
        assert_eq!(doc.find_by_class(body, SHORTCUTS_CLASS).len(), 2);
        let after_date = doc.next_element_sibling(date).unwrap();
        assert_eq!(doc.attr(after_date, "data-shortcut-kind"), Some("date"));
    }

    #[test]
    fn test_template_inputs_get_no_shortcuts() {
        let mut doc = Document::new();
        let body = doc.body();
        let date = doc.create_element_with(
            "input",
            &[("class", "vDateField"), ("name", "t-__prefix__-due")],
        );
        doc.append_child(body, date);
        reinit_datetime_shortcuts(&mut doc);
        assert!(doc.find_by_class(body, SHORTCUTS_CLASS).is_empty());
    }

    #[test]
    fn test_init_select_filters() {
        let mut doc = Document::new();
        let row = doc.create_element("tr");
        let plain = doc.create_element_with("select", &[("class", "selectfilter")]);
        let stacked = doc.create_element_with("select", &[("class", "selectfilterstacked")]);
        doc.append_child(row, plain);
        doc.append_child(row, stacked);

        assert_eq!(init_select_filters(&mut doc, row), 2);
        assert_eq!(doc.attr(plain, "data-filter-stacked"), Some("0"));
        assert_eq!(doc.attr(stacked, "data-filter-stacked"), Some("1"));
        assert_eq!(init_select_filters(&mut doc, row), 0);
    }

    fn prepopulated_row(doc: &mut Document, dependencies: &str) -> (NodeId, NodeId) {
        let row = doc.create_element("tr");
        let title_cell = doc.create_element_with("td", &[("class", "field-title")]);
        let title = doc.create_element_with("input", &[("id", "id_t-1-title")]);
        doc.append_child(title_cell, title);
        let slug_cell = doc.create_element_with("td", &[("class", "field-slug")]);
        let slug = doc.create_element_with(
            "input",
            &[
                ("id", "id_t-1-slug"),
                ("class", "prepopulated_field"),
                ("data-dependency_list", dependencies),
                ("maxlength", "50"),
            ],
        );
        doc.append_child(slug_cell, slug);
        doc.append_child(row, title_cell);
        doc.append_child(row, slug_cell);
        (row, slug)
    }

    #[test]
    fn test_init_prepopulated_fields() {
        let mut doc = Document::new();
        let (row, slug) = prepopulated_row(&mut doc, r#"["title"]"#);
        assert_eq!(init_prepopulated_fields(&mut doc, row, FieldLayout::Tabular), 1);
        assert_eq!(doc.attr(slug, "data-prepopulated-from"), Some("id_t-1-title"));
        assert_eq!(doc.attr(slug, "data-prepopulated-maxlength"), Some("50"));
    }

    #[test]
    fn test_malformed_dependency_list_is_skipped() {
        let mut doc = Document::new();
        let (row, slug) = prepopulated_row(&mut doc, "title");
        assert_eq!(init_prepopulated_fields(&mut doc, row, FieldLayout::Tabular), 0);
        assert_eq!(doc.attr(slug, "data-prepopulated-from"), None);
    }
}
