//! The management form: hidden counters describing a formset's size.
//!
//! The server renders four hidden inputs per prefix. `TOTAL_FORMS` is the
//! only one the page rewrites; `MIN_NUM_FORMS` and `MAX_NUM_FORMS` bound how
//! far it may move, and `INITIAL_FORMS` counts rows backed by saved objects.

use std::collections::HashMap;

use inlines_dom::{escape_html, Document, NodeId};

/// Management form field names.
pub const TOTAL_FORMS: &str = "TOTAL_FORMS";
pub const INITIAL_FORMS: &str = "INITIAL_FORMS";
pub const MIN_NUM_FORMS: &str = "MIN_NUM_FORMS";
pub const MAX_NUM_FORMS: &str = "MAX_NUM_FORMS";

/// Returns the `name` of a management field, e.g. `task-TOTAL_FORMS`.
pub fn counter_name(prefix: &str, field: &str) -> String {
    format!("{prefix}-{field}")
}

/// Returns the element id of a management field, e.g. `id_task-TOTAL_FORMS`.
pub fn counter_id(prefix: &str, field: &str) -> String {
    format!("id_{prefix}-{field}")
}

/// Parses a counter value. Blank or non-numeric values read as `None`.
pub fn parse_counter(value: &str) -> Option<usize> {
    value.trim().parse().ok()
}

/// A bound read from a counter: zero means unbounded.
fn parse_bound(value: Option<&str>) -> Option<usize> {
    value.and_then(parse_counter).filter(|n| *n > 0)
}

/// The server-side view of a management form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementForm {
    /// The formset prefix.
    pub prefix: String,
    /// Number of rows submitted.
    pub total_forms: usize,
    /// Number of rows backed by saved objects.
    pub initial_forms: usize,
    /// Minimum number of rows.
    pub min_num: usize,
    /// Maximum number of rows.
    pub max_num: usize,
}

impl ManagementForm {
    /// Creates a management form with no rows, no floor, and the usual
    /// ceiling of 1000.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            total_forms: 0,
            initial_forms: 0,
            min_num: 0,
            max_num: 1000,
        }
    }

    /// Sets the total row count.
    #[must_use]
    pub const fn with_total(mut self, total: usize) -> Self {
        self.total_forms = total;
        self
    }

    /// Sets the saved row count.
    #[must_use]
    pub const fn with_initial(mut self, initial: usize) -> Self {
        self.initial_forms = initial;
        self
    }

    /// Sets the minimum number of rows.
    #[must_use]
    pub const fn with_min_num(mut self, min_num: usize) -> Self {
        self.min_num = min_num;
        self
    }

    /// Sets the maximum number of rows.
    #[must_use]
    pub const fn with_max_num(mut self, max_num: usize) -> Self {
        self.max_num = max_num;
        self
    }

    /// Returns the management data as name/value pairs.
    pub fn data(&self) -> HashMap<String, String> {
        self.fields()
            .into_iter()
            .map(|(field, value)| (counter_name(&self.prefix, field), value.to_string()))
            .collect()
    }

    /// Renders the management form as hidden HTML inputs.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (field, value) in self.fields() {
            html.push_str(&format!(
                r#"<input type="hidden" name="{}" value="{value}" id="{}" />"#,
                escape_html(&counter_name(&self.prefix, field)),
                escape_html(&counter_id(&self.prefix, field)),
            ));
        }
        html
    }

    /// Appends the hidden inputs to `parent` and returns them in field order.
    pub fn append_to(&self, doc: &mut Document, parent: NodeId) -> Vec<NodeId> {
        self.fields()
            .into_iter()
            .map(|(field, value)| {
                let input = doc.create_element_with(
                    "input",
                    &[
                        ("type", "hidden"),
                        ("name", &counter_name(&self.prefix, field)),
                        ("value", &value.to_string()),
                        ("id", &counter_id(&self.prefix, field)),
                    ],
                );
                doc.append_child(parent, input);
                input
            })
            .collect()
    }

    fn fields(&self) -> [(&'static str, usize); 4] {
        [
            (TOTAL_FORMS, self.total_forms),
            (INITIAL_FORMS, self.initial_forms),
            (MIN_NUM_FORMS, self.min_num),
            (MAX_NUM_FORMS, self.max_num),
        ]
    }
}

/// The counter inputs of one prefix as found on a page.
///
/// Any of them may be missing; the manager then skips whatever depends on
/// that counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterFields {
    /// The `TOTAL_FORMS` input.
    pub total: Option<NodeId>,
    /// The `MIN_NUM_FORMS` input.
    pub min: Option<NodeId>,
    /// The `MAX_NUM_FORMS` input.
    pub max: Option<NodeId>,
}

impl CounterFields {
    /// Locates the counters of `prefix` by element id.
    pub fn locate(doc: &Document, prefix: &str) -> Self {
        Self {
            total: doc.by_id(&counter_id(prefix, TOTAL_FORMS)),
            min: doc.by_id(&counter_id(prefix, MIN_NUM_FORMS)),
            max: doc.by_id(&counter_id(prefix, MAX_NUM_FORMS)),
        }
    }

    /// Sets `autocomplete="off"` on every counter found.
    pub fn disable_autocomplete(&self, doc: &mut Document) {
        for node in [self.total, self.min, self.max].into_iter().flatten() {
            doc.set_attr(node, "autocomplete", "off");
        }
    }

    /// Reads `TOTAL_FORMS`.
    pub fn total_forms(&self, doc: &Document) -> Option<usize> {
        self.total
            .and_then(|n| doc.attr(n, "value"))
            .and_then(parse_counter)
    }

    /// Reads `MIN_NUM_FORMS`. Absent, blank, or zero means no floor.
    pub fn min_forms(&self, doc: &Document) -> Option<usize> {
        parse_bound(self.min.and_then(|n| doc.attr(n, "value")))
    }

    /// Reads `MAX_NUM_FORMS`. Absent, blank, or zero means no ceiling.
    pub fn max_forms(&self, doc: &Document) -> Option<usize> {
        parse_bound(self.max.and_then(|n| doc.attr(n, "value")))
    }

    /// Writes `TOTAL_FORMS`. Does nothing when the counter is missing.
    pub fn set_total_forms(&self, doc: &mut Document, total: usize) {
        if let Some(node) = self.total {
            doc.set_attr(node, "value", &total.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_form_data() {
        let mf = ManagementForm::new("task")
            .with_total(2)
            .with_initial(1)
            .with_min_num(1)
            .with_max_num(5);
        let data = mf.data();
        assert_eq!(data.get("task-TOTAL_FORMS"), Some(&"2".to_string()));
        assert_eq!(data.get("task-INITIAL_FORMS"), Some(&"1".to_string()));
        assert_eq!(data.get("task-MIN_NUM_FORMS"), Some(&"1".to_string()));
        assert_eq!(data.get("task-MAX_NUM_FORMS"), Some(&"5".to_string()));
    }

    #[test]
    fn test_management_form_html() {
        let html = ManagementForm::new("task").with_total(1).to_html();
        assert!(html.starts_with(
            r#"<input type="hidden" name="task-TOTAL_FORMS" value="1" id="id_task-TOTAL_FORMS" />"#
        ));
        assert!(html.contains("task-INITIAL_FORMS"));
        assert!(html.contains(r#"name="task-MAX_NUM_FORMS" value="1000""#));
    }

    #[test]
    fn test_append_and_locate() {
        let mut doc = Document::new();
        let body = doc.body();
        let inputs = ManagementForm::new("task")
            .with_total(3)
            .with_min_num(1)
            .with_max_num(0)
            .append_to(&mut doc, body);
        assert_eq!(inputs.len(), 4);

        let counters = CounterFields::locate(&doc, "task");
        assert_eq!(counters.total_forms(&doc), Some(3));
        assert_eq!(counters.min_forms(&doc), Some(1));
        assert_eq!(counters.max_forms(&doc), None);

        counters.set_total_forms(&mut doc, 4);
        assert_eq!(counters.total_forms(&doc), Some(4));
    }

    #[test]
    fn test_missing_counters_read_as_none() {
        let mut doc = Document::new();
        let counters = CounterFields::locate(&doc, "task");
        assert_eq!(counters.total_forms(&doc), None);
        assert_eq!(counters.min_forms(&doc), None);
        counters.set_total_forms(&mut doc, 2);
        counters.disable_autocomplete(&mut doc);
        assert_eq!(doc.by_id("id_task-TOTAL_FORMS"), None);
    }

    #[test]
    fn test_disable_autocomplete() {
        let mut doc = Document::new();
        let body = doc.body();
        ManagementForm::new("task").append_to(&mut doc, body);
        let counters = CounterFields::locate(&doc, "task");
        counters.disable_autocomplete(&mut doc);
        let total = counters.total.unwrap();
        assert_eq!(doc.attr(total, "autocomplete"), Some("off"));
    }

    #[test]
    fn test_parse_counter() {
        assert_eq!(parse_counter(" 7 "), Some(7));
        assert_eq!(parse_counter(""), None);
        assert_eq!(parse_counter("many"), None);
        assert_eq!(parse_bound(Some("0")), None);
        assert_eq!(parse_bound(None), None);
    }
}
