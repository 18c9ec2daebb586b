//! Collecting and validating a submitted formset.
//!
//! This is the server's half of the contract the manager maintains: it reads
//! `TOTAL_FORMS`, expects row indices to run `0..TOTAL_FORMS` without gaps,
//! and enforces the min/max bounds with rows marked for deletion excluded.

use std::collections::BTreeMap;

use inlines_core::utils::MultiValueDict;
use inlines_core::{InlinesError, InlinesResult, ValidationError};
use inlines_dom::{Document, NodeId};

use crate::index::TEMPLATE_PLACEHOLDER;
use crate::management::{
    counter_name, parse_counter, INITIAL_FORMS, MAX_NUM_FORMS, MIN_NUM_FORMS, TOTAL_FORMS,
};

/// Field name of the per-row delete checkbox.
pub const DELETION_FIELD: &str = "DELETE";

/// Field name of the hidden primary key of saved rows.
pub const PK_FIELD: &str = "id";

/// Collects the named form values below `scope` the way a browser submits
/// them.
///
/// Unchecked checkboxes and radios are left out, textareas submit their
/// text, selects submit each selected option, and disabled controls are
/// skipped. Detached rows are not below `scope` and so never submit.
pub fn collect_form_data(doc: &Document, scope: NodeId) -> MultiValueDict<String, String> {
    let mut data = MultiValueDict::new();
    let controls = doc.find(scope, |e| {
        (e.is("input") || e.is("select") || e.is("textarea"))
            && e.attr("name").is_some_and(|n| !n.is_empty())
            && e.attr("disabled").is_none()
    });
    for control in controls {
        let Some(element) = doc.element(control) else {
            continue;
        };
        let Some(name) = element.attr("name").map(str::to_string) else {
            continue;
        };
        match element.tag() {
            "textarea" => data.append(name, doc.text_content(control)),
            "select" => {
                for option in doc.find(control, |e| e.is("option") && e.attr("selected").is_some()) {
                    let value = doc
                        .attr(option, "value")
                        .map_or_else(|| doc.text_content(option), str::to_string);
                    data.append(name.clone(), value);
                }
            }
            _ => {
                let kind = element.attr("type").unwrap_or("text");
                if matches!(kind, "checkbox" | "radio") && element.attr("checked").is_none() {
                    continue;
                }
                let default = if kind == "checkbox" { "on" } else { "" };
                let value = element.attr("value").unwrap_or(default).to_string();
                data.append(name, value);
            }
        }
    }
    data
}

/// One submitted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedForm {
    /// The row index.
    pub index: usize,
    /// Field values keyed by field name, last value wins.
    pub fields: BTreeMap<String, String>,
    /// Whether the row's delete checkbox was checked.
    pub deleted: bool,
    /// Whether the row is backed by a saved object.
    pub initial: bool,
}

impl SubmittedForm {
    /// Returns `true` if an extra row was submitted without any value.
    pub fn is_empty(&self) -> bool {
        !self.initial
            && self
                .fields
                .iter()
                .filter(|(name, _)| name.as_str() != PK_FIELD && name.as_str() != DELETION_FIELD)
                .all(|(_, value)| value.trim().is_empty())
    }
}

/// A formset that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFormset {
    /// `TOTAL_FORMS` as submitted.
    pub total: usize,
    /// `INITIAL_FORMS` as submitted.
    pub initial: usize,
    /// Every submitted row in index order.
    pub forms: Vec<SubmittedForm>,
}

impl ValidatedFormset {
    /// Returns the rows that will be kept.
    pub fn kept(&self) -> impl Iterator<Item = &SubmittedForm> {
        self.forms.iter().filter(|f| !f.deleted && !f.is_empty())
    }
}

/// Validates submitted data for one prefix.
#[derive(Debug, Clone)]
pub struct FormsetSubmission {
    prefix: String,
    absolute_max: usize,
}

impl FormsetSubmission {
    /// Creates a validator for `prefix` with the usual absolute cap of 2000
    /// rows.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            absolute_max: 2000,
        }
    }

    /// Sets the absolute row cap.
    #[must_use]
    pub const fn with_absolute_max(mut self, absolute_max: usize) -> Self {
        self.absolute_max = absolute_max;
        self
    }

    /// Collects the data below `scope` and validates it.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_document(&self, doc: &Document, scope: NodeId) -> InlinesResult<ValidatedFormset> {
        self.validate(&collect_form_data(doc, scope))
    }

    /// Validates submitted data.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] with code
    /// - `missing_management_form` when `TOTAL_FORMS` or `INITIAL_FORMS` is
    ///   absent or not a number,
    /// - `unexpected_form` when a row index is at or beyond `TOTAL_FORMS`,
    /// - `missing_form` when an index below `TOTAL_FORMS` has no fields,
    /// - `too_many_forms` / `too_few_forms` when the kept rows break the
    ///   bounds.
    pub fn validate(&self, data: &MultiValueDict<String, String>) -> InlinesResult<ValidatedFormset> {
        let total = self.counter(data, TOTAL_FORMS);
        let initial = self.counter(data, INITIAL_FORMS);
        let (Some(total), Some(initial)) = (total, initial) else {
            return Err(ValidationError::new(
                "ManagementForm data is missing or has been tampered with.",
                "missing_management_form",
            )
            .with_param("prefix", self.prefix.clone())
            .into());
        };
        let min_num = self.counter(data, MIN_NUM_FORMS).unwrap_or(0);
        let max_num = self
            .counter(data, MAX_NUM_FORMS)
            .filter(|n| *n > 0)
            .unwrap_or(self.absolute_max);

        let rows = self.rows(data);
        if let Some(index) = rows.keys().find(|i| **i >= total) {
            return Err(ValidationError::new(
                format!("Unexpected form with index {index}."),
                "unexpected_form",
            )
            .with_param("index", index.to_string())
            .into());
        }
        if let Some(index) = (0..total).find(|i| !rows.contains_key(i)) {
            return Err(ValidationError::new(
                format!("Form with index {index} is missing."),
                "missing_form",
            )
            .with_param("index", index.to_string())
            .into());
        }

        let forms: Vec<SubmittedForm> = rows
            .into_iter()
            .map(|(index, fields)| SubmittedForm {
                index,
                deleted: fields.get(DELETION_FIELD).is_some_and(|v| is_checked(v)),
                initial: index < initial,
                fields,
            })
            .collect();

        let deleted = forms.iter().filter(|f| f.deleted).count();
        let empty = forms.iter().filter(|f| !f.deleted && f.is_empty()).count();
        if total > self.absolute_max || total - deleted > max_num {
            return Err(bound_error("most", max_num, "too_many_forms"));
        }
        if total - deleted - empty < min_num {
            return Err(bound_error("least", min_num, "too_few_forms"));
        }

        tracing::debug!(prefix = %self.prefix, total, deleted, "formset submission valid");
        Ok(ValidatedFormset {
            total,
            initial,
            forms,
        })
    }

    fn counter(&self, data: &MultiValueDict<String, String>, field: &str) -> Option<usize> {
        data.get(&counter_name(&self.prefix, field))
            .and_then(|v| parse_counter(v))
    }

    /// Groups `prefix-<n>-<field>` values by row index.
    fn rows(&self, data: &MultiValueDict<String, String>) -> BTreeMap<usize, BTreeMap<String, String>> {
        let head = format!("{}-", self.prefix);
        let mut rows: BTreeMap<usize, BTreeMap<String, String>> = BTreeMap::new();
        for (key, values) in data.iter() {
            let Some((index, field)) = key.strip_prefix(&head).and_then(|rest| rest.split_once('-'))
            else {
                continue;
            };
            if index == TEMPLATE_PLACEHOLDER {
                continue;
            }
            let Ok(index) = index.parse::<usize>() else {
                continue;
            };
            let value = values.last().cloned().unwrap_or_default();
            rows.entry(index).or_default().insert(field.to_string(), value);
        }
        rows
    }
}

fn is_checked(value: &str) -> bool {
    !matches!(value, "" | "false" | "False" | "0" | "off")
}

fn bound_error(side: &str, bound: usize, code: &str) -> InlinesError {
    let noun = if bound == 1 { "form" } else { "forms" };
    ValidationError::new(format!("Please submit at {side} {bound} {noun}."), code)
        .with_param("num", bound.to_string())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> MultiValueDict<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn management(total: &str, min: &str, max: &str) -> Vec<(&'static str, String)> {
        vec![
            ("task-TOTAL_FORMS", total.to_string()),
            ("task-INITIAL_FORMS", "0".to_string()),
            ("task-MIN_NUM_FORMS", min.to_string()),
            ("task-MAX_NUM_FORMS", max.to_string()),
        ]
    }

    fn submit(
        mut pairs: Vec<(&'static str, String)>,
        rows: &[(&'static str, &'static str)],
    ) -> InlinesResult<ValidatedFormset> {
        pairs.extend(rows.iter().map(|(k, v)| (*k, (*v).to_string())));
        let dict: MultiValueDict<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        FormsetSubmission::new("task").validate(&dict)
    }

    fn code(result: InlinesResult<ValidatedFormset>) -> String {
        match result {
            Err(InlinesError::ValidationError(e)) => e.code,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_submission() {
        let result = submit(
            management("2", "0", "1000"),
            &[("task-0-title", "a"), ("task-1-title", "b")],
        )
        .unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.forms.len(), 2);
        assert_eq!(result.forms[1].fields["title"], "b");
        assert_eq!(result.kept().count(), 2);
    }

    #[test]
    fn test_missing_management_form() {
        let result = FormsetSubmission::new("task").validate(&data(&[("task-0-title", "a")]));
        assert_eq!(code(result), "missing_management_form");
    }

    #[test]
    fn test_gap_in_indices() {
        let result = submit(
            management("2", "0", "1000"),
            &[("task-0-title", "a"), ("task-2-title", "c")],
        );
        assert_eq!(code(result), "unexpected_form");

        let result = submit(management("2", "0", "1000"), &[("task-1-title", "b")]);
        assert_eq!(code(result), "missing_form");
    }

    #[test]
    fn test_template_fields_are_ignored() {
        let result = submit(
            management("1", "0", "1000"),
            &[("task-0-title", "a"), ("task-__prefix__-title", "")],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_bounds() {
        let result = submit(
            management("2", "0", "1"),
            &[("task-0-title", "a"), ("task-1-title", "b")],
        );
        let Err(InlinesError::ValidationError(err)) = result else {
            panic!("expected too_many_forms");
        };
        assert_eq!(err.code, "too_many_forms");
        assert_eq!(err.message, "Please submit at most 1 form.");

        let result = submit(management("1", "2", "1000"), &[("task-0-title", "a")]);
        let Err(InlinesError::ValidationError(err)) = result else {
            panic!("expected too_few_forms");
        };
        assert_eq!(err.message, "Please submit at least 2 forms.");
    }

    #[test]
    fn test_deleted_rows_do_not_count() {
        let result = submit(
            management("2", "0", "1"),
            &[
                ("task-0-title", "a"),
                ("task-1-title", "b"),
                ("task-1-DELETE", "on"),
            ],
        )
        .unwrap();
        assert!(result.forms[1].deleted);
        assert_eq!(result.kept().count(), 1);
    }

    #[test]
    fn test_collect_form_data() {
        let mut doc = Document::new();
        let body = doc.body();
        let text = doc.create_element_with("input", &[("name", "task-0-title"), ("value", "x")]);
        let unchecked = doc.create_element_with("input", &[("type", "checkbox"), ("name", "task-0-DELETE")]);
        let checked = doc.create_element_with(
            "input",
            &[("type", "checkbox"), ("name", "task-1-DELETE"), ("checked", "")],
        );
        let area = doc.create_element_with("textarea", &[("name", "task-0-notes")]);
        doc.set_text(area, "hello");
        let disabled = doc.create_element_with("input", &[("name", "task-0-skip"), ("disabled", "")]);
        for node in [text, unchecked, checked, area, disabled] {
            doc.append_child(body, node);
        }

        let data = collect_form_data(&doc, body);
        assert_eq!(data.get(&"task-0-title".to_string()), Some(&"x".to_string()));
        assert!(!data.contains_key(&"task-0-DELETE".to_string()));
        assert_eq!(data.get(&"task-1-DELETE".to_string()), Some(&"on".to_string()));
        assert_eq!(data.get(&"task-0-notes".to_string()), Some(&"hello".to_string()));
        assert!(!data.contains_key(&"task-0-skip".to_string()));
    }
}
