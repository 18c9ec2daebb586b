//! The tabular and stacked inline configurations.
//!
//! Both presets layer widget re-initialization on top of the base manager.
//! The stacked one also keeps the visible `#n` ordinals of its blocks in
//! step with their position.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use inlines_core::{InlinesError, InlinesResult};
use inlines_dom::{Document, NodeId};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::manager::FormsetManager;
use crate::options::FormsetOptions;
use crate::widgets::{self, FieldLayout};

/// Class the admin puts on every inline row block.
pub const INLINE_RELATED_CLASS: &str = "inline-related";
/// Class of the ordinal label inside a stacked block header.
pub const INLINE_LABEL_CLASS: &str = "inline_label";

/// The layout of an inline formset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineType {
    /// One table row per form.
    Tabular,
    /// One fieldset block per form.
    Stacked,
}

impl InlineType {
    /// Returns the name used in `data-inline-type`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Stacked => "stacked",
        }
    }

    const fn field_layout(self) -> FieldLayout {
        match self {
            Self::Tabular => FieldLayout::Tabular,
            Self::Stacked => FieldLayout::Stacked,
        }
    }
}

impl FromStr for InlineType {
    type Err = InlinesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tabular" => Ok(Self::Tabular),
            "stacked" => Ok(Self::Stacked),
            other => Err(InlinesError::UnknownInlineType(other.to_string())),
        }
    }
}

/// The `options` object of a `data-inline-formset` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineOptions {
    /// The formset prefix.
    pub prefix: String,
    /// Add control text, e.g. `Add another Task`.
    pub add_text: String,
    /// Delete control text.
    pub delete_text: String,
}

impl InlineOptions {
    /// Builds manager options for a preset on top of `base`.
    ///
    /// The form class becomes `dynamic-<prefix>`, the template class
    /// `empty-form`, and the delete class `inline-deletelink`, matching what
    /// the admin templates render.
    pub fn to_formset_options(&self, base: &FormsetOptions) -> FormsetOptions {
        base.clone()
            .with_prefix(self.prefix.clone())
            .with_add_text(self.add_text.clone())
            .with_delete_text(self.delete_text.clone())
            .with_form_css_class(format!("dynamic-{}", self.prefix))
            .with_empty_css_class("empty-form")
            .with_delete_css_class("inline-deletelink")
    }
}

/// Attaches a tabular inline.
///
/// After each add the new row's select filters and prepopulated fields are
/// wired and the page's date/time shortcuts are rebuilt.
pub fn tabular_formset(
    doc: &mut Document,
    rows: &[NodeId],
    options: &InlineOptions,
    base: &FormsetOptions,
) -> FormsetManager {
    let opts = with_widget_hooks(options.to_formset_options(base), InlineType::Tabular, false);
    FormsetManager::attach(doc, rows, opts)
}

/// Attaches a stacked inline.
///
/// Besides the widget wiring of [`tabular_formset`], the `#n` labels of
/// the group's blocks are rewritten after every add and remove.
pub fn stacked_formset(
    doc: &mut Document,
    rows: &[NodeId],
    options: &InlineOptions,
    base: &FormsetOptions,
) -> FormsetManager {
    let opts = with_widget_hooks(options.to_formset_options(base), InlineType::Stacked, true);
    let manager = FormsetManager::attach(doc, rows, opts);
    update_inline_labels(doc, manager.prefix());
    manager
}

/// Attaches the preset for `inline_type`.
pub fn attach_preset(
    doc: &mut Document,
    inline_type: InlineType,
    rows: &[NodeId],
    options: &InlineOptions,
    base: &FormsetOptions,
) -> FormsetManager {
    match inline_type {
        InlineType::Tabular => tabular_formset(doc, rows, options, base),
        InlineType::Stacked => stacked_formset(doc, rows, options, base),
    }
}

fn with_widget_hooks(
    mut opts: FormsetOptions,
    inline_type: InlineType,
    renumber_labels: bool,
) -> FormsetOptions {
    let user_added = opts.added.take();
    let user_removed = opts.removed.take();
    let prefix = opts.prefix.clone();

    let added_prefix = prefix.clone();
    opts.added = Some(Arc::new(move |doc: &mut Document, row: NodeId| {
        if renumber_labels {
            update_inline_labels(doc, &added_prefix);
        }
        widgets::reinit_datetime_shortcuts(doc);
        widgets::init_select_filters(doc, row);
        widgets::init_prepopulated_fields(doc, row, inline_type.field_layout());
        if let Some(hook) = &user_added {
            hook(doc, row);
        }
    }));

    if renumber_labels || user_removed.is_some() {
        opts.removed = Some(Arc::new(move |doc: &mut Document, row: NodeId| {
            if renumber_labels {
                update_inline_labels(doc, &prefix);
            }
            if let Some(hook) = &user_removed {
                hook(doc, row);
            }
        }));
    }
    opts
}

/// Renumbers the `#n` ordinals of a stacked group's blocks from 1.
///
/// The template block is skipped so the ordinals match visible rows.
/// Returns the number of labels rewritten.
pub fn update_inline_labels(doc: &mut Document, prefix: &str) -> usize {
    let Some(group) = doc.by_id(&format!("{prefix}-group")) else {
        return 0;
    };
    static ORDINAL: OnceLock<Regex> = OnceLock::new();
    let ordinal = ORDINAL.get_or_init(|| Regex::new(r"#\d+").unwrap());
    let blocks = doc.find(group, |e| {
        e.has_class(INLINE_RELATED_CLASS) && !e.has_class("empty-form")
    });
    let mut rewritten = 0;
    for (i, block) in blocks.into_iter().enumerate() {
        let replacement = format!("#{}", i + 1);
        for label in doc.find_by_class(block, INLINE_LABEL_CLASS) {
            for text in doc.text_children(label) {
                let current = doc.text_content(text);
                let updated = ordinal.replace(&current, regex::NoExpand(&replacement));
                if updated != current {
                    let updated = updated.into_owned();
                    doc.replace_text(text, &updated);
                    rewritten += 1;
                }
            }
        }
    }
    rewritten
}

/// Parses a `data-inline-type` value.
pub fn parse_inline_type(value: &str) -> InlinesResult<InlineType> {
    value.parse()
}
