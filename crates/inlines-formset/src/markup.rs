//! Rendering a server-side inline formset into a [`Document`].
//!
//! [`FormsetMarkup`] produces the same structure the admin templates render
//! for a tabular or stacked inline: the `.js-inline-admin-formset` group
//! carrying its bootstrap data, the management form, one row per saved or
//! extra form, and the hidden `__prefix__` template row. It is what the
//! `simulate` command and the tests attach managers to.

use inlines_core::InlinesResult;
use inlines_dom::{Document, NodeId};

use crate::bootstrap::{InlineFormsetData, INLINE_FORMSET_CLASS};
use crate::index::{row_id, template_id, TEMPLATE_PLACEHOLDER};
use crate::management::ManagementForm;
use crate::presets::{InlineOptions, InlineType, INLINE_LABEL_CLASS, INLINE_RELATED_CLASS};

/// How a field is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain text input.
    Text,
    /// A date input with calendar shortcuts.
    Date,
    /// A time input with clock shortcuts.
    Time,
    /// A number input.
    Number,
    /// A hidden input.
    Hidden,
    /// A multiple select enhanced by the filter widget.
    SelectFilter {
        /// Render the stacked variant.
        stacked: bool,
    },
    /// A text input filled from other fields of the same row.
    Prepopulated {
        /// Names of the fields it is derived from.
        from: Vec<String>,
    },
}

/// One field of the inline form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, the last segment of `prefix-<n>-<name>`.
    pub name: String,
    /// Human label.
    pub label: String,
    /// Widget kind.
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Creates a field labelled after its name.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            label: capitalize(&name.replace('_', " ")),
            name,
            kind,
        }
    }

    /// Parses a `name[:kind]` shorthand such as `due:date`.
    ///
    /// Known kinds are `text`, `date`, `time`, `number`, `hidden`,
    /// `select`, and `slug=<field>+<field>` for a prepopulated field.
    /// Anything else renders as text.
    pub fn parse(spec: &str) -> Self {
        let (name, kind) = spec.split_once(':').unwrap_or((spec, "text"));
        let kind = match kind {
            "date" => FieldKind::Date,
            "time" => FieldKind::Time,
            "number" => FieldKind::Number,
            "hidden" => FieldKind::Hidden,
            "select" => FieldKind::SelectFilter { stacked: false },
            other => match other.strip_prefix("slug=") {
                Some(from) => FieldKind::Prepopulated {
                    from: from.split('+').map(str::to_string).collect(),
                },
                None => FieldKind::Text,
            },
        };
        Self::new(name, kind)
    }
}

/// The nodes of a rendered formset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFormset {
    /// The `#<prefix>-group` element.
    pub group: NodeId,
    /// The live rows in index order.
    pub rows: Vec<NodeId>,
    /// The template row.
    pub template: NodeId,
    /// The management form inputs.
    pub management: Vec<NodeId>,
}

impl RenderedFormset {
    /// Returns the rows followed by the template, as a row selector would
    /// match them.
    pub fn selection(&self) -> Vec<NodeId> {
        let mut nodes = self.rows.clone();
        nodes.push(self.template);
        nodes
    }
}

/// A builder for the markup of one inline formset.
#[derive(Debug, Clone)]
pub struct FormsetMarkup {
    inline_type: InlineType,
    prefix: String,
    verbose_name: String,
    fields: Vec<FieldSpec>,
    initial: usize,
    extra: usize,
    min_num: usize,
    max_num: usize,
    add_text: Option<String>,
    delete_text: String,
    row_errors: Vec<(usize, String)>,
}

impl FormsetMarkup {
    /// Starts a formset with no fields and no rows.
    pub fn new(inline_type: InlineType, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            inline_type,
            verbose_name: capitalize(&prefix),
            prefix,
            fields: Vec::new(),
            initial: 0,
            extra: 0,
            min_num: 0,
            max_num: 1000,
            add_text: None,
            delete_text: "Remove".to_string(),
            row_errors: Vec::new(),
        }
    }

    /// Starts a tabular formset.
    pub fn tabular(prefix: impl Into<String>) -> Self {
        Self::new(InlineType::Tabular, prefix)
    }

    /// Starts a stacked formset.
    pub fn stacked(prefix: impl Into<String>) -> Self {
        Self::new(InlineType::Stacked, prefix)
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec::new(name, kind));
        self
    }

    /// Replaces the field list.
    #[must_use]
    pub fn fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the number of rows backed by saved objects.
    #[must_use]
    pub const fn initial(mut self, initial: usize) -> Self {
        self.initial = initial;
        self
    }

    /// Sets the number of blank rows after the saved ones.
    #[must_use]
    pub const fn extra(mut self, extra: usize) -> Self {
        self.extra = extra;
        self
    }

    /// Sets `MIN_NUM_FORMS`.
    #[must_use]
    pub const fn min_num(mut self, min_num: usize) -> Self {
        self.min_num = min_num;
        self
    }

    /// Sets `MAX_NUM_FORMS`. Zero renders an unbounded formset.
    #[must_use]
    pub const fn max_num(mut self, max_num: usize) -> Self {
        self.max_num = max_num;
        self
    }

    /// Sets the singular name shown in headers and the add text.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Overrides the add control text.
    #[must_use]
    pub fn add_text(mut self, text: impl Into<String>) -> Self {
        self.add_text = Some(text.into());
        self
    }

    /// Sets the delete control text.
    #[must_use]
    pub fn delete_text(mut self, text: impl Into<String>) -> Self {
        self.delete_text = text.into();
        self
    }

    /// Renders a validation error for the row at `index`.
    #[must_use]
    pub fn row_error(mut self, index: usize, message: impl Into<String>) -> Self {
        self.row_errors.push((index, message.into()));
        self
    }

    /// Returns the options carried in `data-inline-formset`.
    pub fn inline_options(&self) -> InlineOptions {
        InlineOptions {
            prefix: self.prefix.clone(),
            add_text: self
                .add_text
                .clone()
                .unwrap_or_else(|| format!("Add another {}", self.verbose_name)),
            delete_text: self.delete_text.clone(),
        }
    }

    /// Returns the management form for the rendered rows.
    pub fn management_form(&self) -> ManagementForm {
        ManagementForm::new(self.prefix.clone())
            .with_total(self.initial + self.extra)
            .with_initial(self.initial)
            .with_min_num(self.min_num)
            .with_max_num(self.max_num)
    }

    /// Renders the formset into `doc` under `parent`.
    pub fn build(&self, doc: &mut Document, parent: NodeId) -> InlinesResult<RenderedFormset> {
        let data = InlineFormsetData {
            name: format!("#{}", self.prefix),
            options: self.inline_options(),
        };
        let group = doc.create_element_with(
            "div",
            &[
                ("class", &format!("{INLINE_FORMSET_CLASS} inline-group")),
                ("id", &format!("{}-group", self.prefix)),
                ("data-inline-type", self.inline_type.as_str()),
                ("data-inline-formset", &serde_json::to_string(&data)?),
            ],
        );
        doc.append_child(parent, group);

        let rendered = match self.inline_type {
            InlineType::Tabular => self.build_tabular(doc, group),
            InlineType::Stacked => self.build_stacked(doc, group),
        };
        tracing::debug!(
            prefix = %self.prefix,
            layout = self.inline_type.as_str(),
            rows = rendered.rows.len(),
            "formset markup built"
        );
        Ok(rendered)
    }

    /// Renders the formset into a fresh document and returns its HTML.
    pub fn to_html(&self) -> InlinesResult<String> {
        let mut doc = Document::new();
        let body = doc.body();
        let rendered = self.build(&mut doc, body)?;
        Ok(doc.to_html(rendered.group))
    }

    fn row_count(&self) -> usize {
        self.initial + self.extra
    }

    fn build_tabular(&self, doc: &mut Document, group: NodeId) -> RenderedFormset {
        let wrapper = doc.create_element_with(
            "div",
            &[("class", &format!("tabular {INLINE_RELATED_CLASS} last-related"))],
        );
        doc.append_child(group, wrapper);
        let management = self.management_form().append_to(doc, wrapper);

        let fieldset = doc.create_element_with("fieldset", &[("class", "module")]);
        doc.append_child(wrapper, fieldset);
        let heading = doc.create_element("h2");
        doc.set_text(heading, &format!("{}s", self.verbose_name));
        doc.append_child(fieldset, heading);

        let table = doc.create_element("table");
        doc.append_child(fieldset, table);
        let thead = doc.create_element("thead");
        doc.append_child(table, thead);
        let header_row = doc.create_element("tr");
        doc.append_child(thead, header_row);
        let original = doc.create_element_with("th", &[("class", "original")]);
        doc.append_child(header_row, original);
        for field in self.visible_fields() {
            let th = doc.create_element_with("th", &[("class", &format!("column-{}", field.name))]);
            doc.set_text(th, &field.label);
            doc.append_child(header_row, th);
        }
        let delete_header = doc.create_element("th");
        doc.set_text(delete_header, "Delete?");
        doc.append_child(header_row, delete_header);

        let tbody = doc.create_element("tbody");
        doc.append_child(table, tbody);

        let columns = self.visible_fields().count() + 2;
        let mut rows = Vec::new();
        for index in 0..self.row_count() {
            for (_, message) in self.row_errors.iter().filter(|(i, _)| *i == index) {
                let errors = doc.create_element_with("tr", &[("class", "row-form-errors")]);
                let cell = doc.create_element_with("td", &[("colspan", &columns.to_string())]);
                let list = error_list(doc, message);
                doc.append_child(cell, list);
                doc.append_child(errors, cell);
                doc.append_child(tbody, errors);
            }
            let row = self.tabular_row(doc, &index.to_string(), index < self.initial);
            doc.set_attr(row, "id", &row_id(&self.prefix, index));
            doc.append_child(tbody, row);
            rows.push(row);
        }

        let template = self.tabular_row(doc, TEMPLATE_PLACEHOLDER, false);
        doc.add_class(template, "empty-form");
        doc.set_attr(template, "id", &template_id(&self.prefix));
        doc.hide(template);
        doc.append_child(tbody, template);

        RenderedFormset {
            group,
            rows,
            template,
            management,
        }
    }

    fn tabular_row(&self, doc: &mut Document, index: &str, original: bool) -> NodeId {
        let row = doc.create_element_with("tr", &[("class", "form-row")]);
        if original {
            doc.add_class(row, "has_original");
        }

        let original_cell = doc.create_element_with("td", &[("class", "original")]);
        doc.append_child(row, original_cell);
        if original {
            self.append_pk(doc, original_cell, index);
        }
        for field in self.fields.iter().filter(|f| f.kind == FieldKind::Hidden) {
            let input = self.input(doc, field, index);
            doc.append_child(original_cell, input);
        }

        for field in self.visible_fields() {
            let cell = doc.create_element_with("td", &[("class", &format!("field-{}", field.name))]);
            let input = self.input(doc, field, index);
            doc.append_child(cell, input);
            doc.append_child(row, cell);
        }

        let delete_cell = doc.create_element_with("td", &[("class", "delete")]);
        if original {
            let checkbox = self.delete_checkbox(doc, index);
            doc.append_child(delete_cell, checkbox);
        }
        doc.append_child(row, delete_cell);
        row
    }

    fn build_stacked(&self, doc: &mut Document, group: NodeId) -> RenderedFormset {
        let fieldset = doc.create_element_with("fieldset", &[("class", "module")]);
        doc.append_child(group, fieldset);
        let heading = doc.create_element("h2");
        doc.set_text(heading, &format!("{}s", self.verbose_name));
        doc.append_child(fieldset, heading);
        let management = self.management_form().append_to(doc, fieldset);

        let mut rows = Vec::new();
        for index in 0..self.row_count() {
            let row = self.stacked_block(doc, &index.to_string(), index + 1, index < self.initial);
            doc.set_attr(row, "id", &row_id(&self.prefix, index));
            for (_, message) in self.row_errors.iter().filter(|(i, _)| *i == index) {
                let list = error_list(doc, message);
                doc.append_child(row, list);
            }
            doc.append_child(fieldset, row);
            rows.push(row);
        }

        let template = self.stacked_block(doc, TEMPLATE_PLACEHOLDER, self.row_count() + 1, false);
        doc.add_class(template, "empty-form");
        doc.add_class(template, "last-related");
        doc.set_attr(template, "id", &template_id(&self.prefix));
        doc.hide(template);
        doc.append_child(fieldset, template);

        RenderedFormset {
            group,
            rows,
            template,
            management,
        }
    }

    fn stacked_block(&self, doc: &mut Document, index: &str, ordinal: usize, original: bool) -> NodeId {
        let block = doc.create_element_with("div", &[("class", INLINE_RELATED_CLASS)]);
        if original {
            doc.add_class(block, "has_original");
        }

        let header = doc.create_element("h3");
        let name = doc.create_element("b");
        doc.set_text(name, &format!("{}:", self.verbose_name));
        doc.append_child(header, name);
        let label = doc.create_element_with("span", &[("class", INLINE_LABEL_CLASS)]);
        doc.set_text(label, &format!("#{ordinal}"));
        doc.append_child(header, label);
        if original {
            let delete = doc.create_element_with("span", &[("class", "delete")]);
            let checkbox = self.delete_checkbox(doc, index);
            doc.append_child(delete, checkbox);
            doc.append_child(header, delete);
        }
        doc.append_child(block, header);

        let fields = doc.create_element_with("fieldset", &[("class", "module aligned")]);
        doc.append_child(block, fields);
        for field in self.visible_fields() {
            let form_row = doc.create_element_with(
                "div",
                &[("class", &format!("form-row field-{}", field.name))],
            );
            let inner = doc.create_element("div");
            let label = doc.create_element_with(
                "label",
                &[("for", &self.raw_field_id(index, &field.name))],
            );
            doc.set_text(label, &format!("{}:", field.label));
            let input = self.input(doc, field, index);
            doc.append_child(inner, label);
            doc.append_child(inner, input);
            doc.append_child(form_row, inner);
            doc.append_child(fields, form_row);
        }

        if original {
            self.append_pk(doc, block, index);
        }
        for field in self.fields.iter().filter(|f| f.kind == FieldKind::Hidden) {
            let input = self.input(doc, field, index);
            doc.append_child(block, input);
        }
        block
    }

    fn visible_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.kind != FieldKind::Hidden)
    }

    fn raw_field_name(&self, index: &str, field: &str) -> String {
        format!("{}-{index}-{field}", self.prefix)
    }

    fn raw_field_id(&self, index: &str, field: &str) -> String {
        format!("id_{}", self.raw_field_name(index, field))
    }

    fn append_pk(&self, doc: &mut Document, parent: NodeId, index: &str) {
        let pk = index.parse::<usize>().map_or(0, |i| i + 1).to_string();
        let input = doc.create_element_with(
            "input",
            &[
                ("type", "hidden"),
                ("name", &self.raw_field_name(index, "id")),
                ("value", &pk),
                ("id", &self.raw_field_id(index, "id")),
            ],
        );
        doc.append_child(parent, input);
    }

    fn delete_checkbox(&self, doc: &mut Document, index: &str) -> NodeId {
        doc.create_element_with(
            "input",
            &[
                ("type", "checkbox"),
                ("name", &self.raw_field_name(index, "DELETE")),
                ("id", &self.raw_field_id(index, "DELETE")),
            ],
        )
    }

    fn input(&self, doc: &mut Document, field: &FieldSpec, index: &str) -> NodeId {
        let name = self.raw_field_name(index, &field.name);
        let id = self.raw_field_id(index, &field.name);
        let base = [("name", name.as_str()), ("id", id.as_str())];
        let extra: Vec<(&str, String)> = match &field.kind {
            FieldKind::Text => vec![
                ("type", "text".into()),
                ("class", "vTextField".into()),
                ("maxlength", "200".into()),
            ],
            FieldKind::Date => vec![
                ("type", "text".into()),
                ("class", "vDateField".into()),
                ("size", "10".into()),
            ],
            FieldKind::Time => vec![
                ("type", "text".into()),
                ("class", "vTimeField".into()),
                ("size", "8".into()),
            ],
            FieldKind::Number => vec![
                ("type", "number".into()),
                ("class", "vIntegerField".into()),
            ],
            FieldKind::Hidden => vec![("type", "hidden".into())],
            FieldKind::SelectFilter { stacked } => {
                let class = if *stacked {
                    "selectfilterstacked"
                } else {
                    "selectfilter"
                };
                vec![("multiple", String::new()), ("class", class.into())]
            }
            FieldKind::Prepopulated { from } => vec![
                ("type", "text".into()),
                ("class", "vTextField prepopulated_field".into()),
                ("maxlength", "50".into()),
                (
                    "data-dependency_list",
                    serde_json::Value::from(from.clone()).to_string(),
                ),
            ],
        };
        let tag = if matches!(field.kind, FieldKind::SelectFilter { .. }) {
            "select"
        } else {
            "input"
        };
        let mut attrs: Vec<(&str, &str)> = base.to_vec();
        attrs.extend(extra.iter().map(|(k, v)| (*k, v.as_str())));
        doc.create_element_with(tag, &attrs)
    }
}

fn error_list(doc: &mut Document, message: &str) -> NodeId {
    let list = doc.create_element_with("ul", &[("class", "errorlist")]);
    let item = doc.create_element("li");
    doc.set_text(item, message);
    doc.append_child(list, item);
    list
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
