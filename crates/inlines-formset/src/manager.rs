//! The inline formset manager.
//!
//! A [`FormsetManager`] is bound to one prefix on one page. It owns an arena
//! of row handles ([`RowId`]) in document order and keeps three things in
//! step with that list after every add and remove:
//!
//! - the `prefix-<n>` index embedded in every row's field attributes, which
//!   always runs `0..N` without gaps;
//! - the `TOTAL_FORMS` counter, which always equals the number of rows;
//! - the visibility of the add control (hidden once `MAX_NUM_FORMS` is
//!   reached) and of the delete controls (hidden while at or below
//!   `MIN_NUM_FORMS`).
//!
//! Missing markup never raises: without a template row adding is a no-op,
//! and without counters the bounds are treated as absent.
//!
//! Removal is two-phase. [`request_removal`](FormsetManager::request_removal)
//! starts the fade; the row keeps counting as live until the transition is
//! committed by [`poll_transitions`](FormsetManager::poll_transitions),
//! [`finish_transitions`](FormsetManager::finish_transitions), or
//! [`settle`](FormsetManager::settle). A second request for a row that is
//! already fading is ignored.

use std::sync::Arc;
use std::time::Instant;

use inlines_core::logging::formset_span;
use inlines_dom::{Document, NodeId};
use inlines_signals::Signal;

use crate::events::{RowAdded, RowRemoved};
use crate::index::{row_id, template_id, IndexPattern};
use crate::management::CounterFields;
use crate::options::FormsetOptions;

/// Class the server puts on rows backed by a saved object. Such rows are
/// counted and renumbered but never receive a delete control.
pub const HAS_ORIGINAL_CLASS: &str = "has_original";

/// Class of the row the server renders right before a row with errors.
pub const ROW_ERRORS_CLASS: &str = "row-form-errors";

/// A handle to a row owned by a [`FormsetManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(usize);

/// Where a row is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// On the page and counted.
    Live,
    /// Fading out; still counted until the deadline passes.
    Removing {
        /// When the transition completes.
        deadline: Instant,
    },
    /// Detached from the page.
    Removed,
}

#[derive(Debug)]
struct RowSlot {
    node: NodeId,
    state: RowState,
    delete_control: Option<NodeId>,
}

/// Keeps one inline formset's rows, names, and counters consistent.
#[derive(Debug)]
pub struct FormsetManager {
    options: FormsetOptions,
    pattern: IndexPattern,
    counters: CounterFields,
    min_forms: Option<usize>,
    max_forms: Option<usize>,
    slots: Vec<RowSlot>,
    order: Vec<RowId>,
    add_button: Option<NodeId>,
    row_added: Signal<RowAdded>,
    row_removed: Signal<RowRemoved>,
    span: tracing::Span,
}

impl FormsetManager {
    /// Binds a manager to the given rows.
    ///
    /// `rows` is the matched row set in document order and may include the
    /// template row, which is recognized by `empty_css_class` and skipped.
    /// Every other row gets `form_css_class`; rows without
    /// [`HAS_ORIGINAL_CLASS`] get a delete control unless they already hold
    /// one, so attaching twice never duplicates controls.
    pub fn attach(doc: &mut Document, rows: &[NodeId], options: FormsetOptions) -> Self {
        let counters = CounterFields::locate(doc, &options.prefix);
        counters.disable_autocomplete(doc);

        let mut manager = Self {
            pattern: IndexPattern::new(&options.prefix),
            min_forms: counters.min_forms(doc),
            max_forms: counters.max_forms(doc),
            counters,
            slots: Vec::new(),
            order: Vec::new(),
            add_button: None,
            row_added: Signal::new(),
            row_removed: Signal::new(),
            span: formset_span(&options.prefix),
            options,
        };
        let _entered = manager.span.clone().entered();

        for &row in rows {
            if doc.has_class(row, &manager.options.empty_css_class)
                || manager.row_for_node(row).is_some()
            {
                continue;
            }
            doc.add_class(row, &manager.options.form_css_class);
            let delete_control = if doc.has_class(row, HAS_ORIGINAL_CLASS) {
                None
            } else {
                Some(manager.ensure_delete_control(doc, row))
            };
            manager.push_slot(row, delete_control);
        }

        let rendered = manager.total_forms();
        match manager.counters.total_forms(doc) {
            Some(counted) if counted != rendered => {
                tracing::debug!(counted, rendered, "TOTAL_FORMS differs from rendered rows");
                manager.counters.set_total_forms(doc, rendered);
            }
            _ => {}
        }

        manager.toggle_delete_controls(doc);

        manager.add_button = manager
            .options
            .add_button
            .or_else(|| manager.ensure_add_button(doc, rows));
        let show_add = !rows.is_empty() && manager.below_max();
        manager.set_add_visible(doc, show_add);

        tracing::debug!(
            rows = rendered,
            min = ?manager.min_forms,
            max = ?manager.max_forms,
            "formset attached"
        );
        manager
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Returns the formset prefix.
    pub fn prefix(&self) -> &str {
        &self.options.prefix
    }

    /// Returns the options this manager was attached with.
    pub const fn options(&self) -> &FormsetOptions {
        &self.options
    }

    /// Returns the number of counted rows, fading rows included.
    pub fn total_forms(&self) -> usize {
        self.order.len()
    }

    /// Returns the index the next added row will receive.
    pub fn next_index(&self) -> usize {
        self.order.len()
    }

    /// Returns the `MIN_NUM_FORMS` floor, if any.
    pub const fn min_forms(&self) -> Option<usize> {
        self.min_forms
    }

    /// Returns the `MAX_NUM_FORMS` ceiling, if any.
    pub const fn max_forms(&self) -> Option<usize> {
        self.max_forms
    }

    /// Returns the counted rows in index order.
    pub fn rows(&self) -> &[RowId] {
        &self.order
    }

    /// Returns the element of a row.
    pub fn row_node(&self, row: RowId) -> Option<NodeId> {
        self.slots.get(row.0).map(|s| s.node)
    }

    /// Returns the lifecycle state of a row.
    pub fn row_state(&self, row: RowId) -> Option<RowState> {
        self.slots.get(row.0).map(|s| s.state)
    }

    /// Returns the current index of a counted row.
    pub fn row_index(&self, row: RowId) -> Option<usize> {
        self.order.iter().position(|r| *r == row)
    }

    /// Returns the counted row whose element is `node`.
    pub fn row_for_node(&self, node: NodeId) -> Option<RowId> {
        self.order
            .iter()
            .copied()
            .find(|r| self.slots[r.0].node == node)
    }

    /// Returns the delete control of a row, if it has one.
    pub fn delete_control(&self, row: RowId) -> Option<NodeId> {
        self.slots.get(row.0).and_then(|s| s.delete_control)
    }

    /// Returns the delete controls of all counted rows.
    pub fn delete_controls(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .filter_map(|r| self.slots[r.0].delete_control)
            .collect()
    }

    /// Returns the add control, if one was supplied or created.
    pub const fn add_button(&self) -> Option<NodeId> {
        self.add_button
    }

    /// Returns the template row currently on the page.
    pub fn template(&self, doc: &Document) -> Option<NodeId> {
        doc.by_id(&template_id(self.prefix()))
    }

    /// Returns `true` if the add control is shown.
    pub fn is_add_visible(&self, doc: &Document) -> bool {
        self.add_wrapper(doc)
            .and_then(|w| doc.element(w))
            .is_some_and(|e| !e.is_hidden())
    }

    /// Returns `true` if the delete controls are shown.
    ///
    /// All controls of a formset share one visibility; this is `false` when
    /// there are none.
    pub fn are_delete_controls_visible(&self, doc: &Document) -> bool {
        let controls = self.delete_controls();
        !controls.is_empty()
            && controls
                .iter()
                .all(|c| doc.element(*c).is_some_and(|e| !e.is_hidden()))
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Registers a receiver for row-added notifications.
    pub fn on_row_added(
        &self,
        receiver_id: impl Into<String>,
        receiver: impl Fn(&RowAdded) + Send + Sync + 'static,
    ) {
        self.row_added.connect(receiver_id, Arc::new(receiver));
    }

    /// Registers a receiver for row-removed notifications.
    pub fn on_row_removed(
        &self,
        receiver_id: impl Into<String>,
        receiver: impl Fn(&RowRemoved) + Send + Sync + 'static,
    ) {
        self.row_removed.connect(receiver_id, Arc::new(receiver));
    }

    /// Returns the row-added signal.
    pub const fn row_added_signal(&self) -> &Signal<RowAdded> {
        &self.row_added
    }

    /// Returns the row-removed signal.
    pub const fn row_removed_signal(&self) -> &Signal<RowRemoved> {
        &self.row_removed
    }

    // ── Adding ───────────────────────────────────────────────────────

    /// Adds a row cloned from the template.
    ///
    /// Returns `None` without touching the page when the template row is
    /// missing or the formset is already at `MAX_NUM_FORMS`.
    pub fn add_row(&mut self, doc: &mut Document) -> Option<RowId> {
        let _entered = self.span.clone().entered();
        if !self.below_max() {
            tracing::trace!(max = ?self.max_forms, "add skipped: formset is full");
            return None;
        }
        let Some(template) = self.template(doc) else {
            tracing::trace!("add skipped: template row missing");
            return None;
        };

        let index = self.next_index();
        let row = doc.clone_subtree(template);
        doc.remove_class(row, &self.options.empty_css_class);
        doc.add_class(row, &self.options.form_css_class);
        doc.set_attr(row, "id", &row_id(self.prefix(), index));
        doc.set_attr(row, "role", "form");
        doc.show(row);
        let delete_control = self.ensure_delete_control(doc, row);
        self.pattern.relabel_subtree(doc, row, index, false);
        doc.insert_before(row, template);

        let id = self.push_slot(row, Some(delete_control));
        self.counters.set_total_forms(doc, self.total_forms());
        if !self.below_max() {
            self.set_add_visible(doc, false);
        }
        self.toggle_delete_controls(doc);

        if let Some(hook) = self.options.added.clone() {
            hook(doc, row);
        }
        self.row_added.send(&RowAdded {
            prefix: self.prefix().to_string(),
            row,
            index,
        });

        if let Some(input) = doc
            .find_by_tag(row, "input")
            .into_iter()
            .find(|n| doc.is_visible(*n))
        {
            doc.focus(input);
        }

        tracing::debug!(index, total = self.total_forms(), "row added");
        Some(id)
    }

    // ── Removing ─────────────────────────────────────────────────────

    /// Handles a click on a delete control.
    ///
    /// Finds the row owning `control` and starts its removal. Returns
    /// `false` if the control is hidden, belongs to no counted row of this
    /// formset, or the row cannot be removed.
    pub fn click_delete(&mut self, doc: &mut Document, control: NodeId, now: Instant) -> bool {
        if !doc.is_visible(control) {
            tracing::trace!("delete click ignored: control is hidden");
            return false;
        }
        let Some(row) = doc
            .closest_with_class(control, &self.options.form_css_class)
            .and_then(|node| self.row_for_node(node))
        else {
            return false;
        };
        self.request_removal(doc, row, now)
    }

    /// Starts removing a row.
    ///
    /// Drops the error row rendered right before it, marks the row with
    /// `pending_css_class`, and schedules the commit for `now + transition`.
    /// With a zero transition the removal commits immediately. Returns
    /// `false` if the row is not live, or if the rows left once every
    /// pending removal commits would no longer exceed `MIN_NUM_FORMS`.
    pub fn request_removal(&mut self, doc: &mut Document, row: RowId, now: Instant) -> bool {
        let _entered = self.span.clone().entered();
        let Some(slot) = self.slots.get(row.0) else {
            return false;
        };
        if slot.state != RowState::Live {
            tracing::trace!(?row, "removal skipped: row is not live");
            return false;
        }
        if !self.above_min() {
            tracing::trace!(?row, min = ?self.min_forms, "removal skipped: formset is at its minimum");
            return false;
        }
        let node = slot.node;

        if let Some(previous) = doc.previous_element_sibling(node) {
            if doc.has_class(previous, ROW_ERRORS_CLASS) {
                doc.remove(previous);
            }
        }

        if self.options.transition.is_zero() {
            self.commit_removal(doc, row);
            return true;
        }
        let deadline = now + self.options.transition;
        self.slots[row.0].state = RowState::Removing { deadline };
        doc.add_class(node, &self.options.pending_css_class);
        tracing::trace!(?row, "removal started");
        true
    }

    /// Removes a row without waiting for its transition.
    pub fn remove_row(&mut self, doc: &mut Document, row: RowId) -> bool {
        if !self.request_removal(doc, row, Instant::now()) {
            return false;
        }
        if matches!(self.row_state(row), Some(RowState::Removing { .. })) {
            self.commit_removal(doc, row);
        }
        true
    }

    /// Returns the earliest pending transition deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending()
            .into_iter()
            .map(|(deadline, _)| deadline)
            .min()
    }

    /// Commits every removal whose transition has ended by `now`, in
    /// deadline order. Returns how many rows were removed.
    pub fn poll_transitions(&mut self, doc: &mut Document, now: Instant) -> usize {
        let mut due: Vec<(Instant, RowId)> = self
            .pending()
            .into_iter()
            .filter(|(deadline, _)| *deadline <= now)
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);
        for (_, row) in &due {
            self.commit_removal(doc, *row);
        }
        due.len()
    }

    /// Commits every pending removal immediately.
    pub fn finish_transitions(&mut self, doc: &mut Document) -> usize {
        let mut pending = self.pending();
        pending.sort_by_key(|(deadline, _)| *deadline);
        for (_, row) in &pending {
            self.commit_removal(doc, *row);
        }
        pending.len()
    }

    /// Waits on the tokio timer until every pending transition has run out
    /// and commits each removal at its deadline.
    pub async fn settle(&mut self, doc: &mut Document) -> usize {
        let mut committed = 0;
        while let Some(deadline) = self.next_deadline() {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            committed += self.poll_transitions(doc, deadline);
        }
        committed
    }

    fn pending(&self) -> Vec<(Instant, RowId)> {
        self.order
            .iter()
            .filter_map(|r| match self.slots[r.0].state {
                RowState::Removing { deadline } => Some((deadline, *r)),
                _ => None,
            })
            .collect()
    }

    fn commit_removal(&mut self, doc: &mut Document, row: RowId) {
        let _entered = self.span.clone().entered();
        let node = self.slots[row.0].node;
        doc.remove(node);
        doc.remove_class(node, &self.options.pending_css_class);
        self.slots[row.0].state = RowState::Removed;
        self.order.retain(|r| *r != row);

        let remaining = self.total_forms();
        self.counters.set_total_forms(doc, remaining);
        if self.below_max() {
            self.set_add_visible(doc, true);
        }
        self.toggle_delete_controls(doc);
        self.renumber(doc);

        if let Some(hook) = self.options.removed.clone() {
            hook(doc, node);
        }
        self.row_removed.send(&RowRemoved {
            prefix: self.prefix().to_string(),
            row: node,
            remaining,
        });
        tracing::debug!(remaining, "row removed");
    }

    // ── Bookkeeping ──────────────────────────────────────────────────

    /// Rewrites every counted row to its position, row element included.
    fn renumber(&self, doc: &mut Document) {
        for (index, row) in self.order.iter().enumerate() {
            self.pattern
                .relabel_subtree(doc, self.slots[row.0].node, index, true);
        }
    }

    /// Slots are never reused: a removed row keeps its slot so stale
    /// [`RowId`]s resolve to [`RowState::Removed`] instead of another row.
    fn push_slot(&mut self, node: NodeId, delete_control: Option<NodeId>) -> RowId {
        let id = RowId(self.slots.len());
        self.slots.push(RowSlot {
            node,
            state: RowState::Live,
            delete_control,
        });
        self.order.push(id);
        id
    }

    /// `true` while removing one more row keeps the formset at or above
    /// `MIN_NUM_FORMS`, counting rows that are already fading out as gone.
    fn above_min(&self) -> bool {
        let settled = self.total_forms() - self.pending().len();
        self.min_forms.map_or(true, |min| settled > min)
    }

    fn below_max(&self) -> bool {
        self.max_forms.map_or(true, |max| self.total_forms() < max)
    }

    fn toggle_delete_controls(&self, doc: &mut Document) {
        let hide = self.min_forms.is_some_and(|min| self.total_forms() <= min);
        for control in self.delete_controls() {
            if hide {
                doc.hide(control);
            } else {
                doc.show(control);
            }
        }
    }

    fn add_wrapper(&self, doc: &Document) -> Option<NodeId> {
        self.add_button.and_then(|button| doc.parent(button))
    }

    fn set_add_visible(&self, doc: &mut Document, visible: bool) {
        if let Some(wrapper) = self.add_wrapper(doc) {
            if visible {
                doc.show(wrapper);
            } else {
                doc.hide(wrapper);
            }
        }
    }

    /// Returns the delete control inside `row`, injecting one if missing.
    fn ensure_delete_control(&self, doc: &mut Document, row: NodeId) -> NodeId {
        let class = &self.options.delete_css_class;
        if let Some(existing) = doc
            .find(row, |e| e.is("a") && e.has_class(class))
            .first()
            .copied()
        {
            return existing;
        }

        let link = doc.create_element_with(
            "a",
            &[
                ("role", "button"),
                ("class", class),
                ("href", "#"),
                ("aria-label", "Remove this form"),
            ],
        );
        doc.set_text(link, &self.options.delete_text);

        let (wrapper_tag, host) = match doc.tag(row) {
            Some("tr") => ("div", doc.element_children(row).last().copied()),
            Some("ul" | "ol") => ("li", Some(row)),
            _ => ("span", doc.element_children(row).first().copied()),
        };
        let wrapper = doc.create_element(wrapper_tag);
        doc.append_child(wrapper, link);
        doc.append_child(host.unwrap_or(row), wrapper);
        link
    }

    /// Finds or creates the add control next to the rows.
    ///
    /// Table rows get a trailing `tr` spanning every column; other layouts
    /// get a `div` right after the last row.
    fn ensure_add_button(&self, doc: &mut Document, rows: &[NodeId]) -> Option<NodeId> {
        let first = *rows.first()?;
        let last = *rows.last()?;
        let parent = doc.parent(last)?;
        let class = self.options.add_css_class.clone();

        let wrapper = if doc.tag(first) == Some("tr") {
            let existing = doc
                .element_children(parent)
                .into_iter()
                .find(|n| doc.tag(*n) == Some("tr") && doc.has_class(*n, &class));
            existing.unwrap_or_else(|| {
                let columns = doc.element_children(last).len().to_string();
                let tr = doc.create_element_with("tr", &[("class", &class), ("role", "presentation")]);
                let td = doc.create_element_with("td", &[("colspan", &columns)]);
                doc.append_child(tr, td);
                doc.append_child(parent, tr);
                tr
            })
        } else {
            let existing = doc
                .next_element_sibling(last)
                .filter(|n| doc.has_class(*n, &class));
            existing.unwrap_or_else(|| {
                let div = doc.create_element_with("div", &[("class", &class)]);
                doc.insert_after(div, last);
                div
            })
        };

        if let Some(link) = doc
            .find(wrapper, |e| e.is("a") && e.has_class("addlink"))
            .first()
            .copied()
        {
            return Some(link);
        }

        let host = if doc.tag(wrapper) == Some("tr") {
            doc.element_children(wrapper).first().copied().unwrap_or(wrapper)
        } else {
            wrapper
        };
        let label = add_label(&self.options.add_text);
        let link = doc.create_element_with(
            "a",
            &[
                ("role", "button"),
                ("class", "addlink inline-add-button"),
                ("href", "#"),
                ("aria-label", &label),
            ],
        );
        doc.set_text(link, &self.options.add_text);
        doc.append_child(host, link);
        Some(link)
    }
}

/// Accessible name of the add link: `Add another <text>` in lower case.
fn add_label(add_text: &str) -> String {
    format!("Add another {}", add_text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::management::ManagementForm;

    /// A `<ul>`-free minimal page: counters plus `<div>` rows and a template.
    fn page(rows: usize, min: usize, max: usize) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let group = doc.create_element_with("div", &[("id", "item-group")]);
        doc.append_child(body, group);
        ManagementForm::new("item")
            .with_total(rows)
            .with_min_num(min)
            .with_max_num(max)
            .append_to(&mut doc, group);

        let mut nodes = Vec::new();
        for i in 0..rows {
            nodes.push(row(&mut doc, group, &i.to_string(), false));
        }
        nodes.push(row(&mut doc, group, "__prefix__", true));
        (doc, nodes)
    }

    fn row(doc: &mut Document, group: NodeId, index: &str, template: bool) -> NodeId {
        let id = if template {
            "item-empty".to_string()
        } else {
            format!("item-{index}")
        };
        let div = doc.create_element_with("div", &[("id", &id), ("class", "inline-related")]);
        if template {
            doc.add_class(div, "empty-row");
            doc.hide(div);
        }
        let header = doc.create_element("h3");
        doc.append_child(div, header);
        let input = doc.create_element_with(
            "input",
            &[
                ("name", &format!("item-{index}-name")),
                ("id", &format!("id_item-{index}-name")),
            ],
        );
        doc.append_child(div, input);
        doc.append_child(group, div);
        div
    }

    fn options() -> FormsetOptions {
        FormsetOptions::default()
            .with_prefix("item")
            .with_transition(Duration::ZERO)
    }

    fn names(doc: &Document, manager: &FormsetManager) -> Vec<String> {
        manager
            .rows()
            .iter()
            .map(|r| {
                let node = manager.row_node(*r).unwrap();
                let input = doc.find_by_tag(node, "input")[0];
                doc.attr(input, "name").unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn test_attach_marks_rows_and_injects_delete_controls() {
        let (mut doc, rows) = page(2, 0, 0);
        let manager = FormsetManager::attach(&mut doc, &rows, options());

        assert_eq!(manager.total_forms(), 2);
        assert!(doc.has_class(rows[0], "dynamic-form"));
        assert!(!doc.has_class(rows[2], "dynamic-form"));
        assert_eq!(manager.delete_controls().len(), 2);
        // Stacked rows host the control in their first child.
        let control = manager.delete_controls()[0];
        let span = doc.parent(control).unwrap();
        assert_eq!(doc.tag(span), Some("span"));
        assert_eq!(doc.tag(doc.parent(span).unwrap()), Some("h3"));
        assert!(manager.is_add_visible(&doc));
    }

    #[test]
    fn test_attach_sets_autocomplete_off() {
        let (mut doc, rows) = page(1, 0, 0);
        FormsetManager::attach(&mut doc, &rows, options());
        let total = doc.by_id("id_item-TOTAL_FORMS").unwrap();
        assert_eq!(doc.attr(total, "autocomplete"), Some("off"));
    }

    #[test]
    fn test_add_row_relabels_and_counts() {
        let (mut doc, rows) = page(1, 0, 0);
        let mut manager = FormsetManager::attach(&mut doc, &rows, options());

        let added = manager.add_row(&mut doc).unwrap();
        let node = manager.row_node(added).unwrap();
        assert_eq!(doc.attr(node, "id"), Some("item-1"));
        assert_eq!(doc.attr(node, "role"), Some("form"));
        assert!(!doc.has_class(node, "empty-row"));
        assert!(doc.is_visible(node));
        assert_eq!(names(&doc, &manager), vec!["item-0-name", "item-1-name"]);
        let total = doc.by_id("id_item-TOTAL_FORMS").unwrap();
        assert_eq!(doc.attr(total, "value"), Some("2"));
        // Inserted before the template.
        assert_eq!(doc.next_element_sibling(node), Some(rows[1]));
    }

    #[test]
    fn test_add_row_focuses_first_visible_input() {
        let (mut doc, rows) = page(0, 0, 0);
        let mut manager = FormsetManager::attach(&mut doc, &rows, options());
        let added = manager.add_row(&mut doc).unwrap();
        let focused = doc.focused().unwrap();
        assert!(doc.is_inclusive_descendant_of(focused, manager.row_node(added).unwrap()));
    }

    #[test]
    fn test_add_row_without_template_is_noop() {
        let (mut doc, rows) = page(1, 0, 0);
        let template = *rows.last().unwrap();
        let mut manager = FormsetManager::attach(&mut doc, &rows, options());
        doc.remove(template);

        assert!(manager.add_row(&mut doc).is_none());
        assert_eq!(manager.total_forms(), 1);
        let total = doc.by_id("id_item-TOTAL_FORMS").unwrap();
        assert_eq!(doc.attr(total, "value"), Some("1"));
    }

    #[test]
    fn test_remove_row_renumbers() {
        let (mut doc, rows) = page(3, 0, 0);
        let mut manager = FormsetManager::attach(&mut doc, &rows, options());
        let first = manager.rows()[0];

        assert!(manager.remove_row(&mut doc, first));
        assert_eq!(manager.total_forms(), 2);
        assert_eq!(names(&doc, &manager), vec!["item-0-name", "item-1-name"]);
        let second = manager.row_node(manager.rows()[1]).unwrap();
        assert_eq!(doc.attr(second, "id"), Some("item-1"));
        assert_eq!(manager.row_state(first), Some(RowState::Removed));
        assert!(!manager.remove_row(&mut doc, first));
    }

    #[test]
    fn test_transition_keeps_row_counted_until_deadline() {
        let (mut doc, rows) = page(2, 0, 0);
        let opts = options().with_transition(Duration::from_millis(300));
        let mut manager = FormsetManager::attach(&mut doc, &rows, opts);
        let row = manager.rows()[0];
        let now = Instant::now();

        assert!(manager.request_removal(&mut doc, row, now));
        assert!(!manager.request_removal(&mut doc, row, now));
        assert!(doc.has_class(manager.row_node(row).unwrap(), "removing"));
        assert_eq!(manager.total_forms(), 2);

        assert_eq!(manager.poll_transitions(&mut doc, now + Duration::from_millis(299)), 0);
        assert_eq!(manager.total_forms(), 2);
        assert_eq!(manager.poll_transitions(&mut doc, now + Duration::from_millis(300)), 1);
        assert_eq!(manager.total_forms(), 1);
        assert!(manager.next_deadline().is_none());
    }

    #[test]
    fn test_hooks_and_signals_fire() {
        let (mut doc, rows) = page(1, 0, 0);
        let hook_calls = Arc::new(AtomicUsize::new(0));
        let hc = hook_calls.clone();
        let opts = options().with_added(move |_, _| {
            hc.fetch_add(1, Ordering::SeqCst);
        });
        let mut manager = FormsetManager::attach(&mut doc, &rows, opts);

        let removed = Arc::new(AtomicUsize::new(0));
        let r = removed.clone();
        manager.on_row_removed("count", move |event| {
            assert_eq!(event.prefix, "item");
            r.fetch_add(1, Ordering::SeqCst);
        });

        let added = manager.add_row(&mut doc).unwrap();
        manager.remove_row(&mut doc, added);
        assert_eq!(hook_calls.load(Ordering::SeqCst), 1);
        assert_eq!(removed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_original_rows_have_no_delete_control() {
        let (mut doc, rows) = page(2, 0, 0);
        doc.add_class(rows[0], HAS_ORIGINAL_CLASS);
        let manager = FormsetManager::attach(&mut doc, &rows, options());
        assert_eq!(manager.total_forms(), 2);
        assert_eq!(manager.delete_control(manager.rows()[0]), None);
        assert!(manager.delete_control(manager.rows()[1]).is_some());
    }

    #[test]
    fn test_counter_rewritten_when_it_disagrees() {
        let (mut doc, rows) = page(2, 0, 0);
        let total = doc.by_id("id_item-TOTAL_FORMS").unwrap();
        doc.set_attr(total, "value", "5");
        let manager = FormsetManager::attach(&mut doc, &rows, options());
        assert_eq!(manager.total_forms(), 2);
        assert_eq!(doc.attr(total, "value"), Some("2"));
    }

    #[test]
    fn test_removal_stops_at_min_forms_with_pending_fades() {
        let (mut doc, rows) = page(3, 1, 0);
        let opts = options().with_transition(Duration::from_millis(300));
        let mut manager = FormsetManager::attach(&mut doc, &rows, opts);
        let counted = manager.rows().to_vec();
        let now = Instant::now();

        assert!(manager.request_removal(&mut doc, counted[0], now));
        assert!(manager.request_removal(&mut doc, counted[1], now));
        assert!(!manager.request_removal(&mut doc, counted[2], now));
        assert_eq!(manager.row_state(counted[2]), Some(RowState::Live));

        assert_eq!(manager.finish_transitions(&mut doc), 2);
        assert_eq!(manager.total_forms(), 1);
        assert!(!manager.remove_row(&mut doc, counted[2]));
        assert_eq!(manager.total_forms(), 1);
    }

    #[test]
    fn test_click_on_hidden_delete_control_is_ignored() {
        let (mut doc, rows) = page(1, 1, 0);
        let mut manager = FormsetManager::attach(&mut doc, &rows, options());
        let control = manager.delete_controls()[0];
        assert!(!manager.are_delete_controls_visible(&doc));

        assert!(!manager.click_delete(&mut doc, control, Instant::now()));
        assert_eq!(manager.total_forms(), 1);
        assert!(doc.is_attached(rows[0]));
    }

    #[test]
    fn test_add_link_label() {
        let (mut doc, rows) = page(1, 0, 0);
        let manager = FormsetManager::attach(&mut doc, &rows, options().with_add_text("Item"));
        let link = manager.add_button().unwrap();
        assert_eq!(doc.attr(link, "aria-label"), Some("Add another item"));
        assert_eq!(doc.text_content(link), "Item");
    }
}
