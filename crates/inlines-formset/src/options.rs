//! Per-formset configuration.
//!
//! A [`FormsetOptions`] value is built from pure defaults (or from loaded
//! [`Settings`]) and handed to [`FormsetManager::attach`](crate::FormsetManager::attach).
//! Each manager owns its own copy, so two formsets on one page never share
//! mutable configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use inlines_core::{InlineDefaults, Settings};
use inlines_dom::{Document, NodeId};

/// A hook run after a row is added or removed.
///
/// Receives the document and the row element. For removals the row is
/// already detached from the page when the hook runs.
pub type RowHook = Arc<dyn Fn(&mut Document, NodeId) + Send + Sync>;

/// Configuration for one formset manager.
#[derive(Clone)]
pub struct FormsetOptions {
    /// The formset prefix for `name`/`id` attributes.
    pub prefix: String,
    /// Text of the add control.
    pub add_text: String,
    /// Text of each delete control.
    pub delete_text: String,
    /// Class of the element wrapping the add control.
    pub add_css_class: String,
    /// Class of each delete control.
    pub delete_css_class: String,
    /// Class marking the template row.
    pub empty_css_class: String,
    /// Class marking a live row.
    pub form_css_class: String,
    /// Class set on a row while its removal transition runs.
    pub pending_css_class: String,
    /// Length of the removal transition.
    pub transition: Duration,
    /// An add control supplied by the page instead of a generated one.
    pub add_button: Option<NodeId>,
    /// Run after a row is added.
    pub added: Option<RowHook>,
    /// Run after a row is removed.
    pub removed: Option<RowHook>,
}

impl Default for FormsetOptions {
    fn default() -> Self {
        Self::from_defaults(&InlineDefaults::default())
    }
}

impl fmt::Debug for FormsetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormsetOptions")
            .field("prefix", &self.prefix)
            .field("add_text", &self.add_text)
            .field("delete_text", &self.delete_text)
            .field("add_css_class", &self.add_css_class)
            .field("delete_css_class", &self.delete_css_class)
            .field("empty_css_class", &self.empty_css_class)
            .field("form_css_class", &self.form_css_class)
            .field("pending_css_class", &self.pending_css_class)
            .field("transition", &self.transition)
            .field("add_button", &self.add_button)
            .field("added", &self.added.is_some())
            .field("removed", &self.removed.is_some())
            .finish()
    }
}

impl FormsetOptions {
    /// Builds options from a set of inline defaults.
    pub fn from_defaults(defaults: &InlineDefaults) -> Self {
        Self {
            prefix: defaults.prefix.clone(),
            add_text: defaults.add_text.clone(),
            delete_text: defaults.delete_text.clone(),
            add_css_class: defaults.add_css_class.clone(),
            delete_css_class: defaults.delete_css_class.clone(),
            empty_css_class: defaults.empty_css_class.clone(),
            form_css_class: defaults.form_css_class.clone(),
            pending_css_class: defaults.pending_css_class.clone(),
            transition: Duration::from_millis(defaults.transition_ms),
            add_button: None,
            added: None,
            removed: None,
        }
    }

    /// Builds options from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_defaults(&settings.inlines)
    }

    /// Sets the formset prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the add control text.
    #[must_use]
    pub fn with_add_text(mut self, text: impl Into<String>) -> Self {
        self.add_text = text.into();
        self
    }

    /// Sets the delete control text.
    #[must_use]
    pub fn with_delete_text(mut self, text: impl Into<String>) -> Self {
        self.delete_text = text.into();
        self
    }

    /// Sets the class of each delete control.
    #[must_use]
    pub fn with_delete_css_class(mut self, class: impl Into<String>) -> Self {
        self.delete_css_class = class.into();
        self
    }

    /// Sets the class marking the template row.
    #[must_use]
    pub fn with_empty_css_class(mut self, class: impl Into<String>) -> Self {
        self.empty_css_class = class.into();
        self
    }

    /// Sets the class marking live rows.
    #[must_use]
    pub fn with_form_css_class(mut self, class: impl Into<String>) -> Self {
        self.form_css_class = class.into();
        self
    }

    /// Sets the removal transition length.
    #[must_use]
    pub const fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    /// Uses an existing element as the add control.
    #[must_use]
    pub const fn with_add_button(mut self, button: NodeId) -> Self {
        self.add_button = Some(button);
        self
    }

    /// Sets the hook run after each add.
    #[must_use]
    pub fn with_added(
        mut self,
        hook: impl Fn(&mut Document, NodeId) + Send + Sync + 'static,
    ) -> Self {
        self.added = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run after each removal.
    #[must_use]
    pub fn with_removed(
        mut self,
        hook: impl Fn(&mut Document, NodeId) + Send + Sync + 'static,
    ) -> Self {
        self.removed = Some(Arc::new(hook));
        self
    }
}
