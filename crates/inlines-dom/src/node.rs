//! Node ids and element data.

use std::fmt;

/// A handle to a node in a [`Document`](crate::Document) arena.
///
/// Ids are never reused within a document, so a handle to a removed node
/// keeps pointing at that (now detached) node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw arena slot of this node.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root. Exactly one per document.
    Document,
    /// An element with a tag and attributes.
    Element(Element),
    /// A run of text.
    Text(String),
}

/// An element: a tag name, ordered attributes, and a display flag.
///
/// The `class` attribute is stored like any other attribute; the class
/// helpers split it on whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    hidden: bool,
}

impl Element {
    /// Creates an element with no attributes. Tag names are lowercased.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            hidden: false,
        }
    }

    /// Returns the lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns `true` if the element has the given tag.
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Returns the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, keeping the position of an existing one.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Removes an attribute and returns its old value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k == name)?;
        Some(self.attrs.remove(pos).1)
    }

    /// Returns the attributes in insertion order.
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    /// Returns the classes of this element.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Returns `true` if the element carries the class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Adds a class unless already present.
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr("class", joined);
    }

    /// Removes a class if present.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", joined);
    }

    /// Returns `true` if the element itself is hidden.
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Sets the display flag of the element itself.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}
