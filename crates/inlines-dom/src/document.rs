//! The node arena, tree mutation, and queries.
//!
//! Queries only see nodes that are attached to the root. A detached node
//! (freshly created, cloned, or removed) can still be inspected and mutated
//! through its id, and becomes visible to queries again once inserted.

use crate::node::{Element, NodeId, NodeKind};

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// An in-memory page.
///
/// Nodes live in an append-only arena for the lifetime of the document.
/// [`remove`](Self::remove) only detaches, so a [`NodeId`] never dangles
/// and a removed row can still be inspected; memory grows with every
/// created or cloned node until the document is dropped.
///
/// # Examples
///
/// ```
/// use inlines_dom::Document;
///
/// let mut doc = Document::new();
/// let body = doc.body();
/// let input = doc.create_element_with("input", &[("id", "id_task-0-title"), ("name", "task-0-title")]);
/// doc.append_child(body, input);
///
/// assert_eq!(doc.by_id("id_task-0-title"), Some(input));
/// doc.remove(input);
/// assert_eq!(doc.by_id("id_task-0-title"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document holding an empty `<body>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            body: NodeId(0),
            focused: None,
        };
        let body = doc.create_element("body");
        doc.append_child(doc.root, body);
        doc.body = body;
        doc
    }

    /// Returns the document root.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the `<body>` element.
    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// Returns the number of nodes ever created, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ── Creation ─────────────────────────────────────────────────────

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag)))
    }

    /// Creates a detached element with the given attributes.
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut element = Element::new(tag);
        for (k, v) in attrs {
            element.set_attr(*k, *v);
        }
        self.push(NodeKind::Element(element))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Deep-clones a subtree. The clone is detached.
    pub fn clone_subtree(&mut self, node: NodeId) -> NodeId {
        let kind = self.nodes[node.0].kind.clone();
        let copy = self.push(kind);
        let children = self.nodes[node.0].children.clone();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    // ── Structure ────────────────────────────────────────────────────

    /// Returns the parent of a node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Returns all child nodes, text included.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Returns the element children of a node.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    /// Returns the element immediately before `node` among its siblings.
    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == node)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|c| self.element(*c).is_some())
    }

    /// Returns the element immediately after `node` among its siblings.
    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|c| *c == node)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|c| self.element(*c).is_some())
    }

    /// Returns `true` if the node is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Returns `true` if `node` is `ancestor` or lies below it.
    pub fn is_inclusive_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Detaches `node` from its parent. The node and its subtree stay in the
    /// arena. Focus inside the subtree is dropped.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
        if let Some(focused) = self.focused {
            if self.is_inclusive_descendant_of(focused, node) {
                self.focused = None;
            }
        }
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `node` as the sibling immediately before `reference`.
    ///
    /// Does nothing if `reference` has no parent.
    pub fn insert_before(&mut self, node: NodeId, reference: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.remove(node);
        let Some(pos) = self.nodes[parent.0].children.iter().position(|c| *c == reference) else {
            return;
        };
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, node);
    }

    /// Inserts `node` as the sibling immediately after `reference`.
    ///
    /// Does nothing if `reference` has no parent.
    pub fn insert_after(&mut self, node: NodeId, reference: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        self.remove(node);
        let Some(pos) = self.nodes[parent.0].children.iter().position(|c| *c == reference) else {
            return;
        };
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos + 1, node);
    }

    // ── Element access ───────────────────────────────────────────────

    /// Returns what a node holds.
    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    /// Returns the element data of a node, if it is an element.
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns mutable element data of a node, if it is an element.
    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the tag of an element.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(Element::tag)
    }

    /// Returns an attribute of an element.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attr(name))
    }

    /// Sets an attribute on an element. Non-elements are ignored.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.set_attr(name, value);
        }
    }

    /// Returns `true` if the node is an element carrying the class.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_class(class))
    }

    /// Adds a class to an element.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            element.add_class(class);
        }
    }

    /// Removes a class from an element.
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            element.remove_class(class);
        }
    }

    /// Hides an element.
    pub fn hide(&mut self, node: NodeId) {
        if let Some(element) = self.element_mut(node) {
            element.set_hidden(true);
        }
    }

    /// Shows an element.
    pub fn show(&mut self, node: NodeId) {
        if let Some(element) = self.element_mut(node) {
            element.set_hidden(false);
        }
    }

    /// Returns `true` if the element is attached, neither it nor any
    /// ancestor is hidden, and it is not an `<input type="hidden">`.
    pub fn is_visible(&self, node: NodeId) -> bool {
        if !self.is_attached(node) {
            return false;
        }
        if self.tag(node) == Some("input") && self.attr(node, "type") == Some("hidden") {
            return false;
        }
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.element(current).is_some_and(Element::is_hidden) {
                return false;
            }
            cursor = self.parent(current);
        }
        true
    }

    /// Replaces the children of a node with a single text node.
    ///
    /// A lone text child is rewritten in place instead of being replaced.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let [only] = self.nodes[node.0].children[..] {
            if let NodeKind::Text(existing) = &mut self.nodes[only.0].kind {
                *existing = text.to_string();
                return;
            }
        }
        for child in self.nodes[node.0].children.clone() {
            self.remove(child);
        }
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    /// Returns the concatenated text below a node.
    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.clone(),
            _ => self
                .children(node)
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
        }
    }

    /// Returns the direct text children of a node, for in-place rewriting.
    pub fn text_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| matches!(self.kind(*c), NodeKind::Text(_)))
            .collect()
    }

    /// Overwrites the content of a text node. Elements are ignored.
    pub fn replace_text(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(existing) = &mut self.nodes[node.0].kind {
            *existing = text.to_string();
        }
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Moves focus to an element.
    pub fn focus(&mut self, node: NodeId) {
        self.focused = Some(node);
    }

    /// Returns the focused element, if any.
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Returns every node below `scope` in document order, `scope` excluded.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Returns the element descendants of `scope` matching a predicate.
    pub fn find(&self, scope: NodeId, predicate: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.element(*n).is_some_and(&predicate))
            .collect()
    }

    /// Returns the element descendants of `scope` carrying a class.
    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.find(scope, |e| e.has_class(class))
    }

    /// Returns the element descendants of `scope` with a tag.
    pub fn find_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.find(scope, |e| e.is(tag))
    }

    /// Returns the first attached element with the given `id` attribute.
    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    /// Returns `node` or its nearest ancestor whose element matches.
    pub fn closest(&self, node: NodeId, predicate: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.element(current).is_some_and(&predicate) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Returns `node` or its nearest ancestor carrying the class.
    pub fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.closest(node, |e| e.has_class(class))
    }
}
