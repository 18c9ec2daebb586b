//! Serializing a subtree back to HTML.
//!
//! Hidden elements are rendered with `style="display: none"`, which is how
//! the page would show them after the manager toggles a control.

use crate::document::Document;
use crate::node::{NodeId, NodeKind};

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

/// Escapes HTML special characters in a string.
///
/// Replaces `&`, `<`, `>`, `"`, and `'` with their HTML entity equivalents.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

impl Document {
    /// Renders a node and its subtree as HTML.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Renders the children of a node as HTML.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            NodeKind::Document => {
                for child in self.children(node) {
                    self.write_html(*child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(element.tag());
                for (k, v) in element.attrs() {
                    out.push_str(&format!(r#" {k}="{}""#, escape_html(v)));
                }
                if element.is_hidden() {
                    out.push_str(r#" style="display: none""#);
                }
                if VOID_ELEMENTS.contains(&element.tag()) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in self.children(node) {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(element.tag());
                out.push('>');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_nested_elements() {
        let mut doc = Document::new();
        let div = doc.create_element_with("div", &[("class", "add-row")]);
        let link = doc.create_element_with("a", &[("href", "#")]);
        doc.set_text(link, "Add another Task");
        doc.append_child(div, link);
        assert_eq!(
            doc.to_html(div),
            r##"<div class="add-row"><a href="#">Add another Task</a></div>"##
        );
    }

    #[test]
    fn test_render_void_and_hidden() {
        let mut doc = Document::new();
        let input = doc.create_element_with("input", &[("name", "task-0-title")]);
        doc.hide(input);
        assert_eq!(
            doc.to_html(input),
            r#"<input name="task-0-title" style="display: none" />"#
        );
    }

    #[test]
    fn test_inner_html_of_body() {
        let mut doc = Document::new();
        let body = doc.body();
        let p = doc.create_element("p");
        doc.set_text(p, "a < b");
        doc.append_child(body, p);
        assert_eq!(doc.inner_html(body), "<p>a &lt; b</p>");
    }
}
