//! HTML loading (via `scraper`) and serialization

use scraper::{ElementRef, Html, Node as HtmlNode};

use super::{Document, NodeData, NodeId};
use crate::error::Result;

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text is emitted without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "xmp", "iframe", "noembed", "noframes"];

impl Document {
    /// Parse a complete HTML document
    pub fn parse_html(source: &str) -> Self {
        let html = Html::parse_document(source);
        let mut doc = Self::new();
        let root = doc.root();

        for child in html.tree.root().children() {
            match child.value() {
                HtmlNode::Doctype(doctype) => {
                    let id = doc.push(NodeData::Doctype(doctype.name().to_string()));
                    doc.link(root, id);
                }
                HtmlNode::Comment(comment) => {
                    let id = doc.create_comment(&**comment);
                    doc.link(root, id);
                }
                HtmlNode::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        let id = doc.import_element(element);
                        doc.link(root, id);
                    }
                }
                _ => {}
            }
        }
        doc
    }

    /// Parse an HTML fragment and append its nodes to `parent`
    ///
    /// Returns the inserted top-level nodes.
    pub fn append_html(&mut self, parent: NodeId, source: &str) -> Result<Vec<NodeId>> {
        let html = Html::parse_fragment(source);
        let container = self.create_element("div");
        self.import_children(container, html.root_element());

        let nodes = self.children(container).to_vec();
        let mut moved = Ok(());
        for &node in &nodes {
            self.unlink(node);
            if let Err(e) = self.append_child(parent, node) {
                moved = Err(e);
                break;
            }
        }
        self.release(container);
        moved.map(|()| nodes)
    }

    fn import_element(&mut self, element: ElementRef<'_>) -> NodeId {
        let value = element.value();
        let id = self.create_element(value.name());
        if let Some(NodeData::Element(el)) = self.slot_mut(id).map(|n| &mut n.data) {
            // Keep prefixes so `xlink:href` and friends survive serialization.
            el.attrs = value
                .attrs
                .iter()
                .map(|(name, val)| {
                    let name = match name.prefix {
                        Some(ref prefix) => format!("{}:{}", prefix, name.local),
                        None => name.local.to_string(),
                    };
                    (name, val.to_string())
                })
                .collect();
        }
        self.import_children(id, element);
        id
    }

    fn import_children(&mut self, parent: NodeId, element: ElementRef<'_>) {
        for child in element.children() {
            let id = match child.value() {
                HtmlNode::Text(text) => self.create_text(&**text),
                HtmlNode::Comment(comment) => self.create_comment(&**comment),
                HtmlNode::Element(_) => match ElementRef::wrap(child) {
                    Some(el) => self.import_element(el),
                    None => continue,
                },
                _ => continue,
            };
            self.link(parent, id);
        }
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root()) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialize one node and its subtree
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the children of a node
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Document) => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            Some(NodeData::Doctype(name)) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                out.push('>');
            }
            Some(NodeData::Comment(text)) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            Some(NodeData::Text(text)) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.tag(p))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            Some(NodeData::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            None => {}
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structure() {
        let doc = Document::parse_html(
            "<!DOCTYPE html><html><head><title>T</title></head><body><p id=\"x\">Hi <b>there</b></p></body></html>",
        );
        let body = doc.body().unwrap();
        let p = doc.get_element_by_id("x").unwrap();
        assert_eq!(doc.parent(p), Some(body));
        assert_eq!(doc.text_content(p), "Hi there");
        assert!(doc.head().is_some());
    }

    #[test]
    fn test_parse_fills_missing_structure() {
        let doc = Document::parse_html("<p>loose</p>");
        assert!(doc.head().is_some());
        assert_eq!(doc.text_content(doc.body().unwrap()), "loose");
    }

    #[test]
    fn test_serialize_roundtrip_stable() {
        let source = "<!DOCTYPE html><html><head></head><body><p class=\"a\">x &amp; y<br></p><script>if (a < b) {}</script></body></html>";
        let doc = Document::parse_html(source);
        assert!(doc.to_html().contains("<use xlink:href=\"#icon\"></use>"));
    }

    #[test]
    fn test_append_html() {
        let mut doc = Document::with_skeleton();
        let body = doc.body().unwrap();
        doc.observe();
        let added = doc.append_html(body, "<p>one</p>two").unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(doc.inner_html(body), "<p>one</p>two");
        assert_eq!(doc.take_records().len(), 2);
        // root, html, head, body, p, "one", "two"
        assert_eq!(doc.live_nodes(), 7);
    }

    #[test]
    fn test_namespaced_attributes_keep_prefix() {
        let source = "<html><head></head><body><svg><use xlink:href=\"#icon\"></use></svg></body></html>";
        let doc = Document::parse_html(source);
        assert!(doc.to_html().contains("<use xlink:href=\"#icon\"></use>"));
    }
}
