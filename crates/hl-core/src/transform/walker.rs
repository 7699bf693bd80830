//! Candidate collection
//!
//! First phase of a pass: walk the tree in document order and collect the
//! text leaves that qualify for transformation. Nothing is modified here.

use crate::dom::{Document, NodeData, NodeId};

/// Containers whose content is never transformed
pub const OPAQUE_TAGS: &[&str] = &[
    "script", "style", "noscript", "textarea", "input", "select", "option", "code", "pre",
];

/// Which subtrees the walk has to leave alone
#[derive(Debug, Clone)]
pub struct SkipRules<'a> {
    /// Class marking a processed region
    pub processed_class: &'a str,
    /// Tags skipped in addition to [`OPAQUE_TAGS`]
    pub extra_tags: &'a [String],
}

impl SkipRules<'_> {
    fn is_opaque(&self, tag: &str) -> bool {
        OPAQUE_TAGS.contains(&tag) || self.extra_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Editability contributed by an element's `contenteditable` attribute
///
/// `None` means the element inherits from its parent.
fn editable_override(value: Option<&str>) -> Option<bool> {
    let value = value?.trim();
    if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else if value.is_empty()
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("plaintext-only")
    {
        Some(true)
    } else {
        None
    }
}

/// Whether `id` sits in an editable region, looking at its ancestors
pub fn is_editable(doc: &Document, id: NodeId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(editable) = doc
            .element(node)
            .and_then(|el| editable_override(el.attr("contenteditable")))
        {
            return editable;
        }
        current = doc.parent(node);
    }
    false
}

/// Collect qualifying text leaves under `root`, in document order
pub fn collect_candidates(doc: &Document, root: NodeId, rules: &SkipRules<'_>) -> Vec<NodeId> {
    // A root already inside a skipped region yields nothing
    if doc.closest_with_class(root, rules.processed_class).is_some() {
        return Vec::new();
    }
    let ancestors_editable = doc.parent(root).is_some_and(|p| is_editable(doc, p));

    let mut out = Vec::new();
    let mut stack = vec![(root, ancestors_editable)];

    while let Some((node, inherited_editable)) = stack.pop() {
        match doc.data(node) {
            Some(NodeData::Text(text)) => {
                if !inherited_editable && doc.parent(node).is_some() && !text.trim().is_empty() {
                    out.push(node);
                }
            }
            Some(NodeData::Element(el)) => {
                if rules.is_opaque(&el.tag) || el.has_class(rules.processed_class) {
                    continue;
                }
                // Editable subtrees are still walked: a descendant may reset it
                let editable =
                    editable_override(el.attr("contenteditable")).unwrap_or(inherited_editable);
                for &child in doc.children(node).iter().rev() {
                    stack.push((child, editable));
                }
            }
            Some(NodeData::Document) => {
                for &child in doc.children(node).iter().rev() {
                    stack.push((child, inherited_editable));
                }
            }
            _ => {}
        }
    }

    out
}
