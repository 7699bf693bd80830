//! Live document model
//!
//! An arena-backed node tree standing in for the host page. Nodes are
//! addressed by [`NodeId`]. A handle to a detached node stays valid until
//! the node is given back with [`Document::release`]; released slots are
//! reused by later nodes.
//!
//! Structural changes are recorded as [`MutationRecord`]s while an observer
//! is installed, and every structural change fails with
//! [`Error::AccessDenied`] while the document is locked.

mod html;

use crate::error::{Error, Result};

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
}

impl Element {
    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the `class` attribute contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document root
    Document,
    /// `<!DOCTYPE name>`
    Doctype(String),
    /// An element (container)
    Element(Element),
    /// A text leaf
    Text(String),
    /// A comment
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    live: bool,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            live: true,
        }
    }
}

/// A structural change (children added to or removed from `target`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent whose child list changed
    pub target: NodeId,
    /// Nodes inserted
    pub added: Vec<NodeId>,
    /// Nodes removed
    pub removed: Vec<NodeId>,
}

/// A mutable document tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    observing: bool,
    records: Vec<MutationRecord>,
    locked: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (just the root)
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            free: Vec::new(),
            observing: false,
            records: Vec::new(),
            locked: false,
        }
    }

    /// Create a `<html><head></head><body></body></html>` skeleton
    pub fn with_skeleton() -> Self {
        let mut doc = Self::new();
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(html, head);
        doc.link(html, body);
        let root = doc.root();
        doc.link(root, html);
        doc
    }

    /// The document root node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The first element child of the root (usually `<html>`)
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    /// The `<head>` element, if any
    pub fn head(&self) -> Option<NodeId> {
        self.find_element(|el| el.tag == "head")
    }

    /// The `<body>` element, if any
    pub fn body(&self) -> Option<NodeId> {
        self.find_element(|el| el.tag == "body")
    }

    /// Element with the given `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_element(|el| el.attr("id") == Some(id))
    }

    fn find_element(&self, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.element(id).is_some_and(&pred))
    }

    // ---- node access ----

    fn slot(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).filter(|n| n.live)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).filter(|n| n.live)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.slot(id).ok_or(Error::NodeNotFound(id.0))
    }

    /// Node payload
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.slot(id).map(|n| &n.data)
    }

    /// Element payload, if `id` is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Lowercase tag name, if `id` is an element
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Text content of a text leaf
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Parent node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).and_then(|n| n.parent)
    }

    /// Child nodes in order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.slot(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// `id` and all its descendants in document (pre-)order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Concatenated text of all descendant text leaves
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    /// Nearest inclusive ancestor element carrying `class`
    pub fn closest_with_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.element(node).is_some_and(|el| el.has_class(class)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Attached elements carrying `class`, outermost only, in document order
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if self.element(node).is_some_and(|el| el.has_class(class)) {
                out.push(node);
                continue;
            }
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    // ---- node creation ----

    fn push(&mut self, data: NodeData) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = Node::new(data);
            return id;
        }
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    /// Give a detached subtree back to the arena
    ///
    /// Handles to `id` and its descendants become invalid and their slots are
    /// reused. Attached nodes (and the root) are left alone. Returns the
    /// number of nodes released.
    pub fn release(&mut self, id: NodeId) -> usize {
        match self.slot(id) {
            Some(node) if node.parent.is_none() && id != self.root() => {}
            _ => return 0,
        }
        let released = self.descendants(id);
        for &node in &released {
            self.nodes[node.0] = Node {
                live: false,
                ..Node::new(NodeData::Text(String::new()))
            };
            self.free.push(node);
        }
        released.len()
    }

    /// Number of live nodes, the root included
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of slots the arena has grown to
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    /// Create a detached element with a class attribute
    pub fn create_element_with_class(&mut self, tag: &str, class: &str) -> NodeId {
        let id = self.create_element(tag);
        if let Some(NodeData::Element(el)) = self.slot_mut(id).map(|n| &mut n.data) {
            el.attrs.push(("class".to_string(), class.to_string()));
        }
        id
    }

    /// Set (or overwrite) an attribute on an element
    ///
    /// Attribute changes are not structural and produce no record.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.slot_mut(id).ok_or(Error::NodeNotFound(id.0))?;
        if let NodeData::Element(el) = &mut node.data {
            match el.attrs.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
                Some((_, existing)) => *existing = value.to_string(),
                None => el.attrs.push((name.to_ascii_lowercase(), value.to_string())),
            }
        }
        Ok(())
    }

    /// Create a detached text leaf
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    // ---- building detached subtrees (not observed, not locked) ----

    /// Append `child` under a node that is not attached to the document
    ///
    /// Used to assemble fragments before inserting them.
    pub fn append_detached(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_attached(parent) {
            return self.append_child(parent, child);
        }
        self.unlink(child);
        self.link(parent, child);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn unlink(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes[child.0].parent.take()?;
        let siblings = &mut self.nodes[parent.0].children;
        let index = siblings.iter().position(|&c| c == child)?;
        siblings.remove(index);
        Some((parent, index))
    }

    // ---- observed structural mutations ----

    fn check_writable(&self) -> Result<()> {
        if self.locked {
            Err(Error::access_denied("document does not permit modification"))
        } else {
            Ok(())
        }
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.observing {
            self.records.push(MutationRecord {
                target,
                added,
                removed,
            });
        }
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_writable()?;
        self.node(parent)?;
        self.node(child)?;
        if let Some((old_parent, _)) = self.unlink(child) {
            self.record(old_parent, Vec::new(), vec![child]);
        }
        self.link(parent, child);
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Put `new` where `old` is; `old` becomes detached
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        self.check_writable()?;
        self.node(new)?;
        let parent = self.node(old)?.parent.ok_or(Error::NodeNotFound(old.0))?;
        self.unlink(new);
        let (_, index) = self.unlink(old).ok_or(Error::NodeNotFound(old.0))?;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(index, new);
        self.record(parent, vec![new], vec![old]);
        Ok(())
    }

    /// Detach `id` from its parent
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.check_writable()?;
        self.node(id)?;
        if let Some((parent, _)) = self.unlink(id) {
            self.record(parent, Vec::new(), vec![id]);
        }
        Ok(())
    }

    // ---- observation and access control ----

    /// Start recording structural mutations
    pub fn observe(&mut self) {
        self.observing = true;
    }

    /// Stop recording and drop pending records
    pub fn disconnect(&mut self) {
        self.observing = false;
        self.records.clear();
    }

    /// Whether an observer is installed
    pub fn is_observed(&self) -> bool {
        self.observing
    }

    /// Drain pending mutation records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    /// Refuse (or allow again) structural modification
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Whether modification is refused
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
