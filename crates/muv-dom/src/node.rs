//! Node handles and element-kind capabilities.
//!
//! [`NodeId`] is an index into the document arena. Handles stay valid for
//! the document's lifetime; nodes removed from the tree are marked dead
//! rather than reclaimed, so a stale handle can never alias a new node.
//!
//! The capability predicates are static element-kind checks: a tag either
//! is a form control carrying `value`, or a resource-bearing element
//! carrying `src`, independent of any live node state.

use ahash::AHashMap;

/// Handle to a node in a [`Document`](crate::Document) arena.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index, for diagnostics.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element kinds whose rendered value lands in the `value` attribute.
#[must_use]
pub fn supports_value(tag: &str) -> bool {
    matches!(
        tag,
        "input" | "textarea" | "select" | "option" | "button" | "output" | "progress" | "meter"
    )
}

/// Element kinds whose rendered value lands in the `src` attribute.
#[must_use]
pub fn supports_src(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "iframe" | "script" | "audio" | "video" | "source" | "track" | "embed"
    )
}

/// Void elements: never pushed on the parser's open-element stack and never
/// given children.
pub(crate) fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

#[derive(Debug)]
pub(crate) enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug)]
pub(crate) struct ElementData {
    pub tag: String,
    pub attrs: AHashMap<String, String>,
    pub children: Vec<NodeId>,
}

#[derive(Debug)]
pub(crate) struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    /// Cleared when the node is detached from the tree; dead nodes are
    /// skipped by every traversal and their listeners are dropped.
    pub alive: bool,
}
