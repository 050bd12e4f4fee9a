//! Arena-backed document: the mutable surface the render engine patches.
//!
//! A [`Document`] is a cheaply cloneable handle over shared state. It owns
//! the node arena, the tree structure, and the event-listener registry.
//!
//! # Invariants
//!
//! 1. Node handles never dangle: removed nodes are marked dead, not
//!    reclaimed, and every traversal skips dead nodes.
//! 2. `set_inner_html` is the only operation that detaches nodes; it also
//!    drops listeners attached to the removed subtree.
//! 3. At most one listener exists per (node, event type, owner) triple;
//!    re-attaching replaces the handler in place, so re-binding on every
//!    render pass never accumulates duplicates.
//! 4. `dispatch` snapshots matching handlers before invoking them, so a
//!    handler may freely mutate the document or the listener registry.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Dead/unknown node in a write | stale handle | Write ignored |
//! | Unparsable selector | unsupported syntax | Query returns empty |
//! | Dispatch on listener-less node | nothing bound | No-op |

use std::cell::RefCell;
use std::rc::Rc;

use muv_core::ViewId;

use crate::node::{ElementData, Node, NodeData, NodeId};
use crate::parse::{MarkupNode, parse_fragment};
use crate::selector::Selector;

/// Handler invoked when an event is dispatched to a node it is bound to.
/// The argument is the node the listener was attached to.
pub type EventHandler = Rc<dyn Fn(NodeId)>;

struct ListenerEntry {
    node: NodeId,
    event_type: String,
    owner: ViewId,
    handler: EventHandler,
}

struct DocInner {
    nodes: Vec<Node>,
    root: NodeId,
    /// Attach-order listener registry.
    listeners: Vec<ListenerEntry>,
}

/// Shared document handle. `Clone` shares the underlying arena.
pub struct Document {
    inner: Rc<RefCell<DocInner>>,
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an empty `body` root element.
    #[must_use]
    pub fn new() -> Self {
        let root_node = Node {
            data: NodeData::Element(ElementData {
                tag: "body".to_owned(),
                attrs: ahash::AHashMap::new(),
                children: Vec::new(),
            }),
            parent: None,
            alive: true,
        };
        Self {
            inner: Rc::new(RefCell::new(DocInner {
                nodes: vec![root_node],
                root: NodeId(0),
                listeners: Vec::new(),
            })),
        }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        push_node(
            &mut inner,
            NodeData::Element(ElementData {
                tag: tag.to_ascii_lowercase(),
                attrs: ahash::AHashMap::new(),
                children: Vec::new(),
            }),
            None,
        )
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        push_node(&mut inner, NodeData::Text(text.to_owned()), None)
    }

    /// Append `child` to `parent`'s children. Ignored if either handle is
    /// dead or `parent` is not an element.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut inner = self.inner.borrow_mut();
        if !alive(&inner, parent) || !alive(&inner, child) {
            return;
        }
        if let NodeData::Element(el) = &mut inner.nodes[parent.0].data {
            el.children.push(child);
        } else {
            return;
        }
        inner.nodes[child.0].parent = Some(parent);
    }

    /// Whether `node` is a live element in this document.
    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        let inner = self.inner.borrow();
        alive(&inner, node) && matches!(inner.nodes[node.0].data, NodeData::Element(_))
    }

    /// Element tag name, if `node` is a live element.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<String> {
        let inner = self.inner.borrow();
        if !alive(&inner, node) {
            return None;
        }
        match &inner.nodes[node.0].data {
            NodeData::Element(el) => Some(el.tag.clone()),
            NodeData::Text(_) => None,
        }
    }

    /// Set an attribute on a live element.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut inner = self.inner.borrow_mut();
        if !alive(&inner, node) {
            return;
        }
        if let NodeData::Element(el) = &mut inner.nodes[node.0].data {
            el.attrs.insert(name.to_ascii_lowercase(), value.to_owned());
        }
    }

    /// Read an attribute from a live element.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let inner = self.inner.borrow();
        if !alive(&inner, node) {
            return None;
        }
        match &inner.nodes[node.0].data {
            NodeData::Element(el) => el.attrs.get(name).cloned(),
            NodeData::Text(_) => None,
        }
    }

    /// Replace a live element's children with parsed `markup`.
    ///
    /// The previous subtree is marked dead and its listeners are dropped.
    /// Listeners on `node` itself survive.
    pub fn set_inner_html(&self, node: NodeId, markup: &str) {
        let fragment = parse_fragment(markup);
        let mut inner = self.inner.borrow_mut();
        if !alive(&inner, node) {
            return;
        }
        let old_children = match &mut inner.nodes[node.0].data {
            NodeData::Element(el) => std::mem::take(&mut el.children),
            NodeData::Text(_) => return,
        };
        for child in old_children {
            kill_subtree(&mut inner, child);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(node = node.0, "inner markup replaced");
        for piece in fragment {
            let child = build_markup(&mut inner, piece);
            if let NodeData::Element(el) = &mut inner.nodes[node.0].data {
                el.children.push(child);
            }
            inner.nodes[child.0].parent = Some(node);
        }
        let inner = &mut *inner;
        let nodes = &inner.nodes;
        inner.listeners.retain(|l| nodes[l.node.0].alive);
    }

    /// Concatenated text of `node`'s text descendants, in document order.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        collect_text(&inner, node, &mut out);
        out
    }

    /// All live elements matching `selector`, in document order. An
    /// unparsable selector matches nothing.
    #[must_use]
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(sel) = Selector::parse(selector) else {
            return Vec::new();
        };
        let inner = self.inner.borrow();
        document_order(&inner)
            .into_iter()
            .filter(|&id| match &inner.nodes[id.0].data {
                NodeData::Element(el) => sel.matches(&el.tag, &el.attrs),
                NodeData::Text(_) => false,
            })
            .collect()
    }

    /// First live element matching `selector`, in document order.
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// All live elements carrying attribute `name`, in document order.
    #[must_use]
    pub fn nodes_with_attribute(&self, name: &str) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        document_order(&inner)
            .into_iter()
            .filter(|&id| match &inner.nodes[id.0].data {
                NodeData::Element(el) => el.attrs.contains_key(name),
                NodeData::Text(_) => false,
            })
            .collect()
    }

    /// Attach `handler` for `event_type` on `node`, owned by `owner`.
    ///
    /// Replaces any previous handler for the same (node, event type, owner)
    /// triple in place, preserving its position in attach order.
    pub fn set_listener(
        &self,
        node: NodeId,
        event_type: &str,
        owner: ViewId,
        handler: EventHandler,
    ) {
        let mut inner = self.inner.borrow_mut();
        if !alive(&inner, node) {
            return;
        }
        if let Some(entry) = inner
            .listeners
            .iter_mut()
            .find(|l| l.node == node && l.event_type == event_type && l.owner == owner)
        {
            entry.handler = handler;
            return;
        }
        inner.listeners.push(ListenerEntry {
            node,
            event_type: event_type.to_owned(),
            owner,
            handler,
        });
    }

    /// Drop every listener owned by `owner`.
    pub fn remove_listeners(&self, owner: ViewId) {
        self.inner.borrow_mut().listeners.retain(|l| l.owner != owner);
    }

    /// Number of live listeners for (`node`, `event_type`), across owners.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event_type: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.node == node && l.event_type == event_type)
            .count()
    }

    /// Fire `event_type` on `node`: every matching handler runs in attach
    /// order. Handlers are snapshotted first, so they may mutate the
    /// document or the registry.
    pub fn dispatch(&self, node: NodeId, event_type: &str) {
        let snapshot: Vec<EventHandler> = {
            let inner = self.inner.borrow();
            if !alive(&inner, node) {
                return;
            }
            inner
                .listeners
                .iter()
                .filter(|l| l.node == node && l.event_type == event_type)
                .map(|l| Rc::clone(&l.handler))
                .collect()
        };
        for handler in snapshot {
            handler(node);
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("nodes", &inner.nodes.len())
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

fn alive(inner: &DocInner, node: NodeId) -> bool {
    inner.nodes.get(node.0).is_some_and(|n| n.alive)
}

fn push_node(inner: &mut DocInner, data: NodeData, parent: Option<NodeId>) -> NodeId {
    let id = NodeId(inner.nodes.len());
    inner.nodes.push(Node {
        data,
        parent,
        alive: true,
    });
    id
}

fn kill_subtree(inner: &mut DocInner, node: NodeId) {
    let mut pending = vec![node];
    while let Some(id) = pending.pop() {
        inner.nodes[id.0].alive = false;
        if let NodeData::Element(el) = &inner.nodes[id.0].data {
            pending.extend(el.children.iter().copied());
        }
    }
}

fn build_markup(inner: &mut DocInner, piece: MarkupNode) -> NodeId {
    match piece {
        MarkupNode::Text(text) => push_node(inner, NodeData::Text(text), None),
        MarkupNode::Element {
            tag,
            attrs,
            children,
        } => {
            let id = push_node(
                inner,
                NodeData::Element(ElementData {
                    tag,
                    attrs: attrs.into_iter().collect(),
                    children: Vec::new(),
                }),
                None,
            );
            for child_piece in children {
                let child = build_markup(inner, child_piece);
                if let NodeData::Element(el) = &mut inner.nodes[id.0].data {
                    el.children.push(child);
                }
                inner.nodes[child.0].parent = Some(id);
            }
            id
        }
    }
}

/// Pre-order walk of live nodes from the root.
fn document_order(inner: &DocInner) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut pending = vec![inner.root];
    while let Some(id) = pending.pop() {
        if !alive(inner, id) {
            continue;
        }
        out.push(id);
        if let NodeData::Element(el) = &inner.nodes[id.0].data {
            // Reverse so the stack pops children in document order.
            pending.extend(el.children.iter().rev().copied());
        }
    }
    out
}

fn collect_text(inner: &DocInner, node: NodeId, out: &mut String) {
    if !alive(inner, node) {
        return;
    }
    match &inner.nodes[node.0].data {
        NodeData::Text(text) => out.push_str(text),
        NodeData::Element(el) => {
            for &child in &el.children {
                collect_text(inner, child, out);
            }
        }
    }
}
