//! Retained node arena with parent links and delegated event listeners.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::element::{Content, Element};
use crate::event::{Event, EventKind};

/// Identifier of a live node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Identifier returned by [`Document::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.attr(&format!("data-{key}"))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

struct Listener {
    node: NodeId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct DocumentInner {
    nodes: HashMap<NodeId, Node>,
    /// Keyed by id, so iteration follows registration order.
    listeners: BTreeMap<ListenerId, Listener>,
    next_node: u64,
    next_listener: u64,
}

impl DocumentInner {
    fn insert(&mut self, element: &Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;

        let text = match &element.content {
            Content::Text(text) => Some(text.clone()),
            _ => None,
        };
        self.nodes.insert(
            id,
            Node {
                tag: element.tag.clone(),
                classes: element.classes.clone(),
                attrs: element.attrs.clone(),
                text,
                parent,
                children: Vec::new(),
            },
        );

        if let Content::Children(children) = &element.content {
            let ids: Vec<NodeId> = children.iter().map(|c| self.insert(c, Some(id))).collect();
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children = ids;
            }
        }
        id
    }

    fn unlink(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes.get_mut(&id).and_then(|n| n.parent.take()) else {
            return self.nodes.contains_key(&id);
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != id);
        }
        true
    }

    fn free(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        self.listeners.retain(|_, l| l.node != id);
        for child in node.children {
            self.free(child);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn snapshot(&self, id: NodeId) -> Option<Element> {
        let node = self.nodes.get(&id)?;
        let content = if let Some(text) = &node.text {
            Content::Text(text.clone())
        } else if node.children.is_empty() {
            Content::None
        } else {
            Content::Children(node.children.iter().filter_map(|c| self.snapshot(*c)).collect())
        };
        Some(Element {
            tag: node.tag.clone(),
            classes: node.classes.clone(),
            attrs: node.attrs.clone(),
            content,
        })
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    fn walk<F: Fn(&Node) -> bool>(&self, id: NodeId, pred: &F, out: &mut Vec<NodeId>, first_only: bool) {
        if first_only && !out.is_empty() {
            return;
        }
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if pred(node) {
            out.push(id);
        }
        for child in &node.children {
            self.walk(*child, pred, out, first_only);
        }
    }
}

/// A shared, mutable tree of nodes.
///
/// `Document` is cheap to clone (uses `Arc` internally); every clone sees the
/// same nodes and listeners. No lock is held while a listener runs, so
/// handlers are free to mutate the document they were dispatched from.
#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<RwLock<DocumentInner>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.read();
        f.debug_struct("Document")
            .field("nodes", &guard.nodes.len())
            .field("listeners", &guard.listeners.len())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, DocumentInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DocumentInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Instantiate a detached subtree from a description and return its root.
    pub fn create_element(&self, element: &Element) -> NodeId {
        self.write().insert(element, None)
    }

    /// Create an empty detached node, typically used as a mount point.
    pub fn create_container(&self, tag: &str) -> NodeId {
        self.create_element(&Element::new(tag))
    }

    // -------------------------------------------------------------------------
    // Tree mutation
    // -------------------------------------------------------------------------

    /// Append `child` to `parent`, detaching it from any previous parent first.
    ///
    /// Returns `false` when either node is missing or when the move would
    /// make a node its own ancestor.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        let mut guard = self.write();
        if !guard.nodes.contains_key(&parent) || !guard.nodes.contains_key(&child) {
            return false;
        }
        if guard.is_ancestor_or_self(child, parent) {
            return false;
        }
        guard.unlink(child);
        if let Some(node) = guard.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(p) = guard.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        true
    }

    /// Detach a node from its parent, keeping the subtree alive.
    pub fn detach(&self, node: NodeId) -> bool {
        self.write().unlink(node)
    }

    /// Detach and free a subtree, dropping listeners registered inside it.
    pub fn remove(&self, node: NodeId) -> bool {
        let mut guard = self.write();
        if !guard.unlink(node) {
            return false;
        }
        guard.free(node);
        true
    }

    /// Free every child of `parent` and instantiate `elements` in their place.
    pub fn replace_children(&self, parent: NodeId, elements: &[Element]) -> Option<Vec<NodeId>> {
        let mut guard = self.write();
        let old = guard.nodes.get_mut(&parent).map(|n| std::mem::take(&mut n.children))?;
        for child in old {
            guard.free(child);
        }
        let ids: Vec<NodeId> = elements.iter().map(|e| guard.insert(e, Some(parent))).collect();
        if let Some(node) = guard.nodes.get_mut(&parent) {
            node.children = ids.clone();
        }
        Some(ids)
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: impl Into<String>) -> bool {
        let mut guard = self.write();
        let Some(node) = guard.nodes.get_mut(&node) else {
            return false;
        };
        let value = value.into();
        match node.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => node.attrs.push((name.to_string(), value)),
        }
        true
    }

    pub fn remove_attr(&self, node: NodeId, name: &str) -> bool {
        let mut guard = self.write();
        let Some(node) = guard.nodes.get_mut(&node) else {
            return false;
        };
        let before = node.attrs.len();
        node.attrs.retain(|(n, _)| n != name);
        node.attrs.len() != before
    }

    /// Add or remove a class.
    pub fn set_class(&self, node: NodeId, class: &str, on: bool) -> bool {
        let mut guard = self.write();
        let Some(node) = guard.nodes.get_mut(&node) else {
            return false;
        };
        let present = node.has_class(class);
        if on && !present {
            node.classes.push(class.to_string());
        } else if !on && present {
            node.classes.retain(|c| c != class);
        }
        true
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn contains(&self, node: NodeId) -> bool {
        self.read().nodes.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against a node, if it exists.
    pub fn with_node<R>(&self, node: NodeId, f: impl FnOnce(&Node) -> R) -> Option<R> {
        self.read().nodes.get(&node).map(f)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.read().nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.read()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.with_node(node, |n| n.attr(name).map(str::to_string)).flatten()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.with_node(node, |n| n.has_class(class)).unwrap_or(false)
    }

    /// Concatenated text of the node and all of its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.read().collect_text(node, &mut out);
        out
    }

    /// The node itself followed by each ancestor up to the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let guard = self.read();
        let mut path = Vec::new();
        let mut current = guard.nodes.contains_key(&node).then_some(node);
        while let Some(id) = current {
            path.push(id);
            current = guard.nodes.get(&id).and_then(|n| n.parent);
        }
        path
    }

    /// Nearest node, starting at `node` itself, that matches `pred`.
    pub fn closest(&self, node: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let guard = self.read();
        let mut current = Some(node);
        while let Some(id) = current {
            let n = guard.nodes.get(&id)?;
            if pred(n) {
                return Some(id);
            }
            current = n.parent;
        }
        None
    }

    /// First node in the subtree (pre-order, root included) matching `pred`.
    pub fn query(&self, root: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let mut out = Vec::with_capacity(1);
        self.read().walk(root, &pred, &mut out, true);
        out.into_iter().next()
    }

    /// Every node in the subtree (pre-order, root included) matching `pred`.
    pub fn query_all(&self, root: NodeId, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.read().walk(root, &pred, &mut out, false);
        out
    }

    /// Rebuild the description of a live subtree.
    pub fn snapshot(&self, node: NodeId) -> Option<Element> {
        self.read().snapshot(node)
    }

    pub fn to_html(&self, node: NodeId) -> Option<String> {
        self.snapshot(node).map(|e| e.to_html())
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Register a handler for events of `kind` targeted at `node` or any of
    /// its descendants. Returns `None` if the node does not exist.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        kind: EventKind,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> Option<ListenerId> {
        let mut guard = self.write();
        if !guard.nodes.contains_key(&node) {
            return None;
        }
        let id = ListenerId(guard.next_listener);
        guard.next_listener += 1;
        guard.listeners.insert(
            id,
            Listener {
                node,
                kind,
                handler: Arc::new(handler),
            },
        );
        Some(id)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.write().listeners.remove(&id).is_some()
    }

    /// Number of listeners registered directly on `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.read().listeners.values().filter(|l| l.node == node).count()
    }

    /// Deliver an event to every matching listener on the path from the
    /// target up to the root. Returns how many handlers ran.
    pub fn dispatch(&self, event: &Event) -> usize {
        let path = self.ancestors(event.target());
        let handlers: Vec<Handler> = {
            let guard = self.read();
            path.iter()
                .flat_map(|node| {
                    guard
                        .listeners
                        .values()
                        .filter(move |l| l.node == *node && l.kind == event.kind())
                        .map(|l| Arc::clone(&l.handler))
                })
                .collect()
        };

        log::trace!("dispatch {:?} to {} handler(s)", event, handlers.len());
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}
