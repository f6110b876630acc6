// Mount-target abstraction
//
// A mount target is the container an entity draws into. The runtime never
// assumes more than this trait: bounding geometry, computed font size,
// child node management (overlays, probes) and native input subscription.
// Target identity is `Arc` pointer identity - two `MountRef`s naming the
// same allocation are the same target.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Bounding geometry of a target or node, in host units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// What a child node is for; capabilities find their own nodes by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Regular content placed by a concrete view
    Content,
    /// Loading-indicator overlay
    Spinner,
    /// Empty-state message overlay
    MessageLayer,
    /// Modal dialog template
    Template,
    /// Modal action button
    Button,
    /// Transient probe used for scrollbar measurement
    Probe,
}

/// Per-node interaction state (modal buttons)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeState {
    pub selected: bool,
    pub disabled: bool,
}

/// A child node appended to a mount target
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub bounds: Option<Bounds>,
    pub text: Option<String>,
    pub state: NodeState,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            bounds: None,
            text: None,
            state: NodeState::default(),
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_state(mut self, state: NodeState) -> Self {
        self.state = state;
        self
    }
}

/// Handle to an appended child node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Native input events a target can deliver
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    Key { code: String },
}

/// Subscriber for native input events
pub type InputHandler = Arc<dyn Fn(&InputEvent) + Send + Sync>;

/// The opaque renderable container contract
pub trait MountTarget: Send + Sync {
    /// Bounding geometry of the container itself
    fn bounds(&self) -> Bounds;

    /// Computed font em-size of the container
    fn font_em(&self) -> f64;

    /// Append a child node, returning its handle
    fn append_child(&self, node: Node) -> NodeId;

    /// Replace the node behind an existing handle; no-op if gone
    fn update_child(&self, id: NodeId, node: Node);

    /// Remove one child; no-op if gone
    fn remove_child(&self, id: NodeId);

    /// Remove every child (last-writer-wins target takeover)
    fn clear_children(&self);

    /// Snapshot of current children, in append order
    fn children(&self) -> Vec<(NodeId, Node)>;

    /// Outer width of a child (includes the native scrollbar, if any)
    fn node_outer_width(&self, id: NodeId) -> f64;

    /// Content width of a child (excludes the native scrollbar)
    fn node_content_width(&self, id: NodeId) -> f64;

    /// Subscribe to native input events on this target
    fn subscribe_input(&self, handler: InputHandler);
}

/// Shared reference to a mount target; identity is pointer identity
pub type MountRef = Arc<dyn MountTarget>;

/// True when both refs name the same target allocation
pub fn same_target(a: &MountRef, b: &MountRef) -> bool {
    Arc::ptr_eq(a, b)
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory reference host
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory mount target used by tests and headless embedders
///
/// Probe children report a content width narrowed by the configured native
/// scrollbar width, which is what makes the empirical scrollbar measurement
/// observable without a real host.
pub struct MemoryTarget {
    bounds: Mutex<Bounds>,
    font_em: f64,
    scrollbar_width: f64,
    next_id: AtomicU64,
    children: Mutex<Vec<(NodeId, Node)>>,
    input_handlers: Mutex<Vec<InputHandler>>,
}

impl MemoryTarget {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds: Mutex::new(bounds),
            font_em: 16.0,
            scrollbar_width: 12.0,
            next_id: AtomicU64::new(1),
            children: Mutex::new(Vec::new()),
            input_handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_font_em(mut self, em: f64) -> Self {
        self.font_em = em;
        self
    }

    pub fn with_scrollbar_width(mut self, width: f64) -> Self {
        self.scrollbar_width = width;
        self
    }

    /// Wrap into a shareable mount reference
    pub fn into_ref(self) -> MountRef {
        Arc::new(self)
    }

    /// Simulate the host resizing this container
    pub fn set_bounds(&self, bounds: Bounds) {
        *self.bounds.lock().unwrap() = bounds;
    }

    /// Deliver a native input event to all subscribers
    pub fn dispatch_input(&self, event: InputEvent) {
        let handlers: Vec<InputHandler> = self.input_handlers.lock().unwrap().clone();
        for handler in handlers {
            handler(&event);
        }
    }

    /// Children of one kind, for assertions
    pub fn children_of_kind(&self, kind: NodeKind) -> Vec<Node> {
        self.children
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, n)| n.kind == kind)
            .map(|(_, n)| n.clone())
            .collect()
    }
}

impl MountTarget for MemoryTarget {
    fn bounds(&self) -> Bounds {
        *self.bounds.lock().unwrap()
    }

    fn font_em(&self) -> f64 {
        self.font_em
    }

    fn append_child(&self, node: Node) -> NodeId {
        let id = NodeId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.children.lock().unwrap().push((id, node));
        id
    }

    fn update_child(&self, id: NodeId, node: Node) {
        let mut children = self.children.lock().unwrap();
        if let Some(slot) = children.iter_mut().find(|(cid, _)| *cid == id) {
            slot.1 = node;
        }
    }

    fn remove_child(&self, id: NodeId) {
        self.children.lock().unwrap().retain(|(cid, _)| *cid != id);
    }

    fn clear_children(&self) {
        self.children.lock().unwrap().clear();
    }

    fn children(&self) -> Vec<(NodeId, Node)> {
        self.children.lock().unwrap().clone()
    }

    fn node_outer_width(&self, id: NodeId) -> f64 {
        let children = self.children.lock().unwrap();
        children
            .iter()
            .find(|(cid, _)| *cid == id)
            .and_then(|(_, n)| n.bounds)
            .map_or(0.0, |b| b.width)
    }

    fn node_content_width(&self, id: NodeId) -> f64 {
        // A probe forced to overflow loses the native scrollbar's width
        // from its content box.
        let outer = self.node_outer_width(id);
        let children = self.children.lock().unwrap();
        let is_probe = children
            .iter()
            .find(|(cid, _)| *cid == id)
            .is_some_and(|(_, n)| n.kind == NodeKind::Probe);
        if is_probe {
            (outer - self.scrollbar_width).max(0.0)
        } else {
            outer
        }
    }

    fn subscribe_input(&self, handler: InputHandler) {
        self.input_handlers.lock().unwrap().push(handler);
    }
}
