// Empty-state capability - message overlay while the view has nothing to show

use super::Capabilities;
use crate::error::RuntimeError;
use crate::host::{same_target, MountRef, MountTarget, Node, NodeId, NodeKind};
use crate::view::{Hooks, RenderContext, View};
use std::sync::Arc;

/// Hook deciding whether (and what) to overlay; `None` or an empty string
/// hides the layer
pub type MessageFn = Arc<dyn Fn(&RenderContext) -> Option<String> + Send + Sync>;

#[derive(Clone)]
pub struct EmptyStateConfig {
    pub message: MessageFn,
}

impl EmptyStateConfig {
    pub fn new(message: MessageFn) -> Self {
        Self { message }
    }

    /// Always show the given message; handy in tests and placeholders
    pub fn always_empty(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: Arc::new(move |_| Some(message.clone())),
        }
    }
}

/// Wrap `base` with an empty-state message layer
///
/// Idempotent: a chain already carrying the tag is returned unchanged.
pub fn attach(base: Box<dyn View>, config: EmptyStateConfig) -> Box<dyn View> {
    if base.capabilities().contains(Capabilities::EMPTY_STATE) {
        return base;
    }
    Box::new(EmptyState {
        inner: base,
        config,
        layer: None,
        target: None,
    })
}

struct EmptyState {
    inner: Box<dyn View>,
    config: EmptyStateConfig,
    layer: Option<NodeId>,
    /// Target the message layer lives on; cleaned up on a swap
    target: Option<MountRef>,
}

impl View for EmptyState {
    fn setup(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::SETUP) {
            self.inner.setup(cx)?;
        }
        if let Some(old) = self.target.replace(cx.target.clone()) {
            if !same_target(&old, &cx.target) {
                if let Some(id) = self.layer.take() {
                    old.remove_child(id);
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::DRAW) {
            self.inner.draw(cx)?;
        }

        let message = (self.config.message)(cx).filter(|m| !m.is_empty());
        match message {
            Some(message) => {
                let node = Node::new(NodeKind::MessageLayer)
                    .with_bounds(cx.target.bounds())
                    .with_text(message);
                match self.layer {
                    Some(id) => cx.target.update_child(id, node),
                    None => self.layer = Some(cx.target.append_child(node)),
                }
            }
            None => {
                if let Some(id) = self.layer.take() {
                    cx.target.remove_child(id);
                }
            }
        }
        Ok(())
    }

    fn provides(&self) -> Hooks {
        self.inner.provides() | Hooks::SETUP | Hooks::DRAW
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities() | Capabilities::EMPTY_STATE
    }

    fn resource_requests(&mut self) -> Vec<crate::resource::ResourceDescriptor> {
        self.inner.resource_requests()
    }
}
