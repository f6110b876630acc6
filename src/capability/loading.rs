// Loading capability - spinner overlay until a `load` event fires

use super::Capabilities;
use crate::error::RuntimeError;
use crate::events::event;
use crate::host::{same_target, MountRef, MountTarget, Node, NodeId, NodeKind};
use crate::resource::ResourceDescriptor;
use crate::view::{Hooks, RenderContext, View};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Spinner frames, advanced one step per draw
const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Stylesheet the capability loads alongside the base view's resources
const SPINNER_CSS: &str = ".revue-spinner { opacity: 0.85; pointer-events: none; }";

#[derive(Clone, Default)]
pub struct LoadingConfig {
    /// Optional label shown next to the spinner glyph
    pub label: Option<String>,
}

/// Wrap `base` with a loading indicator
///
/// The wrapper overlays a spinner over the mount bounds until `event::LOAD`
/// fires on the entity's bus, then re-renders and drops the overlay.
/// Idempotent: a chain already carrying the tag is returned unchanged.
pub fn attach(base: Box<dyn View>, config: LoadingConfig) -> Box<dyn View> {
    if base.capabilities().contains(Capabilities::LOADING) {
        return base;
    }
    Box::new(Loading {
        inner: base,
        config,
        loaded: Arc::new(AtomicBool::new(false)),
        frame: AtomicUsize::new(0),
        subscribed: false,
        spinner: None,
        target: None,
    })
}

struct Loading {
    inner: Box<dyn View>,
    config: LoadingConfig,
    loaded: Arc<AtomicBool>,
    frame: AtomicUsize,
    subscribed: bool,
    spinner: Option<NodeId>,
    /// Target the spinner node lives on; cleaned up on a swap
    target: Option<MountRef>,
}

impl View for Loading {
    fn setup(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::SETUP) {
            self.inner.setup(cx)?;
        }
        // On a swap our overlay node on the old target is ours to remove;
        // on the same target the handle stays valid and is kept.
        if let Some(old) = self.target.replace(cx.target.clone()) {
            if !same_target(&old, &cx.target) {
                if let Some(id) = self.spinner.take() {
                    old.remove_child(id);
                }
            }
        }

        if !self.subscribed {
            let loaded = self.loaded.clone();
            let handle = cx.handle.clone();
            cx.bus.on(
                event::LOAD,
                Arc::new(move |_payload| {
                    loaded.store(true, Ordering::SeqCst);
                    handle.request_render();
                }),
                false,
            );
            self.subscribed = true;
        }
        Ok(())
    }

    fn draw(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::DRAW) {
            self.inner.draw(cx)?;
        }

        if self.loaded.load(Ordering::SeqCst) {
            if let Some(id) = self.spinner.take() {
                cx.target.remove_child(id);
            }
            return Ok(());
        }

        // Overlay position follows the mount bounds, recomputed every draw
        let glyph = SPINNER[self.frame.fetch_add(1, Ordering::SeqCst) % SPINNER.len()];
        let text = match &self.config.label {
            Some(label) => format!("{glyph} {label}"),
            None => glyph.to_string(),
        };
        let node = Node::new(NodeKind::Spinner)
            .with_bounds(cx.target.bounds())
            .with_text(text);
        match self.spinner {
            Some(id) => cx.target.update_child(id, node),
            None => self.spinner = Some(cx.target.append_child(node)),
        }
        Ok(())
    }

    fn provides(&self) -> Hooks {
        self.inner.provides() | Hooks::SETUP | Hooks::DRAW
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities() | Capabilities::LOADING
    }

    fn resource_requests(&mut self) -> Vec<ResourceDescriptor> {
        let mut requests = self.inner.resource_requests();
        requests.push(ResourceDescriptor::StylesheetSource {
            source: SPINNER_CSS.to_string(),
            name: Some("loading-spinner".to_string()),
        });
        requests
    }
}
