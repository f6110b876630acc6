// Modal capability - fixed dialog template with configurable action buttons
//
// The wrapper draws a centered template over the mount bounds plus one
// button node per action, and routes pointer input to the button under the
// pointer. Which modal is the "current" one composition-wide is the host's
// responsibility; two modals pointed at the same target follow the usual
// last-writer-wins contract.

use super::Capabilities;
use crate::error::RuntimeError;
use crate::host::{same_target, Bounds, InputEvent, MountRef, MountTarget, Node, NodeId, NodeKind, NodeState};
use crate::view::{Hooks, RenderContext, View};
use std::sync::{Arc, Mutex};

/// Geometry of the rendered template, relative to the mount bounds
const BUTTON_WIDTH: f64 = 96.0;
const BUTTON_HEIGHT: f64 = 28.0;
const BUTTON_GAP: f64 = 8.0;
const PADDING: f64 = 16.0;

/// One action button on the modal
#[derive(Clone)]
pub struct ModalButton {
    pub label: String,
    pub on_click: Arc<dyn Fn() + Send + Sync>,
    pub selected: bool,
    pub disabled: bool,
}

impl ModalButton {
    pub fn new(label: impl Into<String>, on_click: Arc<dyn Fn() + Send + Sync>) -> Self {
        Self {
            label: label.into(),
            on_click,
            selected: false,
            disabled: false,
        }
    }

    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Clone, Default)]
pub struct ModalConfig {
    pub title: String,
    pub body: Option<String>,
    pub buttons: Vec<ModalButton>,
}

/// Wrap `base` with a modal dialog
///
/// Idempotent: a chain already carrying the tag is returned unchanged.
pub fn attach(base: Box<dyn View>, config: ModalConfig) -> Box<dyn View> {
    if base.capabilities().contains(Capabilities::MODAL) {
        return base;
    }
    Box::new(Modal {
        inner: base,
        config,
        template: None,
        button_nodes: Vec::new(),
        hit_regions: Arc::new(Mutex::new(Vec::new())),
        subscribed_target: None,
    })
}

struct Modal {
    inner: Box<dyn View>,
    config: ModalConfig,
    template: Option<NodeId>,
    button_nodes: Vec<NodeId>,
    /// Button hit areas in target coordinates, rebuilt on every draw
    hit_regions: Arc<Mutex<Vec<(Bounds, usize)>>>,
    subscribed_target: Option<MountRef>,
}

impl Modal {
    /// Centered dialog covering two thirds of the mount bounds
    fn template_bounds(mount: Bounds) -> Bounds {
        let width = (mount.width * 2.0 / 3.0).max(BUTTON_WIDTH + 2.0 * PADDING);
        let height = (mount.height * 2.0 / 3.0).max(BUTTON_HEIGHT + 2.0 * PADDING);
        Bounds::new(
            mount.x + (mount.width - width) / 2.0,
            mount.y + (mount.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Buttons laid out right-to-left along the template's bottom edge
    fn button_bounds(template: Bounds, index: usize) -> Bounds {
        let offset = (index as f64 + 1.0) * (BUTTON_WIDTH + BUTTON_GAP);
        Bounds::new(
            template.x + template.width - offset,
            template.y + template.height - BUTTON_HEIGHT - PADDING,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        )
    }
}

impl View for Modal {
    fn setup(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::SETUP) {
            self.inner.setup(cx)?;
        }
        let already = self
            .subscribed_target
            .as_ref()
            .is_some_and(|t| same_target(t, &cx.target));
        if !already {
            // Our dialog nodes on the previous target are ours to remove
            if let Some(old) = self.subscribed_target.take() {
                if let Some(id) = self.template.take() {
                    old.remove_child(id);
                }
                for id in self.button_nodes.drain(..) {
                    old.remove_child(id);
                }
            }

            let regions = self.hit_regions.clone();
            let actions: Vec<(Arc<dyn Fn() + Send + Sync>, bool)> = self
                .config
                .buttons
                .iter()
                .map(|b| (b.on_click.clone(), b.disabled))
                .collect();
            cx.target.subscribe_input(Arc::new(move |input| {
                if let InputEvent::PointerDown { x, y } = input {
                    let hit = regions
                        .lock()
                        .unwrap()
                        .iter()
                        .find(|(bounds, _)| bounds.contains(*x, *y))
                        .map(|(_, index)| *index);
                    if let Some(index) = hit {
                        let (on_click, disabled) = &actions[index];
                        if !*disabled {
                            on_click();
                        }
                    }
                }
            }));
            self.subscribed_target = Some(cx.target.clone());
        }
        Ok(())
    }

    fn draw(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::DRAW) {
            self.inner.draw(cx)?;
        }

        let template_bounds = Self::template_bounds(cx.target.bounds());
        let mut text = self.config.title.clone();
        if let Some(body) = &self.config.body {
            text.push('\n');
            text.push_str(body);
        }
        let template = Node::new(NodeKind::Template)
            .with_bounds(template_bounds)
            .with_text(text);
        match self.template {
            Some(id) => cx.target.update_child(id, template),
            None => self.template = Some(cx.target.append_child(template)),
        }

        let mut regions = Vec::with_capacity(self.config.buttons.len());
        for (index, button) in self.config.buttons.iter().enumerate() {
            let bounds = Self::button_bounds(template_bounds, index);
            regions.push((bounds, index));
            let node = Node::new(NodeKind::Button)
                .with_bounds(bounds)
                .with_text(button.label.clone())
                .with_state(NodeState {
                    selected: button.selected,
                    disabled: button.disabled,
                });
            match self.button_nodes.get(index) {
                Some(id) => cx.target.update_child(*id, node),
                None => self.button_nodes.push(cx.target.append_child(node)),
            }
        }
        *self.hit_regions.lock().unwrap() = regions;
        Ok(())
    }

    fn provides(&self) -> Hooks {
        self.inner.provides() | Hooks::SETUP | Hooks::DRAW
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities() | Capabilities::MODAL
    }

    fn resource_requests(&mut self) -> Vec<crate::resource::ResourceDescriptor> {
        self.inner.resource_requests()
    }
}
