// View hook chain and the render-scheduling entity
//
// A `View` is the composable half of an entity: the setup/draw hooks plus
// the bookkeeping that lets capability wrappers layer behavior on top of a
// base view (which hooks the chain genuinely provides, which capability
// tags it carries, which resources it wants loaded before first draw).
// The `Entity` in `entity` drives the chain through the render-scheduling
// state machine.

mod entity;
mod metrics;
#[cfg(test)]
mod tests;

pub use entity::{Entity, EntityBuilder, ReadyState, RenderContext, RenderHandle};
pub use metrics::{measure_scrollbar_width, ContainerMetrics};

use crate::capability::Capabilities;
use crate::error::RuntimeError;
use crate::resource::ResourceDescriptor;
use bitflags::bitflags;

bitflags! {
    /// Which lifecycle hooks a view chain genuinely implements
    ///
    /// Wrappers OR their own hooks onto the inner chain's set; the entity
    /// refuses to run a chain that is missing either hook.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Hooks: u8 {
        const SETUP = 1 << 0;
        const DRAW  = 1 << 1;
    }
}

/// A renderable view: the unit capability mixins wrap
///
/// `setup` runs synchronously, at most once per (entity, mount target) pair
/// between dirty-resets. `draw` runs after the debounce quiet interval and
/// may run many times. Wrappers must call the inner implementation
/// explicitly (ordered pipeline, never a merge), guarded by
/// `inner.provides()` when the inner chain may be hook-less.
pub trait View: Send {
    /// One-time preparation for a mount target
    fn setup(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError>;

    /// Produce output into the mount target
    fn draw(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError>;

    /// Hooks this chain implements (wrappers OR theirs onto the inner set)
    fn provides(&self) -> Hooks;

    /// Capability tags carried anywhere in this chain
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Resource descriptors this chain wants loaded before `ready`
    ///
    /// Drained once at entity construction; wrappers append their own to
    /// the inner chain's list. Cross-chain ordering is not guaranteed, but
    /// every descriptor resolves before the entity becomes ready.
    fn resource_requests(&mut self) -> Vec<ResourceDescriptor> {
        Vec::new()
    }
}

type HookFn = Box<dyn FnMut(&mut RenderContext) -> Result<(), RuntimeError> + Send>;

/// Closure-based leaf view
///
/// The simplest way to author a concrete view: supply `setup` and `draw`
/// closures. A blueprint reports only the hooks actually supplied, so an
/// incomplete one is caught by the entity with a configuration error
/// naming the missing hook.
#[derive(Default)]
pub struct Blueprint {
    setup: Option<HookFn>,
    draw: Option<HookFn>,
    resources: Vec<ResourceDescriptor>,
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_setup(
        mut self,
        hook: impl FnMut(&mut RenderContext) -> Result<(), RuntimeError> + Send + 'static,
    ) -> Self {
        self.setup = Some(Box::new(hook));
        self
    }

    pub fn on_draw(
        mut self,
        hook: impl FnMut(&mut RenderContext) -> Result<(), RuntimeError> + Send + 'static,
    ) -> Self {
        self.draw = Some(Box::new(hook));
        self
    }

    /// Declare a resource this view needs before it may draw
    pub fn with_resource(mut self, descriptor: ResourceDescriptor) -> Self {
        self.resources.push(descriptor);
        self
    }

    pub fn boxed(self) -> Box<dyn View> {
        Box::new(self)
    }
}

impl View for Blueprint {
    fn setup(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        match &mut self.setup {
            Some(hook) => hook(cx),
            None => Err(RuntimeError::MissingHook("setup")),
        }
    }

    fn draw(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        match &mut self.draw {
            Some(hook) => hook(cx),
            None => Err(RuntimeError::MissingHook("draw")),
        }
    }

    fn provides(&self) -> Hooks {
        let mut hooks = Hooks::empty();
        if self.setup.is_some() {
            hooks |= Hooks::SETUP;
        }
        if self.draw.is_some() {
            hooks |= Hooks::DRAW;
        }
        hooks
    }

    fn resource_requests(&mut self) -> Vec<ResourceDescriptor> {
        std::mem::take(&mut self.resources)
    }
}
