// Fixed-size embedding capability
//
// Bounds come from a wrapping frame container rather than the content
// element itself - the content element's box is driven by these very
// bounds, so measuring it would feed back into itself. A `resized` event
// fires only when the frame bounds actually change.

use super::Capabilities;
use crate::error::RuntimeError;
use crate::events::event;
use crate::host::{Bounds, MountRef, MountTarget};
use crate::view::{Hooks, RenderContext, View};
use serde_json::Value;

#[derive(Clone)]
pub struct FixedSizeConfig {
    /// The wrapping container whose bounds drive the embedding
    pub frame: MountRef,
}

/// Wrap `base` with fixed-size embedding
///
/// Idempotent: a chain already carrying the tag is returned unchanged.
pub fn attach(base: Box<dyn View>, config: FixedSizeConfig) -> Box<dyn View> {
    if base.capabilities().contains(Capabilities::FIXED_SIZE) {
        return base;
    }
    Box::new(FixedSize {
        inner: base,
        config,
        last_bounds: None,
    })
}

struct FixedSize {
    inner: Box<dyn View>,
    config: FixedSizeConfig,
    last_bounds: Option<Bounds>,
}

impl View for FixedSize {
    fn setup(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::SETUP) {
            self.inner.setup(cx)?;
        }
        Ok(())
    }

    fn draw(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::DRAW) {
            self.inner.draw(cx)?;
        }

        let bounds = self.config.frame.bounds();
        if self.last_bounds != Some(bounds) {
            self.last_bounds = Some(bounds);
            let payload = serde_json::to_value(bounds).unwrap_or(Value::Null);
            cx.bus.trigger(event::RESIZED, payload);
        }
        Ok(())
    }

    fn provides(&self) -> Hooks {
        self.inner.provides() | Hooks::SETUP | Hooks::DRAW
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities() | Capabilities::FIXED_SIZE
    }

    fn resource_requests(&mut self) -> Vec<crate::resource::ResourceDescriptor> {
        self.inner.resource_requests()
    }
}
