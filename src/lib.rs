// revue - minimal reactive-view runtime
//
// A base entity that owns state, emits events and schedules its own
// re-rendering, plus a composition protocol for layering independent
// cross-cutting behaviors (loading indicator, empty-state overlay,
// animation loop, fixed-size embedding, modal dialog) onto that entity
// without multiple inheritance.
//
// The interesting parts are the render-scheduling state machine (dirty
// tracking, readiness gating, setup/draw separation, draw debouncing) and
// the capability wrappers; everything else is declarative glue. Concrete
// pixel/DOM output stays behind the `MountTarget` trait, and resource
// loading stays behind the `ResourceLoader` trait - both are collaborators
// the runtime never looks inside.

pub mod capability;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod logging;
pub mod resource;
pub mod view;

pub use capability::Capabilities;
pub use config::RuntimeOptions;
pub use error::RuntimeError;
pub use events::{event, EventBus, Handler, Payload};
pub use host::{
    same_target, Bounds, InputEvent, InputHandler, MemoryTarget, MountRef, MountTarget, Node,
    NodeId, NodeKind, NodeState,
};
pub use resource::{Artifact, HttpLoader, MemoryLoader, ResourceDescriptor, ResourceLoader};
pub use view::{
    Blueprint, ContainerMetrics, Entity, EntityBuilder, Hooks, ReadyState, RenderContext,
    RenderHandle, View,
};
