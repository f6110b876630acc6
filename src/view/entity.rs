// Render-scheduling state machine
//
// An entity owns a mount target slot, a dirty flag, a readiness gate and a
// single-slot debounced draw. The lifecycle:
//
//   Unmounted ─▶ AwaitingResources ─▶ ReadyIdle ─▶ SettingUp ─▶ DrawPending ─▶ Drawn
//                                        ▲                          │  ▲         │
//                                        └── load failure stays ◀───┘  └─render──┘
//                                            un-ready forever
//
// render() is the only entry point: it gates on readiness, re-runs setup
// when the dirty flag is set or the target identity changed, and coalesces
// rapid repeated calls into one draw per quiet interval (cancel-and-replace
// on the pending task). A pending draw is always cancelled before the
// fresh-setup decision is evaluated.

use crate::config::RuntimeOptions;
use crate::error::RuntimeError;
use crate::events::EventBus;
use crate::host::{same_target, MountRef};
use crate::resource::{Artifact, HttpLoader, ResourceDescriptor, ResourceLoader};
use crate::view::{ContainerMetrics, Hooks, View};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Resource-loading phase, published on the readiness watch channel
///
/// A failed load is terminal: the entity never becomes ready and render()
/// keeps no-op'ing. The failure is surfaced here for whoever awaited it.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadyState {
    Loading,
    Ready,
    Failed(RuntimeError),
}

/// Read-only bundle handed to every hook invocation
///
/// All fields are owned clones, so hooks never borrow entity internals and
/// can freely stash pieces (the bus, the handle) for later use.
#[derive(Clone)]
pub struct RenderContext {
    /// Effective mount target of this render pass
    pub target: MountRef,
    /// Container characteristics measured before the latest setup
    pub metrics: ContainerMetrics,
    /// Loaded artifacts, in descriptor declaration order
    pub resources: Arc<Vec<Artifact>>,
    /// The entity's embedded event bus
    pub bus: EventBus,
    /// Scheduling handle back into the owning entity
    pub handle: RenderHandle,
    /// Runtime knobs (debounce interval, frame rate)
    pub options: RuntimeOptions,
}

/// Weak scheduling handle into an entity
///
/// Hooks and event handlers use this to schedule work without re-entering
/// the entity lock; every method defers through the runtime. All methods
/// are no-ops once the entity is gone.
#[derive(Clone)]
pub struct RenderHandle {
    state: Weak<Mutex<EntityState>>,
}

impl RenderHandle {
    /// Schedule a full render pass (setup re-evaluation + debounced draw)
    pub fn request_render(&self) {
        let state = self.state.clone();
        tokio::spawn(async move {
            if let Some(state) = state.upgrade() {
                if let Err(err) = (Entity { state }).render(None) {
                    tracing::debug!(%err, "deferred render skipped");
                }
            }
        });
    }

    /// Schedule a debounced draw without re-evaluating setup
    pub fn request_draw(&self) {
        let state = self.state.clone();
        tokio::spawn(async move {
            if let Some(state) = state.upgrade() {
                (Entity { state }).request_draw();
            }
        });
    }

    /// True while the owning entity is still alive
    ///
    /// Long-lived tasks holding only this handle (the animation loop) use
    /// this to notice the entity is gone and wind down.
    pub fn is_live(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// Fire a draw immediately, bypassing the quiet interval
    ///
    /// Used by the animation loop, which does its own pacing - routing
    /// frames through the debounce would starve them forever.
    pub fn draw_now(&self) {
        let state = self.state.clone();
        tokio::spawn(async move {
            if let Some(state) = state.upgrade() {
                (Entity { state }).fire_draw();
            }
        });
    }
}

struct EntityState {
    view: Box<dyn View>,
    bus: EventBus,
    options: RuntimeOptions,
    /// Last container rendered into; identity decides fresh-setup need
    mount: Option<MountRef>,
    metrics: Option<ContainerMetrics>,
    /// Next render must re-run setup even on an unchanged target
    dirty: bool,
    /// All declared resources resolved
    ready: bool,
    /// A render arrived while un-ready; retried internally on load completion
    render_pending: bool,
    resources: Arc<Vec<Artifact>>,
    /// At most one pending debounced draw (cancel-and-replace)
    pending_draw: Option<JoinHandle<()>>,
    ready_tx: watch::Sender<ReadyState>,
}

/// A renderable entity: a view chain driven by the scheduling state machine
///
/// Cloning yields another handle to the same entity.
#[derive(Clone)]
pub struct Entity {
    state: Arc<Mutex<EntityState>>,
}

/// Builder for [`Entity`]
pub struct EntityBuilder {
    view: Box<dyn View>,
    mount: Option<MountRef>,
    resources: Vec<ResourceDescriptor>,
    loader: Option<Arc<dyn ResourceLoader>>,
    options: RuntimeOptions,
}

impl EntityBuilder {
    /// Initial mount target (can also be supplied to the first `render`)
    pub fn mount(mut self, target: MountRef) -> Self {
        self.mount = Some(target);
        self
    }

    /// Declare a resource the entity needs before it may draw
    pub fn resource(mut self, descriptor: ResourceDescriptor) -> Self {
        self.resources.push(descriptor);
        self
    }

    pub fn resources(mut self, descriptors: Vec<ResourceDescriptor>) -> Self {
        self.resources.extend(descriptors);
        self
    }

    /// Loader collaborator; defaults to [`HttpLoader`]
    pub fn loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    /// Construct the entity; spawns the resource-load task when needed
    pub fn build(self) -> Entity {
        let mut view = self.view;
        let mut descriptors = self.resources;
        // Capability wrappers extend the descriptor list (spinner styles
        // and the like); drained exactly once, here.
        descriptors.extend(view.resource_requests());

        let ready = descriptors.is_empty();
        let (ready_tx, _) = watch::channel(if ready {
            ReadyState::Ready
        } else {
            ReadyState::Loading
        });

        let entity = Entity {
            state: Arc::new(Mutex::new(EntityState {
                view,
                bus: EventBus::new(),
                options: self.options,
                mount: self.mount,
                metrics: None,
                dirty: false,
                ready,
                render_pending: false,
                resources: Arc::new(Vec::new()),
                pending_draw: None,
                ready_tx,
            })),
        };

        if !ready {
            let loader = self
                .loader
                .unwrap_or_else(|| Arc::new(HttpLoader::new()) as Arc<dyn ResourceLoader>);
            entity.spawn_load(loader, descriptors);
        }
        entity
    }
}

impl Entity {
    pub fn builder(view: Box<dyn View>) -> EntityBuilder {
        EntityBuilder {
            view,
            mount: None,
            resources: Vec::new(),
            loader: None,
            options: RuntimeOptions::default(),
        }
    }

    /// The entity's embedded event bus
    pub fn bus(&self) -> EventBus {
        self.state.lock().unwrap().bus.clone()
    }

    /// All declared resources resolved
    pub fn ready(&self) -> bool {
        self.state.lock().unwrap().ready
    }

    /// Watch channel carrying the resource-loading outcome
    pub fn ready_watch(&self) -> watch::Receiver<ReadyState> {
        self.state.lock().unwrap().ready_tx.subscribe()
    }

    /// Capability tags carried anywhere in the view chain
    pub fn capabilities(&self) -> crate::capability::Capabilities {
        self.state.lock().unwrap().view.capabilities()
    }

    /// Runtime capability test, independent of wrap order
    pub fn has_capability(&self, capability: crate::capability::Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    /// Force setup to re-run on the next render
    pub fn invalidate(&self) {
        self.state.lock().unwrap().dirty = true;
    }

    /// Scheduling handle usable from hooks and event handlers
    pub fn handle(&self) -> RenderHandle {
        RenderHandle {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Drive the state machine
    ///
    /// Fails fast when no mount target was ever supplied. While resources
    /// are in flight the call is recorded and silently gated; it is retried
    /// internally once loading completes. Otherwise: cancel any pending
    /// draw, re-run setup when dirty or the target identity changed, and
    /// schedule one debounced draw.
    pub fn render(&self, target: Option<MountRef>) -> Result<(), RuntimeError> {
        let mut state = self.state.lock().unwrap();

        let target = match target.or_else(|| state.mount.clone()) {
            Some(target) => target,
            None => return Err(RuntimeError::NoMountTarget),
        };

        // Cancel-and-replace comes first: a stale draw must never execute
        // against a target we are about to re-evaluate.
        if let Some(pending) = state.pending_draw.take() {
            pending.abort();
        }

        // A stored mount (builder-supplied, or recorded while gated) has
        // never been set up; absent metrics is the marker for that.
        let needs_fresh_setup = state.dirty
            || state.metrics.is_none()
            || !state
                .mount
                .as_ref()
                .is_some_and(|current| same_target(current, &target));
        state.mount = Some(target.clone());

        if !state.ready {
            state.render_pending = true;
            if state.options.trace_transitions {
                tracing::trace!("render gated: resources still in flight");
            }
            return Ok(());
        }

        let provides = state.view.provides();
        if !provides.contains(Hooks::SETUP) {
            return Err(RuntimeError::MissingHook("setup"));
        }
        if !provides.contains(Hooks::DRAW) {
            return Err(RuntimeError::MissingHook("draw"));
        }

        if needs_fresh_setup {
            // Container characteristics are recomputed synchronously before
            // every setup.
            let metrics = ContainerMetrics::measure(&target);
            state.metrics = Some(metrics);
            if state.options.trace_transitions {
                tracing::trace!(?metrics, "running setup");
            }
            let mut cx = self.context(&state, target.clone(), metrics);
            state.view.setup(&mut cx)?;
            state.dirty = false;
        }

        self.schedule_draw_locked(&mut state);
        Ok(())
    }

    /// Schedule a debounced draw without touching setup state
    pub fn request_draw(&self) {
        let mut state = self.state.lock().unwrap();
        if !state.ready || state.mount.is_none() || state.metrics.is_none() {
            return;
        }
        self.schedule_draw_locked(&mut state);
    }

    fn context(
        &self,
        state: &EntityState,
        target: MountRef,
        metrics: ContainerMetrics,
    ) -> RenderContext {
        RenderContext {
            target,
            metrics,
            resources: state.resources.clone(),
            bus: state.bus.clone(),
            handle: self.handle(),
            options: state.options.clone(),
        }
    }

    fn schedule_draw_locked(&self, state: &mut EntityState) {
        if let Some(pending) = state.pending_draw.take() {
            pending.abort();
        }
        let quiet = state.options.debounce;
        let weak = Arc::downgrade(&self.state);
        state.pending_draw = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if let Some(state) = weak.upgrade() {
                (Entity { state }).fire_draw();
            }
        }));
    }

    /// Run the draw hook with current state; called by the debounce task
    /// and by the animation loop's immediate path
    fn fire_draw(&self) {
        let mut state = self.state.lock().unwrap();
        // An immediate draw supersedes any debounced draw still pending;
        // dropping the handle would leave the task alive. When the debounce
        // task itself lands here the slot holds its own handle, and a task
        // aborting itself past its last await point is a no-op.
        if let Some(pending) = state.pending_draw.take() {
            pending.abort();
        }
        let (Some(target), Some(metrics)) = (state.mount.clone(), state.metrics) else {
            return;
        };
        if !state.ready {
            return;
        }
        let mut cx = self.context(&state, target, metrics);
        if let Err(err) = state.view.draw(&mut cx) {
            tracing::warn!(%err, "draw hook failed");
        }
    }

    fn spawn_load(&self, loader: Arc<dyn ResourceLoader>, descriptors: Vec<ResourceDescriptor>) {
        let weak = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            let result = loader.load_batch(descriptors).await;
            let Some(state) = weak.upgrade() else { return };
            match result {
                Ok(artifacts) => {
                    let should_render;
                    {
                        let mut state = state.lock().unwrap();
                        state.resources = Arc::new(artifacts);
                        state.ready = true;
                        should_render = state.mount.is_some() || state.render_pending;
                        state.render_pending = false;
                        // send_replace so late subscribers still see the
                        // outcome; plain send drops the value receiver-less.
                        let _ = state.ready_tx.send_replace(ReadyState::Ready);
                        tracing::debug!("resources resolved; entity ready");
                    }
                    if should_render {
                        let entity = Entity { state };
                        if let Err(err) = entity.render(None) {
                            // A configuration error discovered only now has
                            // no synchronous caller to raise to; the watch
                            // channel is who is listening.
                            tracing::warn!(%err, "post-load render failed");
                            let _ = entity
                                .state
                                .lock()
                                .unwrap()
                                .ready_tx
                                .send_replace(ReadyState::Failed(err));
                        }
                    }
                }
                Err(err) => {
                    // Deliberate soft fail: surface to whoever awaited the
                    // watch channel, stay un-ready so render keeps gating.
                    tracing::warn!(%err, "resource load failed; entity stays un-ready");
                    let state = state.lock().unwrap();
                    let _ = state.ready_tx.send_replace(ReadyState::Failed(err));
                }
            }
        });
    }
}
