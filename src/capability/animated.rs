// Animated capability - fixed-timestep animation loop
//
// After the first successful draw the wrapper starts a self-rescheduling
// loop at the configured frame rate. Wall-clock delta accumulates and is
// drained in whole fixed steps (remainder carried), so frame callbacks
// stay stable under variable tick timing. The loop is stopped and
// restarted through bus events; the stop flag is checked at the top of
// each scheduled tick, so an in-flight tick completes but nothing further
// is scheduled.

use super::Capabilities;
use crate::error::RuntimeError;
use crate::events::{event, EventBus};
use crate::view::{Hooks, RenderContext, RenderHandle, View};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Per-step frame callback (the frame number is monotonically increasing)
pub type FrameFn = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Clone, Default)]
pub struct AnimatedConfig {
    /// Target frame rate; falls back to `RuntimeOptions::frame_rate`
    pub frame_rate: Option<u32>,
    /// Invoked once per drained fixed step
    pub on_frame: Option<FrameFn>,
}

/// Wrap `base` with an animation loop
///
/// Idempotent: a chain already carrying the tag is returned unchanged.
pub fn attach(base: Box<dyn View>, config: AnimatedConfig) -> Box<dyn View> {
    if base.capabilities().contains(Capabilities::ANIMATED) {
        return base;
    }
    Box::new(Animated {
        inner: base,
        config,
        running: Arc::new(AtomicBool::new(false)),
        frame: Arc::new(AtomicU64::new(0)),
        started: false,
        subscribed: false,
    })
}

/// Accumulate wall-clock delta, drain whole steps, carry the remainder
pub(crate) struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
}

impl FixedTimestep {
    pub(crate) fn new(frame_rate: u32) -> Self {
        Self {
            step: Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1))),
            accumulator: Duration::ZERO,
        }
    }

    pub(crate) fn step(&self) -> Duration {
        self.step
    }

    /// Number of whole steps covered by `delta` plus any carried remainder
    pub(crate) fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;
        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }
}

struct Animated {
    inner: Box<dyn View>,
    config: AnimatedConfig,
    running: Arc<AtomicBool>,
    frame: Arc<AtomicU64>,
    started: bool,
    subscribed: bool,
}

impl Animated {
    fn start_loop(&self, cx: &RenderContext) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        spawn_loop(
            self.running.clone(),
            self.frame.clone(),
            cx.bus.clone(),
            cx.handle.clone(),
            self.config.frame_rate.unwrap_or(cx.options.frame_rate),
            self.config.on_frame.clone(),
        );
    }
}

impl View for Animated {
    fn setup(&mut self, cx: &mut RenderContext) -> Result<(), RuntimeError> {
        if self.inner.provides().contains(Hooks::SETUP) {
            self.inner.setup(cx)?;
        }

        if !self.subscribed {
            // Stop: flip the flag, the loop exits on its next tick.
            let running = self.running.clone();
            cx.bus.on(
                event::ANIMATION_STOP,
                Arc::new(move |_| {
                    running.store(false, Ordering::SeqCst);
                }),
                false,
            );

            // Restart: spawn a fresh loop unless one is already running.
            let running = self.running.clone();
            let frame = self.frame.clone();
            let bus = cx.bus.clone();
            let handle = cx.handle.clone();
            let rate = self.config.frame_rate.unwrap_or(cx.options.frame_rate);
            let on_frame = self.config.on_frame.clone();
            cx.bus.on(
                event::ANIMATION_START,
                Arc::new(move |_| {
                    if !running.swap(true, Ordering::SeqCst) {
                        spawn_loop(
                            running.clone(),
                            frame.clone(),
                            bus.clone(),
                            handle.clone(),
                            rate,
                            on_frame.clone(),
                        );
                    }
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
        // The loop starts after the first draw that succeeded end to end.
        if !self.started {
            self.started = true;
            self.start_loop(cx);
        }
        Ok(())
    }

    fn provides(&self) -> Hooks {
        self.inner.provides() | Hooks::SETUP | Hooks::DRAW
    }

    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities() | Capabilities::ANIMATED
    }

    fn resource_requests(&mut self) -> Vec<crate::resource::ResourceDescriptor> {
        self.inner.resource_requests()
    }
}

fn spawn_loop(
    running: Arc<AtomicBool>,
    frame: Arc<AtomicU64>,
    bus: EventBus,
    handle: RenderHandle,
    frame_rate: u32,
    on_frame: Option<FrameFn>,
) {
    tokio::spawn(async move {
        let mut timestep = FixedTimestep::new(frame_rate);
        let tick = timestep.step();
        let mut last = tokio::time::Instant::now();
        loop {
            tokio::time::sleep(tick).await;
            // Stop flag and entity liveness checked at the top of each
            // scheduled tick; the loop must not outlive its entity.
            if !running.load(Ordering::SeqCst) || !handle.is_live() {
                break;
            }
            let now = tokio::time::Instant::now();
            let steps = timestep.advance(now - last);
            last = now;
            for _ in 0..steps {
                let n = frame.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(callback) = &on_frame {
                    callback(n);
                }
                bus.trigger(event::FRAME, json!(n));
            }
            if steps > 0 {
                // The loop does its own pacing; frames bypass the debounce.
                handle.draw_now();
            }
        }
        tracing::debug!("animation loop stopped");
    });
}
