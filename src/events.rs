// Event bus - publish/subscribe primitive embedded in every entity
//
// Events are named by string, payloads are loose JSON values, and handlers
// are Arc'd closures compared by identity. Dispatch is fire-and-forget:
// `trigger` snapshots the handler list and spawns one task per handler, so
// it returns before any handler runs and a panicking handler can never
// take down its siblings or the caller.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Well-known event names used by the reference capabilities
pub mod event {
    /// External content finished loading (flips the loading overlay off)
    pub const LOAD: &str = "load";
    /// Embedding frame bounds changed
    pub const RESIZED: &str = "resized";
    /// One fixed animation step elapsed
    pub const FRAME: &str = "frame";
    /// Start (or restart) a stopped animation loop
    pub const ANIMATION_START: &str = "animation:start";
    /// Stop a running animation loop after the in-flight tick
    pub const ANIMATION_STOP: &str = "animation:stop";
}

/// Payload delivered to handlers; `Value::Null` for payload-free events
pub type Payload = Value;

/// A registered event handler
///
/// Identity (`Arc::ptr_eq`) is what `on`/`off` compare, so keep the same
/// `Arc` around if you intend to deregister later.
pub type Handler = Arc<dyn Fn(Payload) + Send + Sync>;

/// Publish/subscribe bus with insertion-ordered, identity-deduplicated
/// handler lists per event name.
///
/// Cloning is cheap and shares the underlying registry - every clone sees
/// the same subscriptions (an entity and its capabilities share one bus).
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<HashMap<String, Vec<Handler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event
    ///
    /// Registration order defines dispatch scheduling order. If the same
    /// handler reference is already registered for this event and
    /// `allow_duplicates` is false, the call is a no-op (no error).
    pub fn on(&self, event: &str, handler: Handler, allow_duplicates: bool) {
        let mut handlers = self.handlers.lock().unwrap();
        let list = handlers.entry(event.to_string()).or_default();
        if !allow_duplicates && list.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            return;
        }
        list.push(handler);
    }

    /// Remove a handler, or all handlers for the event when `handler` is None
    ///
    /// Removes the first matching reference only. No-op if absent. Handlers
    /// removed here do not affect a `trigger` already in flight: dispatch
    /// operates on a snapshot taken at trigger time.
    pub fn off(&self, event: &str, handler: Option<&Handler>) {
        let mut handlers = self.handlers.lock().unwrap();
        match handler {
            None => {
                handlers.remove(event);
            }
            Some(target) => {
                if let Some(list) = handlers.get_mut(event) {
                    if let Some(pos) = list.iter().position(|h| Arc::ptr_eq(h, target)) {
                        list.remove(pos);
                    }
                    if list.is_empty() {
                        handlers.remove(event);
                    }
                }
            }
        }
    }

    /// Schedule every currently-registered handler of `event` with `payload`
    ///
    /// Handlers are spawned in registration order but completion order is
    /// unspecified. Returns the number of handlers scheduled, before any of
    /// them has run - callers must not assume synchronous effects.
    pub fn trigger(&self, event: &str, payload: Payload) -> usize {
        // Snapshot under the lock, dispatch outside it. This freezes the
        // in-flight handler set against concurrent on/off calls.
        let snapshot: Vec<Handler> = {
            let handlers = self.handlers.lock().unwrap();
            handlers.get(event).cloned().unwrap_or_default()
        };

        let event_name = event.to_string();
        for handler in &snapshot {
            let handler = Arc::clone(handler);
            let payload = payload.clone();
            let event_name = event_name.clone();
            tokio::spawn(async move {
                // Contain panics per handler; one misbehaving handler must
                // not stop its siblings or reach the trigger caller.
                let call = std::panic::AssertUnwindSafe(|| handler(payload));
                if std::panic::catch_unwind(call).is_err() {
                    tracing::debug!(event = %event_name, "event handler panicked");
                }
            });
        }
        snapshot.len()
    }

    /// Number of handlers currently registered for an event
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .lock()
            .unwrap()
            .get(event)
            .map_or(0, Vec::len)
    }
}
