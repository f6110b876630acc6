//! Render-scheduling scenarios
//!
//! Cross-module tests for the state machine laws: the readiness gate, the
//! debounce quiet interval, cancellation, target swapping and the
//! capability wrappers, all driven on tokio's paused clock so timing is
//! deterministic.

use crate::capability::{self, AnimatedConfig, EmptyStateConfig, FixedSizeConfig, LoadingConfig,
    ModalButton, ModalConfig};
use crate::config::RuntimeOptions;
use crate::error::RuntimeError;
use crate::events::event;
use crate::host::{Bounds, InputEvent, MemoryTarget, MountRef, MountTarget, NodeKind};
use crate::logging::{CaptureLayer, LogBuffer, LogLevel};
use crate::resource::{Artifact, MemoryLoader, ResourceDescriptor};
use crate::view::{Blueprint, Entity, ReadyState, View};
use serde_json::json;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};

fn target(width: f64, height: f64) -> Arc<MemoryTarget> {
    Arc::new(MemoryTarget::new(Bounds::new(0.0, 0.0, width, height)))
}

/// Leaf view counting its hook invocations
fn counting_view(setups: Arc<AtomicUsize>, draws: Arc<AtomicUsize>) -> Box<dyn View> {
    Blueprint::new()
        .on_setup(move |_cx| {
            setups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .on_draw(move |_cx| {
            draws.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .boxed()
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration errors
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_render_without_any_target_is_fatal() {
    let entity = Entity::builder(counting_view(Default::default(), Default::default())).build();
    assert!(matches!(entity.render(None), Err(RuntimeError::NoMountTarget)));

    // Once a target was supplied, target-less renders are fine
    let mount: MountRef = target(100.0, 100.0);
    entity.render(Some(mount)).unwrap();
    entity.render(None).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_missing_hook_is_named() {
    let setup_only = Blueprint::new().on_setup(|_| Ok(())).boxed();
    let entity = Entity::builder(setup_only).build();
    let err = entity.render(Some(target(10.0, 10.0))).unwrap_err();
    assert_eq!(err, RuntimeError::MissingHook("draw"));

    let draw_only = Blueprint::new().on_draw(|_| Ok(())).boxed();
    let entity = Entity::builder(draw_only).build();
    let err = entity.render(Some(target(10.0, 10.0))).unwrap_err();
    assert_eq!(err, RuntimeError::MissingHook("setup"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Debounce and cancellation laws
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_rapid_renders_coalesce_into_one_draw() {
    let setups = Arc::new(AtomicUsize::new(0));
    let draws = Arc::new(AtomicUsize::new(0));
    let entity = Entity::builder(counting_view(setups.clone(), draws.clone())).build();
    let mount: MountRef = target(100.0, 100.0);

    // Renders at t, t+10ms, t+20ms with a 100ms quiet interval
    entity.render(Some(mount.clone())).unwrap();
    sleep(Duration::from_millis(10)).await;
    entity.render(None).unwrap();
    sleep(Duration::from_millis(10)).await;
    entity.render(None).unwrap();

    // Setup ran once (same target, no dirty reset); no draw before t+120ms
    assert_eq!(setups.load(Ordering::SeqCst), 1);
    sleep(Duration::from_millis(90)).await; // t+110ms
    assert_eq!(draws.load(Ordering::SeqCst), 0);

    sleep(Duration::from_millis(11)).await; // past t+120ms
    assert_eq!(draws.load(Ordering::SeqCst), 1);

    // Quiet afterwards: nothing else fires
    sleep(Duration::from_millis(500)).await;
    assert_eq!(draws.load(Ordering::SeqCst), 1);
    assert_eq!(setups.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_newer_render_cancels_pending_draw() {
    let draws = Arc::new(AtomicUsize::new(0));
    let entity =
        Entity::builder(counting_view(Default::default(), draws.clone())).build();
    let mount: MountRef = target(100.0, 100.0);

    entity.render(Some(mount)).unwrap();
    sleep(Duration::from_millis(50)).await;
    entity.render(None).unwrap(); // aborts the draw scheduled at t

    // t+110ms: the first draw would have fired at t+100ms had it survived
    sleep(Duration::from_millis(60)).await;
    assert_eq!(draws.load(Ordering::SeqCst), 0);

    // The replacement fires at t+150ms
    sleep(Duration::from_millis(45)).await;
    assert_eq!(draws.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_immediate_draw_consumes_the_pending_debounced_draw() {
    let draws = Arc::new(AtomicUsize::new(0));
    let entity = Entity::builder(counting_view(Default::default(), draws.clone())).build();
    entity.render(Some(target(100.0, 100.0))).unwrap(); // pending at t+100ms

    sleep(Duration::from_millis(30)).await;
    entity.handle().draw_now();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(draws.load(Ordering::SeqCst), 1);

    // A newer render schedules at t+131ms. The draw originally pending at
    // t+100ms was consumed by the immediate one and must never fire.
    entity.render(None).unwrap();
    sleep(Duration::from_millis(80)).await; // past t+100ms
    assert_eq!(draws.load(Ordering::SeqCst), 1);
    sleep(Duration::from_millis(30)).await; // past t+131ms
    assert_eq!(draws.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_debounce_interval_is_configurable() {
    let draws = Arc::new(AtomicUsize::new(0));
    let entity = Entity::builder(counting_view(Default::default(), draws.clone()))
        .options(RuntimeOptions::from_toml_str("debounce_ms = 20").unwrap())
        .build();

    entity.render(Some(target(10.0, 10.0))).unwrap();
    sleep(Duration::from_millis(25)).await;
    assert_eq!(draws.load(Ordering::SeqCst), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Dirty tracking and target identity
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_builder_supplied_mount_renders_on_first_call() {
    let setups = Arc::new(AtomicUsize::new(0));
    let draws = Arc::new(AtomicUsize::new(0));
    let entity = Entity::builder(counting_view(setups.clone(), draws.clone()))
        .mount(target(100.0, 100.0))
        .build();

    // The stored mount has never been set up; the first render must not
    // mistake it for an already-prepared target.
    entity.render(None).unwrap();
    assert_eq!(setups.load(Ordering::SeqCst), 1);
    sleep(Duration::from_millis(110)).await;
    assert_eq!(draws.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_forces_fresh_setup_on_same_target() {
    let setups = Arc::new(AtomicUsize::new(0));
    let entity =
        Entity::builder(counting_view(setups.clone(), Default::default())).build();
    let mount: MountRef = target(100.0, 100.0);

    entity.render(Some(mount.clone())).unwrap();
    entity.render(None).unwrap();
    assert_eq!(setups.load(Ordering::SeqCst), 1);

    entity.invalidate();
    entity.render(None).unwrap();
    assert_eq!(setups.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_target_swap_is_last_writer_wins_and_forces_setup() {
    // A renders into the shared target; B takes it over by clearing it in
    // setup; A pointed at a replacement container re-runs setup because the
    // identity no longer matches its stored (now stale) reference.
    let shared = target(200.0, 200.0);
    let shared_ref: MountRef = shared.clone();

    let a_setups = Arc::new(AtomicUsize::new(0));
    let a_view = {
        let setups = a_setups.clone();
        Blueprint::new()
            .on_setup(move |cx| {
                setups.fetch_add(1, Ordering::SeqCst);
                cx.target
                    .append_child(crate::host::Node::new(NodeKind::Content).with_text("A"));
                Ok(())
            })
            .on_draw(|_| Ok(()))
            .boxed()
    };
    let b_view = Blueprint::new()
        .on_setup(|cx| {
            cx.target.clear_children();
            cx.target
                .append_child(crate::host::Node::new(NodeKind::Content).with_text("B"));
            Ok(())
        })
        .on_draw(|_| Ok(()))
        .boxed();

    let a = Entity::builder(a_view).build();
    let b = Entity::builder(b_view).build();

    a.render(Some(shared_ref.clone())).unwrap();
    b.render(Some(shared_ref.clone())).unwrap();

    let texts: Vec<_> = shared
        .children()
        .into_iter()
        .filter_map(|(_, n)| n.text)
        .collect();
    assert_eq!(texts, vec!["B".to_string()]);

    // A now renders into a replacement container: identity mismatch
    assert_eq!(a_setups.load(Ordering::SeqCst), 1);
    let replacement: MountRef = target(200.0, 200.0);
    a.render(Some(replacement)).unwrap();
    assert_eq!(a_setups.load(Ordering::SeqCst), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource gating
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_renders_gate_until_all_resources_resolve() {
    let setups = Arc::new(AtomicUsize::new(0));
    let draws = Arc::new(AtomicUsize::new(0));

    let loader = Arc::new(
        MemoryLoader::new()
            .with_artifact("intro.txt", Artifact::Text("hello".to_string()))
            .with_artifact("rows.json", Artifact::Data(json!([1, 2]))),
    );
    loader.gate("intro.txt");
    loader.gate("rows.json");

    let entity = Entity::builder(counting_view(setups.clone(), draws.clone()))
        .resource(ResourceDescriptor::Text { url: "intro.txt".to_string() })
        .resource(ResourceDescriptor::Data { url: "rows.json".to_string() })
        .loader(loader.clone())
        .build();
    assert!(!entity.ready());

    // Three renders while both loads are in flight: all gated, no effects
    let mount: MountRef = target(100.0, 100.0);
    for _ in 0..3 {
        entity.render(Some(mount.clone())).unwrap();
        sleep(Duration::from_millis(10)).await;
    }
    sleep(Duration::from_millis(300)).await;
    assert_eq!(setups.load(Ordering::SeqCst), 0);
    assert_eq!(draws.load(Ordering::SeqCst), 0);

    // One resource is not enough
    loader.release("intro.txt");
    sleep(Duration::from_millis(50)).await;
    assert!(!entity.ready());
    assert_eq!(setups.load(Ordering::SeqCst), 0);

    // Both resolved: internal render runs setup once, one debounced draw
    loader.release("rows.json");
    sleep(Duration::from_millis(10)).await;
    assert!(entity.ready());
    assert_eq!(*entity.ready_watch().borrow(), ReadyState::Ready);
    assert_eq!(setups.load(Ordering::SeqCst), 1);
    assert_eq!(draws.load(Ordering::SeqCst), 0);

    sleep(Duration::from_millis(110)).await;
    assert_eq!(setups.load(Ordering::SeqCst), 1);
    assert_eq!(draws.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_load_outcome_reaches_late_watch_subscribers() {
    // No receiver exists while either load completes; the outcome must
    // still be readable from a watch subscribed afterwards.
    let loaded = Entity::builder(counting_view(Default::default(), Default::default()))
        .resource(ResourceDescriptor::Text { url: "intro.txt".to_string() })
        .loader(Arc::new(
            MemoryLoader::new().with_artifact("intro.txt", Artifact::Text("hi".to_string())),
        ))
        .build();
    sleep(Duration::from_millis(10)).await;
    assert!(loaded.ready());
    assert_eq!(*loaded.ready_watch().borrow(), ReadyState::Ready);

    let failed = Entity::builder(counting_view(Default::default(), Default::default()))
        .resource(ResourceDescriptor::Text { url: "absent.txt".to_string() })
        .loader(Arc::new(MemoryLoader::new()))
        .build();
    sleep(Duration::from_millis(10)).await;
    assert!(matches!(&*failed.ready_watch().borrow(), ReadyState::Failed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_resource_bearing_incomplete_chain_surfaces_missing_hook() {
    let view = Blueprint::new()
        .on_setup(|_| Ok(()))
        .with_resource(ResourceDescriptor::Text { url: "intro.txt".to_string() })
        .boxed();
    let entity = Entity::builder(view)
        .loader(Arc::new(
            MemoryLoader::new().with_artifact("intro.txt", Artifact::Text("hi".to_string())),
        ))
        .mount(target(10.0, 10.0))
        .build();

    // The internal post-load render hits the configuration error; it is
    // published on the watch channel and raised by later renders.
    sleep(Duration::from_millis(10)).await;
    assert!(matches!(
        &*entity.ready_watch().borrow(),
        ReadyState::Failed(RuntimeError::MissingHook("draw"))
    ));
    assert_eq!(
        entity.render(None).unwrap_err(),
        RuntimeError::MissingHook("draw")
    );
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_is_a_soft_fail() {
    use tracing_subscriber::prelude::*;

    let buffer = LogBuffer::new();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer::new(buffer.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let setups = Arc::new(AtomicUsize::new(0));
    let entity = Entity::builder(counting_view(setups.clone(), Default::default()))
        .resource(ResourceDescriptor::Text { url: "absent.txt".to_string() })
        .loader(Arc::new(MemoryLoader::new()))
        .build();

    let mut watch = entity.ready_watch();
    sleep(Duration::from_millis(10)).await;
    assert!(matches!(&*watch.borrow_and_update(), ReadyState::Failed(_)));

    // The entity never becomes ready; renders keep silently no-op'ing
    entity.render(Some(target(10.0, 10.0))).unwrap();
    sleep(Duration::from_millis(500)).await;
    assert!(!entity.ready());
    assert_eq!(setups.load(Ordering::SeqCst), 0);
    assert!(buffer.contains(LogLevel::Warn, "resource load failed"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Capabilities on a live entity
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_loading_overlay_until_load_event() {
    let base = counting_view(Default::default(), Default::default());
    let view = capability::loading::attach(base, LoadingConfig { label: Some("fetching".into()) });

    let mount = target(120.0, 80.0);
    let entity = Entity::builder(view)
        .loader(Arc::new(MemoryLoader::new()))
        .mount(mount.clone())
        .build();
    assert!(entity.has_capability(crate::Capabilities::LOADING));

    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;
    let spinners = mount.children_of_kind(NodeKind::Spinner);
    assert_eq!(spinners.len(), 1);
    assert!(spinners[0].text.as_deref().unwrap_or("").contains("fetching"));

    // The load event flips the flag and schedules a re-render; the next
    // draw drops the overlay.
    entity.bus().trigger(event::LOAD, serde_json::Value::Null);
    sleep(Duration::from_millis(200)).await;
    assert!(mount.children_of_kind(NodeKind::Spinner).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_state_overlay_follows_message_hook() {
    let empty = Arc::new(std::sync::atomic::AtomicBool::new(true));
    let hook_flag = empty.clone();
    let view = capability::empty_state::attach(
        counting_view(Default::default(), Default::default()),
        EmptyStateConfig::new(Arc::new(move |_cx| {
            hook_flag
                .load(Ordering::SeqCst)
                .then(|| "nothing to show".to_string())
        })),
    );

    let mount = target(100.0, 100.0);
    let entity = Entity::builder(view).mount(mount.clone()).build();
    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(mount.children_of_kind(NodeKind::MessageLayer).len(), 1);

    empty.store(false, Ordering::SeqCst);
    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert!(mount.children_of_kind(NodeKind::MessageLayer).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_animation_loop_runs_fixed_steps_and_stops() {
    let frames = Arc::new(AtomicU64::new(0));
    let frame_sink = frames.clone();
    let view = capability::animated::attach(
        counting_view(Default::default(), Default::default()),
        AnimatedConfig {
            frame_rate: Some(10), // 100ms per step
            on_frame: Some(Arc::new(move |n| {
                frame_sink.store(n, Ordering::SeqCst);
            })),
        },
    );

    let entity = Entity::builder(view).mount(target(50.0, 50.0)).build();
    entity.render(None).unwrap();

    // First draw at t+100ms starts the loop; a second of animation at
    // 10fps yields ten frames.
    sleep(Duration::from_millis(110)).await;
    sleep(Duration::from_millis(1000)).await;
    let after_second = frames.load(Ordering::SeqCst);
    assert!(
        (9..=11).contains(&after_second),
        "expected ~10 frames, got {after_second}"
    );

    entity.bus().trigger(event::ANIMATION_STOP, serde_json::Value::Null);
    sleep(Duration::from_millis(300)).await;
    let stopped_at = frames.load(Ordering::SeqCst);
    sleep(Duration::from_millis(500)).await;
    assert_eq!(frames.load(Ordering::SeqCst), stopped_at);

    // Restartable
    entity.bus().trigger(event::ANIMATION_START, serde_json::Value::Null);
    sleep(Duration::from_millis(500)).await;
    assert!(frames.load(Ordering::SeqCst) > stopped_at);
}

#[tokio::test(start_paused = true)]
async fn test_animation_loop_winds_down_when_entity_is_dropped() {
    let frames = Arc::new(AtomicU64::new(0));
    let frame_sink = frames.clone();
    let view = capability::animated::attach(
        counting_view(Default::default(), Default::default()),
        AnimatedConfig {
            frame_rate: Some(10),
            on_frame: Some(Arc::new(move |n| {
                frame_sink.store(n, Ordering::SeqCst);
            })),
        },
    );
    let entity = Entity::builder(view).mount(target(50.0, 50.0)).build();
    entity.render(None).unwrap();

    sleep(Duration::from_millis(110)).await; // first draw starts the loop
    sleep(Duration::from_millis(500)).await;
    assert!(frames.load(Ordering::SeqCst) > 0);

    // Dropping the only handle must let the loop notice and exit
    drop(entity);
    sleep(Duration::from_millis(200)).await;
    let at_exit = frames.load(Ordering::SeqCst);
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(frames.load(Ordering::SeqCst), at_exit);
}

#[tokio::test(start_paused = true)]
async fn test_target_swap_moves_loading_overlay_off_the_old_target() {
    let view = capability::loading::attach(
        counting_view(Default::default(), Default::default()),
        LoadingConfig::default(),
    );
    let first = target(100.0, 100.0);
    let entity = Entity::builder(view)
        .loader(Arc::new(MemoryLoader::new()))
        .mount(first.clone())
        .build();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(first.children_of_kind(NodeKind::Spinner).len(), 1);

    let second = target(100.0, 100.0);
    entity.render(Some(second.clone())).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert!(first.children_of_kind(NodeKind::Spinner).is_empty());
    assert_eq!(second.children_of_kind(NodeKind::Spinner).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_target_swap_moves_modal_nodes_off_the_old_target() {
    let view = capability::modal::attach(
        Blueprint::new().on_setup(|_| Ok(())).on_draw(|_| Ok(())).boxed(),
        ModalConfig {
            title: "Session expired".to_string(),
            body: None,
            buttons: vec![ModalButton::new("Dismiss", Arc::new(|| {}))],
        },
    );
    let first = target(300.0, 300.0);
    let entity = Entity::builder(view).mount(first.clone()).build();
    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(first.children_of_kind(NodeKind::Template).len(), 1);
    assert_eq!(first.children_of_kind(NodeKind::Button).len(), 1);

    let second = target(300.0, 300.0);
    entity.render(Some(second.clone())).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert!(first.children_of_kind(NodeKind::Template).is_empty());
    assert!(first.children_of_kind(NodeKind::Button).is_empty());
    assert_eq!(second.children_of_kind(NodeKind::Button).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_size_emits_resized_only_on_change() {
    let frame = target(300.0, 200.0);
    let view = capability::fixed_size::attach(
        counting_view(Default::default(), Default::default()),
        FixedSizeConfig { frame: frame.clone() },
    );

    let entity = Entity::builder(view).mount(target(100.0, 100.0)).build();
    let resizes = Arc::new(AtomicUsize::new(0));
    let sink = resizes.clone();
    entity.bus().on(
        event::RESIZED,
        Arc::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }),
        false,
    );

    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(resizes.load(Ordering::SeqCst), 1);

    // Unchanged frame bounds: draw again, no event
    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(resizes.load(Ordering::SeqCst), 1);

    frame.set_bounds(Bounds::new(0.0, 0.0, 400.0, 200.0));
    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;
    assert_eq!(resizes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_modal_routes_clicks_and_skips_disabled_buttons() {
    let confirmed = Arc::new(AtomicUsize::new(0));
    let cancelled = Arc::new(AtomicUsize::new(0));
    let on_confirm = confirmed.clone();
    let on_cancel = cancelled.clone();

    let view = capability::modal::attach(
        Blueprint::new().on_setup(|_| Ok(())).on_draw(|_| Ok(())).boxed(),
        ModalConfig {
            title: "Discard changes?".to_string(),
            body: Some("Unsaved edits will be lost.".to_string()),
            buttons: vec![
                ModalButton::new(
                    "Discard",
                    Arc::new(move || {
                        on_confirm.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .selected(),
                ModalButton::new(
                    "Cancel",
                    Arc::new(move || {
                        on_cancel.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .disabled(),
            ],
        },
    );

    let mount = target(300.0, 300.0);
    let entity = Entity::builder(view).mount(mount.clone()).build();
    entity.render(None).unwrap();
    sleep(Duration::from_millis(150)).await;

    let buttons = mount.children_of_kind(NodeKind::Button);
    assert_eq!(buttons.len(), 2);
    assert_eq!(mount.children_of_kind(NodeKind::Template).len(), 1);

    let discard = buttons[0].bounds.unwrap();
    let cancel = buttons[1].bounds.unwrap();
    mount.dispatch_input(InputEvent::PointerDown {
        x: discard.x + 1.0,
        y: discard.y + 1.0,
    });
    mount.dispatch_input(InputEvent::PointerDown {
        x: cancel.x + 1.0,
        y: cancel.y + 1.0,
    });
    // Outside any button: ignored
    mount.dispatch_input(InputEvent::PointerDown { x: 1.0, y: 1.0 });

    assert_eq!(confirmed.load(Ordering::SeqCst), 1);
    assert_eq!(cancelled.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_capability_resources_gate_readiness() {
    // The loading capability contributes a stylesheet descriptor; the
    // entity only becomes ready once that (inline) resource resolves.
    let view = capability::loading::attach(
        counting_view(Default::default(), Default::default()),
        LoadingConfig::default(),
    );
    let entity = Entity::builder(view)
        .loader(Arc::new(MemoryLoader::new()))
        .build();

    sleep(Duration::from_millis(10)).await;
    assert!(entity.ready());
}
