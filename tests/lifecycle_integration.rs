//! Hook pipeline, reentrancy, and watcher-driven refresh behaviour.

use colonnade::engine::LayoutInstance;
use colonnade::surface::{MockSurface, Natural};
use colonnade::watch::{ResponsiveWatcher, WatchNotice};
use colonnade::{HookPoint, LayoutError, LayoutEvent, LayoutOptions, LifecyclePhase, Surface};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

fn instance(heights: &[f64]) -> LayoutInstance<MockSurface> {
    let mut surface = MockSurface::new(1200.0);
    let container = surface.add_container(1000.0);
    for &height in heights {
        surface.add_item(container, Natural::Fixed(height));
    }
    LayoutInstance::new(surface, container, LayoutOptions::default())
}

#[test]
fn hooks_run_in_registration_order_around_each_phase() {
    let mut engine = instance(&[100.0, 90.0]);
    let trace: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    for (point, label) in [
        (HookPoint::BeforeInit, "before-init"),
        (HookPoint::AfterInit, "after-init"),
        (HookPoint::BeforeLayout, "before-layout"),
        (HookPoint::AfterLayout, "after-layout"),
        (HookPoint::BeforeDestroy, "before-destroy"),
        (HookPoint::AfterDestroy, "after-destroy"),
    ] {
        let sink = Rc::clone(&trace);
        engine.add_hook(point, move |_| {
            sink.borrow_mut().push(label);
            Ok(())
        });
    }

    engine.init().expect("init");
    engine.layout().expect("layout");
    engine.destroy().expect("destroy");

    assert_eq!(
        *trace.borrow(),
        vec![
            "before-init",
            "after-init",
            "before-layout",
            "after-layout",
            "before-destroy",
            "after-destroy",
        ]
    );
}

#[test]
fn failing_hook_aborts_remaining_callbacks_and_the_operation() {
    let mut engine = instance(&[100.0]);
    engine.init().expect("init");

    let ran_first = Rc::new(RefCell::new(false));
    let ran_last = Rc::new(RefCell::new(false));
    let first = Rc::clone(&ran_first);
    engine.add_hook(HookPoint::BeforeLayout, move |_| {
        *first.borrow_mut() = true;
        Ok(())
    });
    engine.add_hook(HookPoint::BeforeLayout, |_| {
        Err("collaborator refused".to_string())
    });
    let last = Rc::clone(&ran_last);
    engine.add_hook(HookPoint::BeforeLayout, move |_| {
        *last.borrow_mut() = true;
        Ok(())
    });

    let err = engine.layout().expect_err("hook failure propagates");
    match err {
        LayoutError::Hook(hook) => {
            assert_eq!(hook.point, HookPoint::BeforeLayout);
            assert_eq!(hook.index, 1);
            assert!(hook.message.contains("collaborator refused"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Already-run callbacks are not rolled back; later ones never ran.
    assert!(*ran_first.borrow());
    assert!(!*ran_last.borrow());
    // The instance recovers: a later layout succeeds once the hook is gone.
    assert!(!engine.is_layout_in_progress());
}

#[test]
fn before_destroy_failure_leaves_instance_usable() {
    let mut engine = instance(&[100.0]);
    engine.init().expect("init");
    let id = engine.add_hook(HookPoint::BeforeDestroy, |_| Err("not yet".to_string()));

    assert!(engine.destroy().is_err());
    assert!(engine.layout().expect("still usable"));

    engine.remove_hook(HookPoint::BeforeDestroy, id);
    engine.destroy().expect("destroy succeeds after removal");
}

#[test]
fn reentrant_layout_from_a_hook_is_dropped() {
    let mut engine = instance(&[100.0, 90.0, 80.0]);
    engine.init().expect("init");

    let nested: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&nested);
    engine.add_hook(HookPoint::BeforeLayout, move |inner| {
        // Re-entering layout mid-pass must be a silent no-op.
        let ran = inner.layout().expect("drop is not an error");
        sink.borrow_mut().push(ran);
        Ok(())
    });

    let baseline = engine.state();
    assert!(engine.layout().expect("outer pass runs"));
    assert_eq!(*nested.borrow(), vec![false], "nested call was dropped");

    // State equals a single pass run to completion.
    let after = engine.state();
    assert_eq!(after.column_heights, baseline.column_heights);
    let before_placements: Vec<_> = baseline.items.iter().map(|i| i.placement).collect();
    let after_placements: Vec<_> = after.items.iter().map(|i| i.placement).collect();
    assert_eq!(after_placements, before_placements);
}

#[test]
fn destroy_from_inside_a_pass_is_rejected() {
    let mut engine = instance(&[100.0, 90.0]);
    engine.init().expect("init");

    let attempts: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&attempts);
    engine.add_hook(HookPoint::BeforeLayout, move |inner| {
        let rejected = matches!(
            inner.destroy(),
            Err(LayoutError::LayoutInProgress {
                operation: "destroy"
            })
        );
        sink.borrow_mut().push(rejected);
        Ok(())
    });

    assert!(engine.layout().expect("outer pass completes"));
    assert_eq!(*attempts.borrow(), vec![true], "teardown mid-pass refused");

    // Destroyed must stay terminal: the pass must not have torn anything
    // down, and a destroy outside the pass still works and sticks.
    assert_eq!(engine.phase(), LifecyclePhase::Ready);
    assert!(engine.layout().expect("still usable"));
    engine.destroy().expect("destroy outside a pass");
    assert_eq!(engine.phase(), LifecyclePhase::Destroyed);
    assert!(matches!(
        engine.layout(),
        Err(LayoutError::Destroyed { .. })
    ));
}

#[test]
fn subscriber_may_reenter_the_mutation_api() {
    let mut engine = instance(&[100.0, 90.0]);
    let container = engine.container();
    let extra = engine
        .surface_mut()
        .add_item_with_selector(container, "late", Natural::Fixed(50.0));
    engine.init().expect("init");
    assert_eq!(engine.state().items.len(), 2);

    // A collaborator reacting to layout-completed by appending an item.
    let appended = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&appended);
    engine.subscribe(move |inner, event| {
        if matches!(event, LayoutEvent::LayoutCompleted { .. }) && !*flag.borrow() {
            *flag.borrow_mut() = true;
            inner.add_items(&[extra]).expect("reentrant add");
        }
    });

    engine.layout().expect("layout");
    assert!(*appended.borrow());
    assert_eq!(engine.state().items.len(), 3);
}

#[test]
fn destroy_clears_state_and_emits_destroyed() {
    let mut engine = instance(&[100.0, 90.0]);
    engine.init().expect("init");

    let saw_destroyed = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&saw_destroyed);
    engine.subscribe(move |_, event| {
        if matches!(event, LayoutEvent::Destroyed) {
            *flag.borrow_mut() = true;
        }
    });

    engine.destroy().expect("destroy");
    assert!(*saw_destroyed.borrow());
    let snapshot = engine.state();
    assert!(snapshot.items.is_empty());
    assert!(snapshot.column_heights.is_empty());
    assert!(snapshot.breakpoint.is_none());
}

#[test]
fn hooks_are_per_instance_never_shared() {
    let mut first = instance(&[100.0]);
    let mut second = instance(&[100.0]);
    let count = Rc::new(RefCell::new(0_u32));
    let sink = Rc::clone(&count);
    first.add_hook(HookPoint::BeforeLayout, move |_| {
        *sink.borrow_mut() += 1;
        Ok(())
    });

    first.init().expect("init");
    second.init().expect("init");
    first.layout().expect("layout");
    second.layout().expect("layout");
    assert_eq!(*count.borrow(), 1, "second instance must not see the hook");
}

#[test]
fn debounced_resize_storm_results_in_one_refresh() {
    let mut engine = instance(&[100.0, 90.0, 80.0, 70.0]);
    engine.init().expect("init");
    assert_eq!(engine.state().column_heights.len(), 3);

    let mut watcher = ResponsiveWatcher::new(Duration::from_millis(
        engine.options().debounce_ms,
    ));
    let start = Instant::now();

    // A storm of notifications within the window.
    watcher.notify_resize(900.0, start);
    watcher.notify_resize(820.0, start + Duration::from_millis(20));
    watcher.notify_resize(700.0, start + Duration::from_millis(40));
    assert_eq!(watcher.poll(start + Duration::from_millis(50)), None);

    let mut refreshes = 0;
    let mut now = start;
    for _ in 0..30 {
        now += Duration::from_millis(10);
        if let Some(notice) = watcher.poll(now) {
            if let WatchNotice::Resize { viewport_width } = notice {
                engine.surface_mut().set_viewport_width(viewport_width);
            }
            engine.refresh().expect("refresh");
            refreshes += 1;
        }
    }

    assert_eq!(refreshes, 1, "storm coalesces into a single pass");
    // 700px is tablet; the default tablet count is 3.
    assert_eq!(engine.breakpoint(), Some(colonnade::Breakpoint::Tablet));
}

#[test]
fn media_loaded_notice_drives_refresh_through_watcher() {
    let mut engine = instance(&[100.0]);
    let container = engine.container();
    let media = engine.surface_mut().add_item(container, Natural::Pending);
    engine.init().expect("init");
    let before = engine.state().container_height;

    let mut watcher = ResponsiveWatcher::new(Duration::from_millis(100));
    let start = Instant::now();
    engine
        .surface_mut()
        .resolve_media(media, Natural::Fixed(400.0));
    watcher.notify_media_loaded(media, start);

    let fired = watcher.poll(start + Duration::from_millis(100));
    assert!(matches!(fired, Some(WatchNotice::MediaLoaded { item }) if item == media));
    engine.refresh().expect("refresh");
    assert!(engine.state().container_height > before);
}

#[test]
fn removed_items_are_detached_from_the_surface() {
    let mut engine = instance(&[100.0, 90.0, 80.0]);
    engine.init().expect("init");
    let victim = engine.state().items[1].id;
    engine.remove_items(&[victim]).expect("remove");

    let container = engine.container();
    let remaining = engine.surface().items_of(container, "item");
    assert_eq!(remaining.len(), 2);
    assert!(!remaining.contains(&victim));
}

#[test]
fn append_to_empty_container_places_the_new_item() {
    // Construct, init on an empty container, then append.
    let mut surface = MockSurface::new(1200.0);
    let container = surface.add_container(1000.0);
    let mut engine = LayoutInstance::new(surface, container, LayoutOptions::default());
    engine.init().expect("init");

    let late = engine
        .surface_mut()
        .add_item(container, Natural::Fixed(120.0));
    engine.add_items(&[late]).expect("add");
    let snapshot = engine.state();
    assert_eq!(snapshot.items.len(), 1);
    assert!(snapshot.items[0].placement.is_some());
    assert!(snapshot.container_height > 0.0);
}

#[test]
fn get_state_is_a_detached_snapshot() {
    let mut engine = instance(&[100.0, 90.0]);
    engine.init().expect("init");
    let snapshot = engine.state();
    engine.surface_mut().set_viewport_width(700.0);
    engine.refresh().expect("refresh");
    // The old snapshot still describes the desktop pass.
    assert_eq!(snapshot.breakpoint, Some(colonnade::Breakpoint::Desktop));
    assert_eq!(engine.breakpoint(), Some(colonnade::Breakpoint::Tablet));
}
