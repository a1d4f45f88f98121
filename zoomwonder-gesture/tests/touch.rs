use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use zoomwonder_gesture::{
    ManualScheduler, TargetGeometry, TargetId, TargetSpec, TouchInput, TouchPoint, Transform,
    ZoomController, ZoomEvent,
};

type Controller = ZoomController<(), ManualScheduler>;
type Log = Rc<RefCell<Vec<String>>>;

fn setup_with_touch_points(touch_points: u32) -> (Controller, TargetId, Log) {
    let mut controller = Controller::new(ManualScheduler::new());
    let target = controller
        .register(
            TargetSpec::new(())
                .with_geometry(TargetGeometry::element(100, 100))
                .with_touch_points(touch_points),
        )
        .unwrap();
    controller.attach(&[target]).unwrap();

    let log = Log::default();
    let sink = Rc::clone(&log);
    controller
        .on(
            "start zoom zoom-suggest end",
            Some(Rc::new(move |event: &ZoomEvent<'_, ()>| {
                sink.borrow_mut().push(event.kind.to_string());
            })),
        )
        .unwrap();
    (controller, target, log)
}

fn setup() -> (Controller, TargetId, Log) {
    setup_with_touch_points(5)
}

fn touch(id: u64, x: f64, y: f64) -> TouchPoint {
    TouchPoint::new(id, (x, y))
}

/// Event where `changed` are the only touches on the surface.
fn only(changed: Vec<TouchPoint>) -> TouchInput {
    TouchInput::new(changed.clone(), changed)
}

fn tap(controller: &mut Controller, target: TargetId, id: u64, x: f64, y: f64) {
    controller.touch_start(target, only(vec![touch(id, x, y)]));
    controller.touch_end(target, TouchInput::new(vec![], vec![touch(id, x, y)]));
}

// ============================================================================
// One finger
// ============================================================================

#[test]
fn single_touch_pans() {
    let (mut controller, target, log) = setup();
    controller.touch_start(target, only(vec![touch(1, 10.0, 10.0)]));
    controller.touch_move(target, only(vec![touch(1, 30.0, 20.0)]));
    assert_eq!(controller.transform_of(target), Transform::new(1, 20, 10));

    controller.touch_end(target, TouchInput::new(vec![], vec![touch(1, 30.0, 20.0)]));
    assert_eq!(controller.transform_of(target), Transform::new(1, 20, 10));
    assert!(!controller.is_zooming(target));
    assert_eq!(*log.borrow(), vec!["start", "zoom-suggest", "zoom", "end"]);
}

#[test]
fn pan_is_measured_from_touch_start() {
    let (mut controller, target, _) = setup();
    controller
        .set_transform(&[target], Transform::new(2, 10, 0), None, None)
        .unwrap();

    controller.touch_start(target, only(vec![touch(1, 20.0, 20.0)]));
    controller.touch_move(target, only(vec![touch(1, 25.0, 20.0)]));
    controller.touch_move(target, only(vec![touch(1, 30.0, 25.0)]));
    assert_eq!(controller.transform_of(target), Transform::new(2, 20, 5));
}

// ============================================================================
// Two fingers
// ============================================================================

#[test]
fn pinch_scales_about_the_midpoint() {
    let (mut controller, target, log) = setup();
    controller.touch_start(
        target,
        only(vec![touch(1, 40.0, 50.0), touch(2, 60.0, 50.0)]),
    );
    // spread doubles: 20 -> 40
    controller.touch_move(
        target,
        only(vec![touch(1, 30.0, 50.0), touch(2, 70.0, 50.0)]),
    );

    let transform = controller.transform_of(target);
    assert_eq!(transform, Transform::new(2, -50, -50));
    assert_eq!(log.borrow().iter().filter(|kind| *kind == "start").count(), 1);
    assert_eq!(log.borrow().last().map(String::as_str), Some("zoom-suggest"));
}

#[test]
fn second_finger_can_join_a_pan() {
    let (mut controller, target, log) = setup();
    controller.touch_start(target, only(vec![touch(1, 40.0, 50.0)]));
    controller.touch_start(
        target,
        TouchInput::new(
            vec![touch(1, 40.0, 50.0), touch(2, 60.0, 50.0)],
            vec![touch(2, 60.0, 50.0)],
        ),
    );
    assert!(controller.is_zooming(target));
    assert_eq!(log.borrow().iter().filter(|kind| *kind == "start").count(), 1);

    controller.touch_move(target, only(vec![touch(2, 80.0, 50.0)]));
    // spread 20 -> 40, midpoint 50 -> 60
    assert_eq!(controller.transform_of(target), Transform::new(2, -40, -50));
}

#[test]
fn coincident_fingers_do_not_scale() {
    let (mut controller, target, _) = setup();
    controller.touch_start(
        target,
        only(vec![touch(1, 50.0, 50.0), touch(2, 50.0, 50.0)]),
    );
    controller.touch_move(
        target,
        only(vec![touch(1, 40.0, 50.0), touch(2, 60.0, 50.0)]),
    );
    assert_eq!(controller.transform_of(target), Transform::identity());
}

#[test]
fn lifting_one_finger_finishes_the_pinch() {
    let (mut controller, target, log) = setup();
    controller.touch_start(
        target,
        only(vec![touch(1, 40.0, 50.0), touch(2, 60.0, 50.0)]),
    );
    controller.touch_move(
        target,
        only(vec![touch(1, 30.0, 50.0), touch(2, 70.0, 50.0)]),
    );
    controller.touch_end(
        target,
        TouchInput::new(vec![touch(1, 30.0, 50.0)], vec![touch(2, 70.0, 50.0)]),
    );

    assert!(!controller.is_zooming(target));
    assert_eq!(controller.transform_of(target), Transform::new(2, -50, -50));
    assert_eq!(
        *log.borrow(),
        vec!["start", "zoom-suggest", "zoom", "end"]
    );

    // the remaining finger is no longer tracked
    controller.touch_move(target, only(vec![touch(1, 0.0, 0.0)]));
    assert_eq!(controller.transform_of(target), Transform::new(2, -50, -50));
}

#[test]
fn untracked_touch_end_is_ignored() {
    let (mut controller, target, log) = setup();
    controller.touch_start(target, only(vec![touch(1, 10.0, 10.0)]));
    controller.touch_end(target, TouchInput::new(vec![], vec![touch(9, 10.0, 10.0)]));
    assert!(controller.is_zooming(target));
    assert_eq!(*log.borrow(), vec!["start"]);
}

// ============================================================================
// Double tap
// ============================================================================

#[test]
fn double_tap_zooms_in_about_second_tap() {
    let (mut controller, target, _) = setup();
    controller.set_duration(Duration::ZERO);

    tap(&mut controller, target, 1, 50.0, 50.0);
    controller.scheduler_mut().advance_ms(100);
    controller.tick();
    tap(&mut controller, target, 2, 52.0, 50.0);

    assert_eq!(controller.transform_of(target), Transform::new(2, -52, -50));
}

#[test]
fn distant_taps_are_two_single_taps() {
    let (mut controller, target, _) = setup();
    controller.set_duration(Duration::ZERO);

    tap(&mut controller, target, 1, 20.0, 50.0);
    tap(&mut controller, target, 2, 50.0, 50.0);
    assert_eq!(controller.transform_of(target), Transform::identity());
}

#[test]
fn slow_taps_are_two_single_taps() {
    let (mut controller, target, _) = setup();
    controller.set_duration(Duration::ZERO);

    tap(&mut controller, target, 1, 50.0, 50.0);
    controller.scheduler_mut().advance_ms(500);
    controller.tick();
    tap(&mut controller, target, 2, 50.0, 50.0);
    assert_eq!(controller.transform_of(target), Transform::identity());
}

#[test]
fn third_tap_starts_a_new_sequence() {
    let (mut controller, target, _) = setup();
    controller.set_duration(Duration::ZERO);

    tap(&mut controller, target, 1, 50.0, 50.0);
    tap(&mut controller, target, 2, 50.0, 50.0);
    assert_eq!(controller.transform_of(target), Transform::new(2, -50, -50));

    // the window closed with the double tap
    tap(&mut controller, target, 3, 50.0, 50.0);
    assert_eq!(controller.transform_of(target), Transform::new(2, -50, -50));
}

// ============================================================================
// Gating
// ============================================================================

#[test]
fn target_without_touch_support_ignores_touches() {
    let (mut controller, target, log) = setup_with_touch_points(0);
    controller.touch_start(target, only(vec![touch(1, 10.0, 10.0)]));
    controller.touch_move(target, only(vec![touch(1, 30.0, 30.0)]));
    assert!(log.borrow().is_empty());
    assert_eq!(controller.transform_of(target), Transform::identity());
}

#[test]
fn touchable_callback_overrides_touch_support() {
    let (mut controller, target, log) = setup_with_touch_points(0);
    controller.set_touchable(true);
    controller.touch_start(target, only(vec![touch(1, 10.0, 10.0)]));
    assert_eq!(*log.borrow(), vec!["start"]);
}
