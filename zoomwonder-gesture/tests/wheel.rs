use std::cell::RefCell;
use std::rc::Rc;

use zoomwonder_gesture::{
    Bound, Decimal, EventKind, ManualScheduler, Modifiers, Point, ScaleExtent, TargetGeometry,
    TargetId, TargetSpec, Transform, WheelInput, ZoomController, ZoomEvent,
};

type Controller = ZoomController<(), ManualScheduler>;
type Log = Rc<RefCell<Vec<EventKind>>>;

fn d(value: &str) -> Decimal {
    value.parse().unwrap()
}

/// 100x100 target with every wheel tick requesting `2^delta`.
fn setup(delta: f64) -> (Controller, TargetId, Log) {
    let mut controller = Controller::new(ManualScheduler::new());
    let target = controller
        .register(TargetSpec::new(()).with_geometry(TargetGeometry::element(100, 100)))
        .unwrap();
    controller.attach(&[target]).unwrap();
    controller.set_wheel_delta(delta);

    let log = Log::default();
    let sink = Rc::clone(&log);
    controller
        .on(
            "start zoom end",
            Some(Rc::new(move |event: &ZoomEvent<'_, ()>| {
                sink.borrow_mut().push(event.kind);
            })),
        )
        .unwrap();
    (controller, target, log)
}

fn wheel_at(x: f64, y: f64) -> WheelInput {
    WheelInput::new((x, y), -100.0)
}

fn advance(controller: &mut Controller, millis: u64) {
    controller.scheduler_mut().advance_ms(millis);
    controller.tick();
}

// ============================================================================
// Zooming about the pointer
// ============================================================================

#[test]
fn wheel_zooms_about_pointer() {
    let (mut controller, target, _) = setup(1.0);
    controller.wheel(target, wheel_at(50.0, 50.0));

    let transform = controller.transform_of(target);
    assert_eq!(transform, Transform::new(2, -50, -50));
    let pointer = Point::new(d("50"), d("50"));
    assert_eq!(transform.invert(&pointer), pointer);
}

#[test]
fn default_wheel_delta_follows_scroll_direction() {
    let mut controller = Controller::new(ManualScheduler::new());
    let target = controller.register(TargetSpec::new(())).unwrap();
    controller.attach(&[target]).unwrap();

    // scrolling up (negative deltaY) zooms in
    controller.wheel(target, WheelInput::new((0.0, 0.0), -100.0));
    let zoomed_in = controller.transform_of(target);
    assert!(zoomed_in.k() > &Decimal::one());
    assert!((zoomed_in.k().to_f64() - 2f64.powf(0.2)).abs() < 1e-12);
}

#[test]
fn ctrl_wheel_zooms_ten_times_faster() {
    let mut controller = Controller::new(ManualScheduler::new());
    let target = controller.register(TargetSpec::new(())).unwrap();
    controller.attach(&[target]).unwrap();

    let mut pinch = WheelInput::new((0.0, 0.0), -50.0);
    pinch.modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::default()
    };
    controller.wheel(target, pinch);
    // -(-50) * 0.002 * 10 = 1
    assert_eq!(controller.transform_of(target).k(), &d("2"));
}

// ============================================================================
// Gesture lifetime
// ============================================================================

#[test]
fn wheel_gesture_ends_after_idle_delay() {
    let (mut controller, target, log) = setup(1.0);
    controller.wheel(target, wheel_at(0.0, 0.0));
    assert_eq!(*log.borrow(), vec![EventKind::Start, EventKind::Zoom]);
    assert!(controller.is_zooming(target));

    advance(&mut controller, 149);
    assert!(controller.is_zooming(target));

    advance(&mut controller, 1);
    assert!(!controller.is_zooming(target));
    assert_eq!(
        *log.borrow(),
        vec![EventKind::Start, EventKind::Zoom, EventKind::End]
    );
}

#[test]
fn successive_ticks_share_one_gesture() {
    let (mut controller, target, log) = setup(1.0);
    controller.wheel(target, wheel_at(0.0, 0.0));
    advance(&mut controller, 100);
    controller.wheel(target, wheel_at(0.0, 0.0));
    advance(&mut controller, 100);
    assert!(controller.is_zooming(target));
    controller.wheel(target, wheel_at(0.0, 0.0));
    advance(&mut controller, 150);

    assert_eq!(
        *log.borrow(),
        vec![
            EventKind::Start,
            EventKind::Zoom,
            EventKind::Zoom,
            EventKind::Zoom,
            EventKind::End
        ]
    );
    assert_eq!(controller.transform_of(target).k(), &d("8"));
}

#[test]
fn tick_after_idle_starts_new_gesture() {
    let (mut controller, target, log) = setup(1.0);
    controller.wheel(target, wheel_at(0.0, 0.0));
    advance(&mut controller, 150);
    controller.wheel(target, wheel_at(0.0, 0.0));

    let starts = log
        .borrow()
        .iter()
        .filter(|kind| **kind == EventKind::Start)
        .count();
    assert_eq!(starts, 2);
}

#[test]
fn wheel_that_cannot_change_scale_is_ignored() {
    let (mut controller, target, log) = setup(-1.0);
    controller.set_scale_extent(ScaleExtent::new(d("1"), Bound::Finite(d("10"))));

    controller.wheel(target, wheel_at(10.0, 10.0));
    assert!(log.borrow().is_empty());
    assert!(!controller.is_zooming(target));
    assert_eq!(controller.transform_of(target), Transform::identity());
}

#[test]
fn pointer_moves_between_ticks_reanchor_zoom() {
    let (mut controller, target, _) = setup(1.0);
    controller.wheel(target, wheel_at(0.0, 0.0));
    assert_eq!(controller.transform_of(target), Transform::new(2, 0, 0));

    controller.wheel(target, wheel_at(10.0, 20.0));
    // offset of (10, 20) from the origin doubles
    assert_eq!(controller.transform_of(target), Transform::new(4, -10, -20));
}

// ============================================================================
// Scale clamping and damping
// ============================================================================

#[test]
fn wheel_may_overshoot_max_scale() {
    let (mut controller, target, _) = setup(1.0);
    controller.set_scale_extent(ScaleExtent::new(d("1"), Bound::Finite(d("4"))));
    controller.scale_to(&[target], d("4"), None, None).unwrap();

    controller.wheel(target, wheel_at(0.0, 0.0));
    assert_eq!(controller.transform_of(target).k(), &d("8"));
}

#[test]
fn clamped_zoom_below_five_keeps_pointer_anchored() {
    let (mut controller, target, _) = setup(-1.0);
    controller.set_scale_extent(ScaleExtent::new(d("1.5"), Bound::PosInfinity));
    controller
        .set_transform(&[target], Transform::new(2, 0, 0), None, None)
        .unwrap();

    // requested 0.5, clamped to 1.5 / 2 = 0.75
    controller.wheel(target, wheel_at(40.0, 40.0));
    let transform = controller.transform_of(target);
    assert_eq!(transform, Transform::new(d("1.5"), d("10"), d("10")));
    assert_eq!(transform.invert_x(&d("40")), d("20"));
}

#[test]
fn clamped_zoom_from_five_up_applies_raw_factor() {
    let (mut controller, target, _) = setup(-1.0);
    controller.set_scale_extent(ScaleExtent::new(d("10"), Bound::PosInfinity));
    controller
        .set_transform(&[target], Transform::new(8, 0, 0), None, None)
        .unwrap();

    // k clamps to 10 but the offset shrinks by the requested 0.5
    controller.wheel(target, wheel_at(40.0, 40.0));
    assert_eq!(
        controller.transform_of(target),
        Transform::new(d("10"), d("20"), d("20"))
    );
}

// ============================================================================
// Rejected input
// ============================================================================

#[test]
fn filtered_wheel_is_ignored() {
    let (mut controller, target, log) = setup(1.0);
    controller.set_filter(false);
    controller.wheel(target, wheel_at(0.0, 0.0));
    assert!(log.borrow().is_empty());
}

#[test]
fn non_finite_position_is_ignored() {
    let (mut controller, target, log) = setup(1.0);
    controller.wheel(target, wheel_at(f64::NAN, 0.0));
    assert!(log.borrow().is_empty());
    assert_eq!(controller.transform_of(target), Transform::identity());
}

#[test]
fn detached_target_ignores_wheel() {
    let (mut controller, target, log) = setup(1.0);
    controller.detach(target).unwrap();
    controller.wheel(target, wheel_at(0.0, 0.0));
    assert!(log.borrow().is_empty());
}

#[test]
fn unattached_target_ignores_wheel() {
    let mut controller = Controller::new(ManualScheduler::new());
    let target = controller.register(TargetSpec::new(())).unwrap();
    controller.wheel(target, wheel_at(0.0, 0.0));
    assert_eq!(controller.transform_of(target), Transform::identity());
    assert!(!controller.is_zooming(target));
}
