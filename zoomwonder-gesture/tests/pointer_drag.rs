use std::cell::RefCell;
use std::rc::Rc;

use zoomwonder_gesture::{
    Decimal, ManualScheduler, Platform, PointerInput, TargetGeometry, TargetId,
    TargetSpec, Transform, WheelInput, ZoomController, ZoomEvent,
};

type Controller = ZoomController<(), ManualScheduler>;
type Log = Rc<RefCell<Vec<String>>>;

fn d(value: &str) -> Decimal {
    value.parse().unwrap()
}

/// Records drag suppression calls; local space is client space shifted by
/// `origin`.
struct RecordingPlatform {
    log: Log,
    origin: (f64, f64),
}

impl Platform for RecordingPlatform {
    fn local_point(&self, _target: TargetId, client: (f64, f64)) -> (f64, f64) {
        (client.0 - self.origin.0, client.1 - self.origin.1)
    }

    fn disable_drag(&mut self, target: TargetId) {
        self.log.borrow_mut().push(format!("disable {target}"));
    }

    fn enable_drag(&mut self, target: TargetId, moved: bool) {
        self.log.borrow_mut().push(format!("enable {target} moved={moved}"));
    }
}

fn setup_with_origin(origin: (f64, f64)) -> (Controller, TargetId, Log) {
    let log = Log::default();
    let platform = RecordingPlatform {
        log: Rc::clone(&log),
        origin,
    };
    let mut controller = Controller::new(ManualScheduler::new()).with_platform(platform);
    let target = controller
        .register(TargetSpec::new(()).with_geometry(TargetGeometry::element(100, 100)))
        .unwrap();
    controller.attach(&[target]).unwrap();

    let sink = Rc::clone(&log);
    controller
        .on(
            "start zoom end",
            Some(Rc::new(move |event: &ZoomEvent<'_, ()>| {
                sink.borrow_mut().push(event.kind.to_string());
            })),
        )
        .unwrap();
    (controller, target, log)
}

fn setup() -> (Controller, TargetId, Log) {
    setup_with_origin((0.0, 0.0))
}

fn at(x: f64, y: f64) -> PointerInput {
    PointerInput::new((x, y))
}

// ============================================================================
// Panning
// ============================================================================

#[test]
fn drag_pans_view() {
    let (mut controller, target, _) = setup();
    controller.pointer_down(target, at(10.0, 10.0));
    controller.pointer_move(target, at(30.0, 25.0));
    assert_eq!(controller.transform_of(target), Transform::new(1, 20, 15));

    assert!(controller.pointer_up(target, at(30.0, 25.0)));
    assert!(!controller.is_zooming(target));
}

#[test]
fn drag_keeps_scale() {
    let (mut controller, target, _) = setup();
    controller
        .set_transform(&[target], Transform::new(2, 0, 0), None, None)
        .unwrap();

    controller.pointer_down(target, at(10.0, 10.0));
    controller.pointer_move(target, at(15.0, 10.0));
    controller.pointer_move(target, at(25.0, 30.0));
    assert_eq!(controller.transform_of(target), Transform::new(2, 15, 20));
}

#[test]
fn drag_uses_target_local_coordinates() {
    let (mut controller, target, _) = setup_with_origin((100.0, 100.0));
    controller.pointer_down(target, at(110.0, 110.0));
    controller.pointer_move(target, at(120.0, 105.0));
    assert_eq!(controller.transform_of(target), Transform::new(1, 10, -5));
}

#[test]
fn drag_emits_one_start_and_one_end() {
    let (mut controller, target, log) = setup();
    controller.pointer_down(target, at(0.0, 0.0));
    controller.pointer_move(target, at(1.0, 0.0));
    controller.pointer_move(target, at(2.0, 0.0));
    controller.pointer_up(target, at(2.0, 0.0));

    let kinds: Vec<String> = log
        .borrow()
        .iter()
        .filter(|entry| !entry.starts_with("disable") && !entry.starts_with("enable"))
        .cloned()
        .collect();
    assert_eq!(kinds, vec!["start", "zoom", "zoom", "end"]);
}

// ============================================================================
// Click distance
// ============================================================================

#[test]
fn press_without_movement_is_a_click() {
    let (mut controller, target, log) = setup();
    controller.pointer_down(target, at(5.0, 5.0));
    assert!(!controller.pointer_up(target, at(5.0, 5.0)));
    assert_eq!(
        *log.borrow(),
        vec![
            "start".to_string(),
            format!("disable {target}"),
            format!("enable {target} moved=false"),
            "end".to_string(),
        ]
    );
}

#[test]
fn movement_within_click_distance_is_still_a_click() {
    let (mut controller, target, _) = setup();
    controller.set_click_distance(5.0);

    controller.pointer_down(target, at(0.0, 0.0));
    controller.pointer_move(target, at(3.0, 4.0));
    // the view still follows the pointer
    assert_eq!(controller.transform_of(target), Transform::new(1, 3, 4));
    assert!(!controller.pointer_up(target, at(3.0, 4.0)));

    controller.pointer_down(target, at(0.0, 0.0));
    controller.pointer_move(target, at(6.0, 0.0));
    assert!(controller.pointer_up(target, at(6.0, 0.0)));
}

#[test]
fn moved_flag_sticks_after_returning_to_origin() {
    let (mut controller, target, log) = setup();
    controller.set_click_distance(2.0);
    controller.pointer_down(target, at(0.0, 0.0));
    controller.pointer_move(target, at(10.0, 0.0));
    controller.pointer_move(target, at(0.0, 0.0));
    assert!(controller.pointer_up(target, at(0.0, 0.0)));
    assert!(log
        .borrow()
        .contains(&format!("enable {target} moved=true")));
}

// ============================================================================
// Ignored and interrupted drags
// ============================================================================

#[test]
fn move_and_up_without_press_are_ignored() {
    let (mut controller, target, log) = setup();
    controller.pointer_move(target, at(10.0, 10.0));
    assert!(!controller.pointer_up(target, at(10.0, 10.0)));
    assert!(log.borrow().is_empty());
}

#[test]
fn secondary_button_does_not_drag() {
    let (mut controller, target, log) = setup();
    let mut press = at(0.0, 0.0);
    press.button = 2;
    controller.pointer_down(target, press);
    controller.pointer_move(target, at(50.0, 50.0));
    assert!(log.borrow().is_empty());
    assert_eq!(controller.transform_of(target), Transform::identity());
}

#[test]
fn interrupt_during_drag_restores_native_drag() {
    let (mut controller, target, log) = setup();
    controller.pointer_down(target, at(0.0, 0.0));
    controller.pointer_move(target, at(10.0, 0.0));
    controller.interrupt(target);

    assert!(!controller.is_zooming(target));
    let log = log.borrow();
    assert_eq!(log.iter().filter(|entry| *entry == "end").count(), 1);
    assert!(log.contains(&format!("enable {target} moved=true")));

    drop(log);
    // the stale release is ignored
    assert!(!controller.pointer_up(target, at(10.0, 0.0)));
}

#[test]
fn wheel_during_drag_keeps_content_under_pointer() {
    let (mut controller, target, log) = setup();
    controller.set_wheel_delta(1.0);

    controller.pointer_down(target, at(10.0, 10.0));
    controller.wheel(target, WheelInput::new((50.0, 50.0), -1.0));
    assert_eq!(controller.transform_of(target), Transform::new(2, -50, -50));

    let grabbed = controller.transform_of(target).invert_x(&d("10"));
    controller.pointer_move(target, at(20.0, 10.0));
    let transform = controller.transform_of(target);
    assert_eq!(transform, Transform::new(2, -40, -50));
    assert_eq!(transform.invert_x(&d("20")), grabbed);

    controller.pointer_up(target, at(20.0, 10.0));
    assert!(controller.is_zooming(target));
    controller.scheduler_mut().advance_ms(150);
    controller.tick();
    assert!(!controller.is_zooming(target));
    assert_eq!(log.borrow().iter().filter(|entry| *entry == "end").count(), 1);
}
