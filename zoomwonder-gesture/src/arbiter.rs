//! Merges concurrent input channels into one committed transform per
//! target.
//!
//! Every handler runs to completion; a later event always observes the
//! transform committed by the one before it.

use std::collections::HashMap;
use std::time::Duration;

use zoomwonder_core::{Decimal, Extent, Point, Transform, TransformTween};

use crate::config::ZoomConfig;
use crate::events::{EventKind, Listeners, ZoomEvent};
use crate::gesture::{damped_scale_factor, Anchor, Channel, DragChannel, Gesture, TouchSlot, WheelChannel};
use crate::input::{InputEvent, PointerInput, TouchInput, WheelInput};
use crate::platform::Platform;
use crate::scheduler::{Scheduler, TimerId};
use crate::target::{TargetId, TargetNode, TargetTree};
use crate::transition::Transition;

/// Collaborators borrowed from the controller for the duration of one call.
pub(crate) struct Env<'a, D> {
    pub config: &'a ZoomConfig<D>,
    pub scheduler: &'a mut dyn Scheduler,
    pub platform: &'a mut dyn Platform,
}

#[derive(Clone, Copy, Debug)]
enum TimerRole {
    WheelIdle(TargetId),
    TapWindow,
}

pub(crate) struct GestureArbiter<D> {
    pub targets: TargetTree<D>,
    pub listeners: Listeners<D>,
    timers: HashMap<TimerId, TimerRole>,
    /// Open while a second tap would count as a double tap.
    tap_window: Option<TimerId>,
    first_tap: Option<Point<Decimal>>,
}

impl<D> GestureArbiter<D> {
    pub fn new() -> Self {
        Self {
            targets: TargetTree::new(),
            listeners: Listeners::new(),
            timers: HashMap::new(),
            tap_window: None,
            first_tap: None,
        }
    }

    pub fn gesture(&self, id: TargetId) -> Option<&Gesture> {
        self.targets.get(id).and_then(|node| node.gesture.as_ref())
    }

    fn gesture_mut(&mut self, id: TargetId) -> Option<&mut Gesture> {
        self.targets.get_mut(id).and_then(|node| node.gesture.as_mut())
    }

    pub fn is_animating(&self) -> bool {
        self.targets.values().any(|node| node.transition.is_some())
    }

    // ------------------------------------------------------------------
    // Gesture lifecycle
    // ------------------------------------------------------------------

    /// Activate one channel, creating the gesture on first use.
    fn start(&mut self, id: TargetId, event: Option<InputEvent>, env: &mut Env<'_, D>) {
        let Some(node) = self.targets.get(id) else {
            return;
        };
        let extent = match node.gesture {
            Some(_) => None,
            None => Some(resolve_extent(node, 0, event.as_ref(), env.config)),
        };
        let Some(node) = self.targets.get_mut(id) else {
            return;
        };
        if node.transform.is_none() {
            node.transform = Some(Transform::identity());
        }
        let gesture = node
            .gesture
            .get_or_insert_with(|| Gesture::new(extent.unwrap_or_else(empty_extent)));
        gesture.record(event);
        gesture.active += 1;
        if gesture.active == 1 {
            log::debug!("Gesture started on {id}");
            self.emit(id, EventKind::Start);
        }
    }

    /// Store `transform` as the committed transform and notify `zoom`.
    fn commit(&mut self, id: TargetId, channel: Channel, transform: Transform) {
        if self.store(id, channel, transform) {
            self.emit(id, EventKind::Zoom);
        }
    }

    /// Store an in-progress touch frame and notify `zoom-suggest`.
    fn suggest(&mut self, id: TargetId, transform: Transform) {
        if self.store(id, Channel::Touch, transform) {
            self.emit(id, EventKind::ZoomSuggest);
        }
    }

    fn store(&mut self, id: TargetId, channel: Channel, transform: Transform) -> bool {
        let Some(node) = self.targets.get_mut(id) else {
            return false;
        };
        if let Some(gesture) = node.gesture.as_mut() {
            gesture.rebase_anchors(channel, &transform);
        }
        log::trace!("{id} {channel:?} commit {transform}");
        node.transform = Some(transform);
        true
    }

    /// Deactivate one channel; the last one out destroys the gesture.
    fn end(&mut self, id: TargetId, env: &mut Env<'_, D>) {
        let Some(node) = self.targets.get_mut(id) else {
            return;
        };
        let Some(gesture) = node.gesture.as_mut() else {
            return;
        };
        gesture.active = gesture.active.saturating_sub(1);
        if gesture.active > 0 {
            return;
        }
        let Some(gesture) = node.gesture.take() else {
            return;
        };
        if let Some(wheel) = &gesture.wheel {
            self.cancel_timer(wheel.idle_timer, env);
        }
        log::debug!("Gesture ended on {id}");
        self.emit_with(id, EventKind::End, gesture.source.as_ref());
    }

    fn emit(&self, id: TargetId, kind: EventKind) {
        let source = self.gesture(id).and_then(|gesture| gesture.source.as_ref());
        self.emit_with(id, kind, source);
    }

    fn emit_with(&self, id: TargetId, kind: EventKind, source: Option<&InputEvent>) {
        let Some(node) = self.targets.get(id) else {
            return;
        };
        let transform = node.current();
        self.listeners.emit(&ZoomEvent {
            kind,
            target: id,
            transform: &transform,
            source,
            datum: &node.datum,
        });
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    fn set_timer(&mut self, delay: Duration, role: TimerRole, env: &mut Env<'_, D>) -> TimerId {
        let timer = env.scheduler.set_timeout(delay);
        self.timers.insert(timer, role);
        timer
    }

    fn cancel_timer(&mut self, timer: TimerId, env: &mut Env<'_, D>) {
        self.timers.remove(&timer);
        env.scheduler.clear_timeout(timer);
    }

    /// Fire due timers and advance running transitions by one frame.
    pub fn tick(&mut self, env: &mut Env<'_, D>) {
        for timer in env.scheduler.take_due() {
            match self.timers.remove(&timer) {
                Some(TimerRole::WheelIdle(id)) => self.wheel_idle(id, timer, env),
                Some(TimerRole::TapWindow) => {
                    if self.tap_window == Some(timer) {
                        self.tap_window = None;
                    }
                }
                None => {}
            }
        }

        let now = env.scheduler.now();
        let running: Vec<TargetId> = self
            .targets
            .values()
            .filter(|node| node.transition.is_some())
            .map(|node| node.id)
            .collect();
        for id in running {
            let Some((transform, done)) = self
                .targets
                .get(id)
                .and_then(|node| node.transition.as_ref())
                .map(|transition| transition.frame(now))
            else {
                continue;
            };
            self.commit(id, Channel::Transition, transform);
            if done {
                if let Some(node) = self.targets.get_mut(id) {
                    node.transition = None;
                }
                log::debug!("Transition finished on {id}");
                self.end(id, env);
            }
        }
    }

    // ------------------------------------------------------------------
    // Transitions and direct application
    // ------------------------------------------------------------------

    /// Cancel a running transition, ending its channel.
    fn interrupt_transition(&mut self, id: TargetId, env: &mut Env<'_, D>) {
        let interrupted = self
            .targets
            .get_mut(id)
            .and_then(|node| node.transition.take())
            .is_some();
        if interrupted {
            log::debug!("Transition interrupted on {id}");
            self.end(id, env);
        }
    }

    /// Set `transform` immediately as a one-frame gesture.
    pub fn apply(
        &mut self,
        id: TargetId,
        transform: Transform,
        event: Option<InputEvent>,
        env: &mut Env<'_, D>,
    ) {
        self.interrupt_transition(id, env);
        self.start(id, event, env);
        self.commit(id, Channel::Direct, transform);
        self.end(id, env);
    }

    /// Animate towards `end` over `duration`, keeping `anchor` (default:
    /// the extent's centre) fixed on screen along the path.
    #[allow(clippy::too_many_arguments)]
    pub fn schedule(
        &mut self,
        id: TargetId,
        end: Transform,
        anchor: Option<Point<Decimal>>,
        duration: Duration,
        event: Option<InputEvent>,
        index: usize,
        env: &mut Env<'_, D>,
    ) {
        self.interrupt_transition(id, env);
        let Some(node) = self.targets.get(id) else {
            return;
        };
        let start = node.current();
        let extent = resolve_extent(node, index, event.as_ref(), env.config);
        let anchor = anchor.unwrap_or_else(|| extent.centroid());
        let config = env.config;
        let tween = TransformTween::new(
            &start,
            end,
            anchor,
            extent.major_dimension(),
            |from, to| (config.interpolate)(from, to),
        );

        self.start(id, event, env);
        let now = env.scheduler.now();
        if let Some(node) = self.targets.get_mut(id) {
            node.transition = Some(Transition::new(tween, now, duration));
            log::debug!("Transition scheduled on {id} over {duration:?}");
        }
    }

    /// Cancel the transition and every channel, emitting a single `end`.
    pub fn interrupt(&mut self, id: TargetId, env: &mut Env<'_, D>) {
        let Some(node) = self.targets.get_mut(id) else {
            return;
        };
        node.transition = None;
        let Some(gesture) = node.gesture.take() else {
            return;
        };
        if let Some(wheel) = &gesture.wheel {
            self.cancel_timer(wheel.idle_timer, env);
        }
        if let Some(drag) = &gesture.drag {
            env.platform.enable_drag(id, drag.moved);
        }
        log::debug!("Gesture interrupted on {id}");
        self.emit_with(id, EventKind::End, gesture.source.as_ref());
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn attached(&self, id: TargetId) -> Option<&TargetNode<D>> {
        self.targets.get(id).filter(|node| node.attached)
    }

    fn accepts(&self, id: TargetId, event: &InputEvent, config: &ZoomConfig<D>) -> bool {
        let Some(node) = self.attached(id) else {
            return false;
        };
        let transform = node.current();
        config
            .filter
            .resolve(&node.context(&transform, 0, Some(event)))
    }

    pub fn wheel(&mut self, id: TargetId, input: WheelInput, env: &mut Env<'_, D>) {
        let event = InputEvent::Wheel(input.clone());
        if !self.accepts(id, &event, env.config) {
            return;
        }
        let Some(point) = local_point(env.platform, id, input.client) else {
            return;
        };
        let Some(node) = self.targets.get(id) else {
            return;
        };
        let transform = node.current();
        let delta = env
            .config
            .wheel_delta
            .resolve(&node.context(&transform, 0, Some(&event)));
        let requested = match Decimal::from_f64(2f64.powf(delta)) {
            Ok(factor) => factor,
            Err(err) => {
                log::warn!("Ignoring wheel on {id}: {err}");
                return;
            }
        };
        let k = env
            .config
            .scale_extent
            .clamp_lower(&(transform.k() * &requested));
        let live = node
            .gesture
            .as_ref()
            .and_then(|gesture| gesture.wheel.as_ref())
            .map(|wheel| wheel.idle_timer);

        match live {
            // more ticks of the same scroll: follow the pointer, restart the idle timer
            Some(timer) => self.cancel_timer(timer, env),
            None if k == *transform.k() => return,
            None => {
                self.interrupt_transition(id, env);
                self.start(id, Some(event.clone()), env);
            }
        }

        let idle_timer = self.set_timer(env.config.wheel_delay, TimerRole::WheelIdle(id), env);
        let Some(gesture) = self.gesture_mut(id) else {
            return;
        };
        gesture.record(Some(event));
        let anchor = Anchor::capture(&transform, point);
        let scaled = transform.with_scale(k);
        let factor = damped_scale_factor(transform.k(), scaled.k(), &requested);
        let candidate = scaled.pin_offset(&anchor.point, &anchor.offset, &factor);
        let result = env.config.constrain(&candidate, &gesture.extent);
        gesture.wheel = Some(WheelChannel { anchor, idle_timer });
        self.commit(id, Channel::Wheel, result);
    }

    fn wheel_idle(&mut self, id: TargetId, timer: TimerId, env: &mut Env<'_, D>) {
        let Some(gesture) = self.gesture_mut(id) else {
            return;
        };
        if gesture.wheel.as_ref().map(|wheel| wheel.idle_timer) != Some(timer) {
            return;
        }
        gesture.wheel = None;
        log::debug!("Wheel idle on {id}");
        self.end(id, env);
    }

    pub fn pointer_down(&mut self, id: TargetId, input: PointerInput, env: &mut Env<'_, D>) {
        let event = InputEvent::PointerDown(input.clone());
        if !self.accepts(id, &event, env.config) {
            return;
        }
        let Some(point) = local_point(env.platform, id, input.client) else {
            return;
        };
        // a press without a release in between replaces the stale drag
        if self.gesture(id).is_some_and(|gesture| gesture.drag.is_some()) {
            self.release_drag(id, env);
        }

        let transform = self.targets.get(id).map(TargetNode::current).unwrap_or_default();
        self.interrupt_transition(id, env);
        self.start(id, Some(event), env);
        if let Some(gesture) = self.gesture_mut(id) {
            gesture.drag = Some(DragChannel {
                anchor: Anchor::capture(&transform, point),
                origin: input.client,
                moved: false,
            });
        }
        env.platform.disable_drag(id);
    }

    pub fn pointer_move(&mut self, id: TargetId, input: PointerInput, env: &mut Env<'_, D>) {
        let event = InputEvent::PointerMove(input.clone());
        if self.gesture(id).and_then(|gesture| gesture.drag.as_ref()).is_none() {
            return;
        }
        let Some(point) = local_point(env.platform, id, input.client) else {
            return;
        };
        let click_distance2 = env.config.click_distance * env.config.click_distance;
        let Some(node) = self.targets.get_mut(id) else {
            return;
        };
        let transform = node.current();
        let Some(gesture) = node.gesture.as_mut() else {
            return;
        };
        let Some(drag) = gesture.drag.as_mut() else {
            return;
        };

        if !drag.moved {
            let dx = input.client.0 - drag.origin.0;
            let dy = input.client.1 - drag.origin.1;
            drag.moved = dx * dx + dy * dy > click_distance2;
        }
        let candidate = transform.pin_offset(&point, &drag.anchor.offset, &Decimal::one());
        drag.anchor.point = point;
        gesture.record(Some(event));
        let result = env.config.constrain(&candidate, &gesture.extent);
        self.commit(id, Channel::Drag, result);
    }

    /// End the drag; returns whether the pointer moved past the click
    /// distance.
    pub fn pointer_up(&mut self, id: TargetId, input: PointerInput, env: &mut Env<'_, D>) -> bool {
        let Some(gesture) = self.gesture_mut(id) else {
            return false;
        };
        let Some(drag) = gesture.drag.take() else {
            return false;
        };
        gesture.record(Some(InputEvent::PointerUp(input)));
        env.platform.enable_drag(id, drag.moved);
        self.end(id, env);
        drag.moved
    }

    fn release_drag(&mut self, id: TargetId, env: &mut Env<'_, D>) {
        if let Some(drag) = self.gesture_mut(id).and_then(|gesture| gesture.drag.take()) {
            env.platform.enable_drag(id, drag.moved);
            self.end(id, env);
        }
    }

    pub fn double_click(&mut self, id: TargetId, input: PointerInput, env: &mut Env<'_, D>) {
        let event = InputEvent::DoubleClick(input.clone());
        if !self.accepts(id, &event, env.config) {
            return;
        }
        let Some(point) = local_point(env.platform, id, input.client) else {
            return;
        };
        self.zoom_at(id, point, input.modifiers.shift, event, env);
    }

    /// Double the scale about `point` (halve it with `shift`).
    fn zoom_at(
        &mut self,
        id: TargetId,
        point: Point<Decimal>,
        shift: bool,
        event: InputEvent,
        env: &mut Env<'_, D>,
    ) {
        let Some(node) = self.targets.get(id) else {
            return;
        };
        let t0 = node.current();
        if !t0.is_invertible() {
            return;
        }
        let extent = resolve_extent(node, 0, Some(&event), env.config);
        let factor = if shift {
            Decimal::one().half()
        } else {
            Decimal::from(2)
        };
        let k1 = env.config.scale_extent.clamp(&(t0.k() * &factor));
        let world = t0.invert(&point);
        let t1 = env.config.constrain(&t0.with_scale(k1).pin(&point, &world), &extent);

        let duration = env.config.duration;
        if duration.is_zero() {
            self.apply(id, t1, Some(event), env);
        } else {
            self.schedule(id, t1, Some(point), duration, Some(event), 0, env);
        }
    }

    pub fn touch_start(&mut self, id: TargetId, input: TouchInput, env: &mut Env<'_, D>) {
        let event = InputEvent::TouchStart(input.clone());
        if !self.accepts(id, &event, env.config) {
            return;
        }
        let Some(node) = self.targets.get(id) else {
            return;
        };
        let transform = node.current();
        if !env
            .config
            .touchable
            .resolve(&node.context(&transform, 0, Some(&event)))
        {
            return;
        }
        let (mut touch0, mut touch1, mut taps) = match &node.gesture {
            Some(gesture) => (gesture.touch0.clone(), gesture.touch1.clone(), gesture.taps),
            None => (None, None, 0),
        };

        let window_open = self.tap_window.is_some();
        let mut started = false;
        let mut last_point = None;
        for touch in &input.touches {
            let Some(point) = local_point(env.platform, id, touch.client) else {
                continue;
            };
            let joins_as_second = touch1.is_none()
                && touch0
                    .as_ref()
                    .is_some_and(|first| first.identifier != touch.identifier);
            if touch0.is_none() {
                touch0 = Some(TouchSlot::new(touch.identifier, point.clone(), transform.clone()));
                started = true;
                taps = 1 + u32::from(window_open);
            } else if joins_as_second {
                touch1 = Some(TouchSlot::new(touch.identifier, point.clone(), transform.clone()));
                taps = 0;
            }
            last_point = Some(point);
        }

        if let Some(timer) = self.tap_window.take() {
            self.cancel_timer(timer, env);
        }
        if started {
            if taps < 2 {
                if let Some(point) = last_point {
                    self.first_tap = Some(point);
                    let timer = self.set_timer(env.config.touch_delay, TimerRole::TapWindow, env);
                    self.tap_window = Some(timer);
                }
            }
            self.interrupt_transition(id, env);
            self.start(id, Some(event.clone()), env);
        }
        if let Some(gesture) = self.gesture_mut(id) {
            gesture.touch0 = touch0;
            gesture.touch1 = touch1;
            gesture.taps = taps;
            gesture.record(Some(event));
        }
    }

    pub fn touch_move(&mut self, id: TargetId, input: TouchInput, env: &mut Env<'_, D>) {
        if self.gesture(id).and_then(|gesture| gesture.touch0.as_ref()).is_none() {
            return;
        }
        let platform: &dyn Platform = &*env.platform;
        let moved: Vec<(u64, Point<Decimal>)> = input
            .changed
            .iter()
            .filter_map(|touch| {
                local_point(platform, id, touch.client).map(|point| (touch.identifier, point))
            })
            .collect();
        let Some(node) = self.targets.get_mut(id) else {
            return;
        };
        let transform = node.current();
        let Some(gesture) = node.gesture.as_mut() else {
            return;
        };
        for (identifier, point) in moved {
            if let Some(slot) = gesture.touch_mut(identifier) {
                slot.point = point;
            }
        }

        let (scaled, point, offset, factor) = match (&gesture.touch0, &gesture.touch1) {
            (Some(first), Some(second)) => {
                let spread = first.point.distance_squared(&second.point);
                let initial = first.origin.distance_squared(&second.origin);
                let requested = if initial.is_zero() {
                    Decimal::one()
                } else {
                    (spread / initial).sqrt()
                };
                let k0 = first.start.k();
                let k = env.config.scale_extent.clamp_lower(&(k0 * &requested));
                let scaled = transform.with_scale(k);
                if !scaled.is_invertible() {
                    return;
                }
                let factor = damped_scale_factor(k0, scaled.k(), &requested);
                let point = first.point.midpoint(&second.point);
                let offset = first
                    .origin
                    .midpoint(&second.origin)
                    .sub(&first.start.offset());
                (scaled, point, offset, factor)
            }
            (Some(first), None) => (
                transform,
                first.point.clone(),
                first.origin_offset(),
                Decimal::one(),
            ),
            _ => return,
        };

        let candidate = scaled.pin_offset(&point, &offset, &factor);
        let result = env.config.constrain(&candidate, &gesture.extent);
        gesture.suggested = Some(result.clone());
        gesture.record(Some(InputEvent::TouchMove(input)));
        self.suggest(id, result);
    }

    /// Touch end or cancel. Ends the touch channel when one of the tracked
    /// touches lifted; untracked identifiers are ignored.
    pub fn touch_end(&mut self, id: TargetId, input: TouchInput, env: &mut Env<'_, D>) {
        let Some(gesture) = self.gesture(id) else {
            return;
        };
        let Some(lifted) = input
            .changed
            .iter()
            .find(|touch| gesture.tracks_touch(touch.identifier))
            .copied()
        else {
            return;
        };
        let event = InputEvent::TouchEnd(input.clone());
        let tap_point = local_point(env.platform, id, lifted.client);

        let Some(gesture) = self.gesture_mut(id) else {
            return;
        };
        let taps = gesture.taps;
        let suggested = gesture.suggested.take();
        gesture.touch0 = None;
        gesture.touch1 = None;
        gesture.record(Some(event.clone()));
        if let Some(transform) = suggested {
            self.commit(id, Channel::Touch, transform);
        }
        self.end(id, env);

        if taps == 2 {
            if let (Some(point), Some(first)) = (tap_point, self.first_tap.clone()) {
                let distance = point.distance_squared(&first).to_f64().sqrt();
                if distance < env.config.tap_distance {
                    log::debug!("Double tap on {id}");
                    self.zoom_at(id, point, input.modifiers.shift, event, env);
                }
            }
        }
    }
}

fn resolve_extent<D>(
    node: &TargetNode<D>,
    index: usize,
    event: Option<&InputEvent>,
    config: &ZoomConfig<D>,
) -> Extent {
    let transform = node.current();
    config.extent.resolve(&node.context(&transform, index, event))
}

/// Target-local decimal position of a client point; non-finite input is
/// rejected.
fn local_point(platform: &dyn Platform, id: TargetId, client: (f64, f64)) -> Option<Point<Decimal>> {
    let (x, y) = platform.local_point(id, client);
    match Point::from_f64(x, y) {
        Ok(point) => Some(point),
        Err(err) => {
            log::warn!("Ignoring input on {id}: {err}");
            None
        }
    }
}

fn empty_extent() -> Extent {
    Extent::new(Point::origin(), Point::origin())
}
