//! Public entry point: target registry, input dispatch, programmatic
//! transforms and configuration accessors.

use std::rc::Rc;
use std::time::Duration;

use zoomwonder_core::{
    Decimal, Extent, Point, ScaleExtent, Transform, TranslateExtent, ViewPath, ZoomView,
};

use crate::arbiter::{Env, GestureArbiter};
use crate::config::{ConstrainFn, InterpolateFn, Setting, ZoomConfig, ZoomSettings};
use crate::error::ZoomError;
use crate::events::Listener;
use crate::input::{InputEvent, PointerInput, TouchInput, WheelInput};
use crate::platform::{Headless, Platform};
use crate::scheduler::{Scheduler, SystemScheduler};
use crate::target::{TargetContext, TargetId, TargetSpec};

#[derive(Clone, Copy, Debug)]
enum Timing {
    Immediate,
    Animated(Duration),
}

/// Pan and zoom behaviour over a set of registered targets.
///
/// `D` is the user data bound to each target and handed to listeners and
/// configuration callbacks. `S` drives timers and transitions; tests use
/// [`ManualScheduler`](crate::ManualScheduler).
pub struct ZoomController<D, S = SystemScheduler> {
    arbiter: GestureArbiter<D>,
    config: ZoomConfig<D>,
    scheduler: S,
    platform: Box<dyn Platform>,
}

impl<D: 'static, S: Scheduler> ZoomController<D, S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_config(ZoomConfig::default(), scheduler)
    }

    pub fn with_config(config: ZoomConfig<D>, scheduler: S) -> Self {
        Self {
            arbiter: GestureArbiter::new(),
            config,
            scheduler,
            platform: Box::new(Headless),
        }
    }

    pub fn with_platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Box::new(platform);
        self
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn config(&self) -> &ZoomConfig<D> {
        &self.config
    }

    pub fn settings(&self) -> ZoomSettings {
        self.config.settings()
    }

    /// Replace the data-only part of the configuration; callbacks are kept.
    pub fn apply_settings(&mut self, settings: &ZoomSettings) -> &mut Self {
        let ZoomSettings {
            scale_extent,
            translate_extent,
            duration_ms,
            wheel_delay_ms,
            touch_delay_ms,
            click_distance,
            tap_distance,
        } = settings.clone();
        self.config.scale_extent = scale_extent;
        self.config.translate_extent = translate_extent;
        self.config.duration = Duration::from_millis(duration_ms);
        self.config.wheel_delay = Duration::from_millis(wheel_delay_ms);
        self.config.touch_delay = Duration::from_millis(touch_delay_ms);
        self.config.click_distance = click_distance;
        self.config.tap_distance = tap_distance;
        self
    }

    fn split(&mut self) -> (&mut GestureArbiter<D>, Env<'_, D>) {
        (
            &mut self.arbiter,
            Env {
                config: &self.config,
                scheduler: &mut self.scheduler,
                platform: self.platform.as_mut(),
            },
        )
    }

    // ------------------------------------------------------------------
    // Targets
    // ------------------------------------------------------------------

    pub fn register(&mut self, spec: TargetSpec<D>) -> Result<TargetId, ZoomError> {
        self.arbiter.targets.insert(spec)
    }

    /// Bind input handling to `targets`, initialising unset transforms to
    /// identity. Fails without attaching anything if an id is unknown.
    pub fn attach(&mut self, targets: &[TargetId]) -> Result<(), ZoomError> {
        for &id in targets {
            self.arbiter.targets.require(id)?;
        }
        for &id in targets {
            if let Some(node) = self.arbiter.targets.get_mut(id) {
                node.attached = true;
                node.transform.get_or_insert_with(Transform::identity);
                log::debug!("Attached zoom behaviour to {id}");
            }
        }
        Ok(())
    }

    /// Stop handling input on `target`, interrupting whatever is active.
    /// The committed transform is kept.
    pub fn detach(&mut self, target: TargetId) -> Result<(), ZoomError> {
        self.arbiter.targets.require(target)?;
        self.interrupt(target);
        if let Some(node) = self.arbiter.targets.get_mut(target) {
            node.attached = false;
        }
        Ok(())
    }

    pub fn datum(&self, target: TargetId) -> Option<&D> {
        self.arbiter.targets.get(target).map(|node| &node.datum)
    }

    /// Own transform, else the nearest ancestor's, else identity.
    pub fn transform_of(&self, target: TargetId) -> Transform {
        self.arbiter
            .targets
            .inherited_transform(target)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_zooming(&self, target: TargetId) -> bool {
        self.arbiter.gesture(target).is_some()
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn wheel(&mut self, target: TargetId, input: WheelInput) {
        let (arbiter, mut env) = self.split();
        arbiter.wheel(target, input, &mut env);
    }

    pub fn pointer_down(&mut self, target: TargetId, input: PointerInput) {
        let (arbiter, mut env) = self.split();
        arbiter.pointer_down(target, input, &mut env);
    }

    pub fn pointer_move(&mut self, target: TargetId, input: PointerInput) {
        let (arbiter, mut env) = self.split();
        arbiter.pointer_move(target, input, &mut env);
    }

    /// Returns true when the press turned into a drag, in which case the
    /// host should not treat the release as a click.
    pub fn pointer_up(&mut self, target: TargetId, input: PointerInput) -> bool {
        let (arbiter, mut env) = self.split();
        arbiter.pointer_up(target, input, &mut env)
    }

    pub fn double_click(&mut self, target: TargetId, input: PointerInput) {
        let (arbiter, mut env) = self.split();
        arbiter.double_click(target, input, &mut env);
    }

    pub fn touch_start(&mut self, target: TargetId, input: TouchInput) {
        let (arbiter, mut env) = self.split();
        arbiter.touch_start(target, input, &mut env);
    }

    pub fn touch_move(&mut self, target: TargetId, input: TouchInput) {
        let (arbiter, mut env) = self.split();
        arbiter.touch_move(target, input, &mut env);
    }

    /// Handles both touch end and touch cancel.
    pub fn touch_end(&mut self, target: TargetId, input: TouchInput) {
        let (arbiter, mut env) = self.split();
        arbiter.touch_end(target, input, &mut env);
    }

    /// Fire due timers and advance transitions. Call on every animation
    /// frame while [`is_animating`](Self::is_animating), and whenever a
    /// timer may have expired.
    pub fn tick(&mut self) {
        let (arbiter, mut env) = self.split();
        arbiter.tick(&mut env);
    }

    pub fn is_animating(&self) -> bool {
        self.arbiter.is_animating()
    }

    /// End the target's gesture and transition immediately with a single
    /// `end` notification.
    pub fn interrupt(&mut self, target: TargetId) {
        let (arbiter, mut env) = self.split();
        arbiter.interrupt(target, &mut env);
    }

    // ------------------------------------------------------------------
    // Programmatic transforms
    // ------------------------------------------------------------------

    pub fn set_transform(
        &mut self,
        targets: &[TargetId],
        transform: impl Into<Setting<Transform, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        self.transform_with(targets, transform.into(), anchor, event, Timing::Immediate)
    }

    pub fn scale_by(
        &mut self,
        targets: &[TargetId],
        k: impl Into<Setting<Decimal, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        self.scale_by_with(targets, k.into(), anchor, event, Timing::Immediate)
    }

    pub fn scale_to(
        &mut self,
        targets: &[TargetId],
        k: impl Into<Setting<Decimal, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        self.scale_to_with(targets, k.into(), anchor, event, Timing::Immediate)
    }

    pub fn translate_by(
        &mut self,
        targets: &[TargetId],
        x: impl Into<Setting<Decimal, D>>,
        y: impl Into<Setting<Decimal, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        self.translate_by_with(targets, x.into(), y.into(), event, Timing::Immediate)
    }

    pub fn translate_to(
        &mut self,
        targets: &[TargetId],
        x: impl Into<Setting<Decimal, D>>,
        y: impl Into<Setting<Decimal, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        self.translate_to_with(targets, x.into(), y.into(), anchor, event, Timing::Immediate)
    }

    /// The same operations as transitions over `duration`.
    pub fn animated(&mut self, duration: Duration) -> AnimatedZoom<'_, D, S> {
        AnimatedZoom {
            controller: self,
            duration,
        }
    }

    fn transform_with(
        &mut self,
        targets: &[TargetId],
        transform: Setting<Transform, D>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
        timing: Timing,
    ) -> Result<(), ZoomError> {
        self.each_target(targets, anchor.as_ref(), event, timing, |context, _, _| {
            Some(transform.resolve(context))
        })
    }

    fn scale_by_with(
        &mut self,
        targets: &[TargetId],
        k: Setting<Decimal, D>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
        timing: Timing,
    ) -> Result<(), ZoomError> {
        let target_k = Setting::callback(move |context: &TargetContext<'_, D>| {
            context.transform.k() * k.resolve(context)
        });
        self.scale_to_with(targets, target_k, anchor, event, timing)
    }

    fn scale_to_with(
        &mut self,
        targets: &[TargetId],
        k: Setting<Decimal, D>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
        timing: Timing,
    ) -> Result<(), ZoomError> {
        self.each_target(targets, anchor.as_ref(), event, timing, |context, config, anchor| {
            let t0 = context.transform;
            if !t0.is_invertible() {
                return None;
            }
            let extent = config.extent.resolve(context);
            let p0 = anchor.cloned().unwrap_or_else(|| extent.centroid());
            let p1 = t0.invert(&p0);
            let scaled = t0.with_scale(config.scale_extent.clamp(&k.resolve(context)));
            if !scaled.is_invertible() {
                return None;
            }
            Some(config.constrain(&scaled.pin(&p0, &p1), &extent))
        })
    }

    fn translate_by_with(
        &mut self,
        targets: &[TargetId],
        x: Setting<Decimal, D>,
        y: Setting<Decimal, D>,
        event: Option<InputEvent>,
        timing: Timing,
    ) -> Result<(), ZoomError> {
        self.each_target(targets, None, event, timing, |context, config, _| {
            let extent = config.extent.resolve(context);
            let moved = context
                .transform
                .translate(&x.resolve(context), &y.resolve(context));
            Some(config.constrain(&moved, &extent))
        })
    }

    fn translate_to_with(
        &mut self,
        targets: &[TargetId],
        x: Setting<Decimal, D>,
        y: Setting<Decimal, D>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
        timing: Timing,
    ) -> Result<(), ZoomError> {
        self.each_target(targets, anchor.as_ref(), event, timing, |context, config, anchor| {
            let extent = config.extent.resolve(context);
            let p0 = anchor.cloned().unwrap_or_else(|| extent.centroid());
            let centred = Transform::identity()
                .translate(p0.x(), p0.y())
                .scale(context.transform.k())
                .translate(&-x.resolve(context), &-y.resolve(context));
            Some(config.constrain(&centred, &extent))
        })
    }

    /// Interrupt each target and apply (or schedule) the transform computed
    /// for it. Targets for which `compute` yields nothing are skipped.
    fn each_target(
        &mut self,
        targets: &[TargetId],
        anchor: Option<&Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
        timing: Timing,
        compute: impl Fn(&TargetContext<'_, D>, &ZoomConfig<D>, Option<&Point<Decimal>>) -> Option<Transform>,
    ) -> Result<(), ZoomError> {
        for &id in targets {
            self.arbiter.targets.require(id)?;
        }
        for (index, &id) in targets.iter().enumerate() {
            let node = self.arbiter.targets.require(id)?;
            let current = node.current();
            let context = node.context(&current, index, event.as_ref());
            let point = anchor.map(|anchor| anchor.resolve(&context));
            let Some(transform) = compute(&context, &self.config, point.as_ref()) else {
                log::warn!("Skipping {id}: transform would not be invertible");
                continue;
            };

            let (arbiter, mut env) = self.split();
            match timing {
                Timing::Immediate => arbiter.apply(id, transform, event.clone(), &mut env),
                Timing::Animated(duration) => arbiter.schedule(
                    id,
                    transform,
                    point,
                    duration,
                    event.clone(),
                    index,
                    &mut env,
                ),
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn scale_extent(&self) -> &ScaleExtent {
        &self.config.scale_extent
    }

    pub fn set_scale_extent(&mut self, scale_extent: ScaleExtent) -> &mut Self {
        self.config.scale_extent = scale_extent;
        self
    }

    pub fn translate_extent(&self) -> &TranslateExtent {
        &self.config.translate_extent
    }

    pub fn set_translate_extent(&mut self, translate_extent: TranslateExtent) -> &mut Self {
        self.config.translate_extent = translate_extent;
        self
    }

    pub fn extent(&self) -> &Setting<Extent, D> {
        &self.config.extent
    }

    pub fn set_extent(&mut self, extent: impl Into<Setting<Extent, D>>) -> &mut Self {
        self.config.extent = extent.into();
        self
    }

    pub fn constrain(&self) -> &ConstrainFn {
        &self.config.constrain
    }

    pub fn set_constrain(
        &mut self,
        constrain: impl Fn(&Transform, &Extent, &TranslateExtent) -> Transform + 'static,
    ) -> &mut Self {
        self.config.constrain = Rc::new(constrain);
        self
    }

    pub fn duration(&self) -> Duration {
        self.config.duration
    }

    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.config.duration = duration;
        self
    }

    pub fn interpolate(&self) -> &InterpolateFn {
        &self.config.interpolate
    }

    pub fn set_interpolate(
        &mut self,
        interpolate: impl Fn(&ZoomView, &ZoomView) -> Box<dyn ViewPath> + 'static,
    ) -> &mut Self {
        self.config.interpolate = Rc::new(interpolate);
        self
    }

    pub fn wheel_delta(&self) -> &Setting<f64, D> {
        &self.config.wheel_delta
    }

    pub fn set_wheel_delta(&mut self, wheel_delta: impl Into<Setting<f64, D>>) -> &mut Self {
        self.config.wheel_delta = wheel_delta.into();
        self
    }

    pub fn filter(&self) -> &Setting<bool, D> {
        &self.config.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<Setting<bool, D>>) -> &mut Self {
        self.config.filter = filter.into();
        self
    }

    pub fn touchable(&self) -> &Setting<bool, D> {
        &self.config.touchable
    }

    pub fn set_touchable(&mut self, touchable: impl Into<Setting<bool, D>>) -> &mut Self {
        self.config.touchable = touchable.into();
        self
    }

    pub fn click_distance(&self) -> f64 {
        self.config.click_distance
    }

    pub fn set_click_distance(&mut self, click_distance: f64) -> &mut Self {
        self.config.click_distance = click_distance;
        self
    }

    pub fn tap_distance(&self) -> f64 {
        self.config.tap_distance
    }

    pub fn set_tap_distance(&mut self, tap_distance: f64) -> &mut Self {
        self.config.tap_distance = tap_distance;
        self
    }

    pub fn wheel_delay(&self) -> Duration {
        self.config.wheel_delay
    }

    pub fn set_wheel_delay(&mut self, wheel_delay: Duration) -> &mut Self {
        self.config.wheel_delay = wheel_delay;
        self
    }

    pub fn touch_delay(&self) -> Duration {
        self.config.touch_delay
    }

    pub fn set_touch_delay(&mut self, touch_delay: Duration) -> &mut Self {
        self.config.touch_delay = touch_delay;
        self
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Register (`Some`) or remove (`None`) a listener for space-separated
    /// `type.name` typenames.
    pub fn on(
        &mut self,
        typenames: &str,
        listener: Option<Listener<D>>,
    ) -> Result<&mut Self, ZoomError> {
        self.arbiter.listeners.on(typenames, listener)?;
        Ok(self)
    }

    pub fn listener(&self, typename: &str) -> Result<Option<Listener<D>>, ZoomError> {
        self.arbiter.listeners.get(typename)
    }
}

impl<D: 'static> Default for ZoomController<D, SystemScheduler> {
    fn default() -> Self {
        Self::new(SystemScheduler::new())
    }
}

/// Programmatic operations run as transitions.
pub struct AnimatedZoom<'c, D, S> {
    controller: &'c mut ZoomController<D, S>,
    duration: Duration,
}

impl<D: 'static, S: Scheduler> AnimatedZoom<'_, D, S> {
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_transform(
        &mut self,
        targets: &[TargetId],
        transform: impl Into<Setting<Transform, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        let timing = Timing::Animated(self.duration);
        self.controller
            .transform_with(targets, transform.into(), anchor, event, timing)
    }

    pub fn scale_by(
        &mut self,
        targets: &[TargetId],
        k: impl Into<Setting<Decimal, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        let timing = Timing::Animated(self.duration);
        self.controller
            .scale_by_with(targets, k.into(), anchor, event, timing)
    }

    pub fn scale_to(
        &mut self,
        targets: &[TargetId],
        k: impl Into<Setting<Decimal, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        let timing = Timing::Animated(self.duration);
        self.controller
            .scale_to_with(targets, k.into(), anchor, event, timing)
    }

    pub fn translate_by(
        &mut self,
        targets: &[TargetId],
        x: impl Into<Setting<Decimal, D>>,
        y: impl Into<Setting<Decimal, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        let timing = Timing::Animated(self.duration);
        self.controller
            .translate_by_with(targets, x.into(), y.into(), event, timing)
    }

    pub fn translate_to(
        &mut self,
        targets: &[TargetId],
        x: impl Into<Setting<Decimal, D>>,
        y: impl Into<Setting<Decimal, D>>,
        anchor: Option<Setting<Point<Decimal>, D>>,
        event: Option<InputEvent>,
    ) -> Result<(), ZoomError> {
        let timing = Timing::Animated(self.duration);
        self.controller
            .translate_to_with(targets, x.into(), y.into(), anchor, event, timing)
    }
}
