//! Zoom behaviour configuration.
//!
//! [`ZoomConfig`] is the live configuration, including callbacks.
//! [`ZoomSettings`] is its data-only subset, persisted as JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use zoomwonder_core::{
    constrain, interpolate_zoom, Extent, ScaleExtent, Transform, TranslateExtent, ViewPath,
    ZoomView,
};

use crate::error::ZoomError;
use crate::input::{DeltaMode, InputEvent};
use crate::target::TargetContext;

/// A configuration value that is either fixed or computed per target.
pub enum Setting<T, D> {
    Constant(T),
    Callback(Rc<dyn Fn(&TargetContext<'_, D>) -> T>),
}

impl<T: Clone, D> Setting<T, D> {
    pub fn callback(f: impl Fn(&TargetContext<'_, D>) -> T + 'static) -> Self {
        Setting::Callback(Rc::new(f))
    }

    pub fn resolve(&self, context: &TargetContext<'_, D>) -> T {
        match self {
            Setting::Constant(value) => value.clone(),
            Setting::Callback(f) => f(context),
        }
    }
}

impl<T, D> From<T> for Setting<T, D> {
    fn from(value: T) -> Self {
        Setting::Constant(value)
    }
}

impl<T: Clone, D> Clone for Setting<T, D> {
    fn clone(&self) -> Self {
        match self {
            Setting::Constant(value) => Setting::Constant(value.clone()),
            Setting::Callback(f) => Setting::Callback(Rc::clone(f)),
        }
    }
}

impl<T: fmt::Debug, D> fmt::Debug for Setting<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Setting::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// `(candidate, viewport extent, translate extent) -> constrained transform`
pub type ConstrainFn = Rc<dyn Fn(&Transform, &Extent, &TranslateExtent) -> Transform>;

/// Builds the view path used by animated transitions.
pub type InterpolateFn = Rc<dyn Fn(&ZoomView, &ZoomView) -> Box<dyn ViewPath>>;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(250);
pub const DEFAULT_WHEEL_DELAY: Duration = Duration::from_millis(150);
pub const DEFAULT_TOUCH_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_TAP_DISTANCE: f64 = 10.0;

/// Ignore ctrl-modified input except wheel (ctrl+wheel is a trackpad
/// pinch) and any non-primary button.
pub fn default_filter<D>(context: &TargetContext<'_, D>) -> bool {
    match context.event {
        Some(event) => (!event.modifiers().ctrl || event.is_wheel()) && event.button() == 0,
        None => true,
    }
}

pub fn default_touchable<D>(context: &TargetContext<'_, D>) -> bool {
    context.touch_points > 0
}

pub fn default_extent<D>(context: &TargetContext<'_, D>) -> Extent {
    context.geometry.default_extent()
}

/// `-deltaY` attenuated by delta mode (pixel 0.002, line 0.05, page 1),
/// amplified tenfold with ctrl held.
pub fn default_wheel_delta<D>(context: &TargetContext<'_, D>) -> f64 {
    let Some(InputEvent::Wheel(wheel)) = context.event else {
        return 0.0;
    };
    let unit = match wheel.delta_mode {
        DeltaMode::Line => 0.05,
        DeltaMode::Page => 1.0,
        DeltaMode::Pixel => 0.002,
    };
    let pinch = if wheel.modifiers.ctrl { 10.0 } else { 1.0 };
    -wheel.delta_y * unit * pinch
}

pub struct ZoomConfig<D> {
    pub filter: Setting<bool, D>,
    pub touchable: Setting<bool, D>,
    pub extent: Setting<Extent, D>,
    pub constrain: ConstrainFn,
    pub wheel_delta: Setting<f64, D>,
    pub interpolate: InterpolateFn,
    pub scale_extent: ScaleExtent,
    pub translate_extent: TranslateExtent,
    pub duration: Duration,
    pub wheel_delay: Duration,
    pub touch_delay: Duration,
    /// Pointer travel, in client pixels, beyond which a press becomes a drag.
    pub click_distance: f64,
    /// Maximum distance between the two taps of a double tap.
    pub tap_distance: f64,
}

impl<D: 'static> ZoomConfig<D> {
    pub fn from_settings(settings: &ZoomSettings) -> Self {
        Self {
            scale_extent: settings.scale_extent.clone(),
            translate_extent: settings.translate_extent.clone(),
            duration: Duration::from_millis(settings.duration_ms),
            wheel_delay: Duration::from_millis(settings.wheel_delay_ms),
            touch_delay: Duration::from_millis(settings.touch_delay_ms),
            click_distance: settings.click_distance,
            tap_distance: settings.tap_distance,
            ..Self::default()
        }
    }
}

impl<D> ZoomConfig<D> {
    pub fn settings(&self) -> ZoomSettings {
        ZoomSettings {
            scale_extent: self.scale_extent.clone(),
            translate_extent: self.translate_extent.clone(),
            duration_ms: millis(self.duration),
            wheel_delay_ms: millis(self.wheel_delay),
            touch_delay_ms: millis(self.touch_delay),
            click_distance: self.click_distance,
            tap_distance: self.tap_distance,
        }
    }

    pub(crate) fn constrain(&self, transform: &Transform, extent: &Extent) -> Transform {
        (self.constrain)(transform, extent, &self.translate_extent)
    }
}

impl<D: 'static> Default for ZoomConfig<D> {
    fn default() -> Self {
        Self {
            filter: Setting::callback(default_filter),
            touchable: Setting::callback(default_touchable),
            extent: Setting::callback(default_extent),
            constrain: Rc::new(constrain),
            wheel_delta: Setting::callback(default_wheel_delta),
            interpolate: Rc::new(interpolate_zoom),
            scale_extent: ScaleExtent::default(),
            translate_extent: TranslateExtent::default(),
            duration: DEFAULT_DURATION,
            wheel_delay: DEFAULT_WHEEL_DELAY,
            touch_delay: DEFAULT_TOUCH_DELAY,
            click_distance: 0.0,
            tap_distance: DEFAULT_TAP_DISTANCE,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Persistable zoom settings. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub scale_extent: ScaleExtent,
    pub translate_extent: TranslateExtent,
    pub duration_ms: u64,
    pub wheel_delay_ms: u64,
    pub touch_delay_ms: u64,
    pub click_distance: f64,
    pub tap_distance: f64,
}

impl ZoomSettings {
    pub fn from_json(json: &str) -> Result<Self, ZoomError> {
        let settings = serde_json::from_str(json)?;
        log::debug!("Loaded zoom settings");
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ZoomError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            scale_extent: ScaleExtent::default(),
            translate_extent: TranslateExtent::default(),
            duration_ms: millis(DEFAULT_DURATION),
            wheel_delay_ms: millis(DEFAULT_WHEEL_DELAY),
            touch_delay_ms: millis(DEFAULT_TOUCH_DELAY),
            click_distance: 0.0,
            tap_distance: DEFAULT_TAP_DISTANCE,
        }
    }
}
