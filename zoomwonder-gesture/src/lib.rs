//! Gesture handling for exact-decimal pan and zoom.
//!
//! [`ZoomController`] turns wheel, pointer-drag, double-click and touch
//! input into committed [`Transform`]s per target, notifying listeners of
//! `start`, `zoom`, `zoom-suggest` and `end`.

mod arbiter;
pub mod config;
mod controller;
pub mod error;
pub mod events;
mod gesture;
pub mod input;
mod platform;
mod scheduler;
mod target;
mod transition;

pub use config::{
    default_extent, default_filter, default_touchable, default_wheel_delta, ConstrainFn,
    InterpolateFn, Setting, ZoomConfig, ZoomSettings,
};
pub use controller::{AnimatedZoom, ZoomController};
pub use error::ZoomError;
pub use events::{EventKind, Listener, Listeners, ZoomEvent};
pub use gesture::{damped_scale_factor, DAMPING_THRESHOLD};
pub use input::{
    DeltaMode, InputEvent, Modifiers, PointerInput, TouchInput, TouchPoint, WheelInput,
};
pub use platform::{Headless, Platform};
pub use scheduler::{ManualScheduler, Scheduler, SystemScheduler, TimerId};
pub use target::{TargetContext, TargetGeometry, TargetId, TargetSpec};
pub use transition::ease_cubic_in_out;

pub use zoomwonder_core::{
    Bound, Decimal, Extent, Point, Rect, ScaleExtent, Transform, TranslateExtent,
};
