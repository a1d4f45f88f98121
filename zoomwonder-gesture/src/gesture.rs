//! Per-target gesture session state.
//!
//! A [`Gesture`] exists while at least one input channel (wheel, pointer
//! drag, touch, transition) is active on a target. All channels of a target
//! share it and commit into the same transform.

use zoomwonder_core::{Decimal, Extent, Point, Transform};

use crate::input::InputEvent;
use crate::scheduler::TimerId;

/// Above this absolute scale the raw requested zoom factor is applied to
/// the anchor offset; below it the factor is the ratio actually achieved.
pub const DAMPING_THRESHOLD: i64 = 5;

/// Zoom factor to apply to a captured anchor offset.
///
/// `achieved` is the scale after clamping, `previous` the scale the factor
/// was requested against. While `achieved < 5` the achieved ratio is used,
/// so a clamped scale stops translating the view; from 5 up the requested
/// factor passes through unchanged.
pub fn damped_scale_factor(previous: &Decimal, achieved: &Decimal, requested: &Decimal) -> Decimal {
    if *achieved < Decimal::from(DAMPING_THRESHOLD) && !previous.is_zero() {
        achieved / previous
    } else {
        requested.clone()
    }
}

/// A screen point and its offset from the translation origin at capture
/// time.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Anchor {
    pub point: Point<Decimal>,
    pub offset: Point<Decimal>,
}

impl Anchor {
    pub fn capture(transform: &Transform, point: Point<Decimal>) -> Self {
        let offset = transform.translate_at_coordinate_space(&point);
        Self { point, offset }
    }

    /// Re-capture the offset under a transform committed by another channel.
    pub fn rebase(&mut self, transform: &Transform) {
        self.offset = transform.translate_at_coordinate_space(&self.point);
    }
}

#[derive(Debug)]
pub(crate) struct WheelChannel {
    pub anchor: Anchor,
    pub idle_timer: TimerId,
}

#[derive(Debug)]
pub(crate) struct DragChannel {
    pub anchor: Anchor,
    /// Client position of the press, for the click-distance test.
    pub origin: (f64, f64),
    pub moved: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct TouchSlot {
    pub identifier: u64,
    pub point: Point<Decimal>,
    /// Position when the touch began.
    pub origin: Point<Decimal>,
    /// Transform when the touch began.
    pub start: Transform,
}

impl TouchSlot {
    pub fn new(identifier: u64, point: Point<Decimal>, start: Transform) -> Self {
        Self {
            identifier,
            origin: point.clone(),
            point,
            start,
        }
    }

    /// Offset of the start position from the start translation.
    pub fn origin_offset(&self) -> Point<Decimal> {
        self.start.translate_at_coordinate_space(&self.origin)
    }
}

/// Which channel produced a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Channel {
    Wheel,
    Drag,
    Touch,
    Transition,
    Direct,
}

#[derive(Debug)]
pub(crate) struct Gesture {
    pub active: u32,
    pub source: Option<InputEvent>,
    /// Viewport extent captured when the gesture was created.
    pub extent: Extent,
    pub taps: u32,
    pub wheel: Option<WheelChannel>,
    pub drag: Option<DragChannel>,
    pub touch0: Option<TouchSlot>,
    pub touch1: Option<TouchSlot>,
    /// Last advisory touch transform, committed as final on touch end.
    pub suggested: Option<Transform>,
}

impl Gesture {
    pub fn new(extent: Extent) -> Self {
        Self {
            active: 0,
            source: None,
            extent,
            taps: 0,
            wheel: None,
            drag: None,
            touch0: None,
            touch1: None,
            suggested: None,
        }
    }

    pub fn record(&mut self, event: Option<InputEvent>) {
        if event.is_some() {
            self.source = event;
        }
    }

    /// Keep the other channels' anchors over the same content after
    /// `channel` moved the view.
    pub fn rebase_anchors(&mut self, channel: Channel, transform: &Transform) {
        if channel != Channel::Wheel {
            if let Some(wheel) = &mut self.wheel {
                wheel.anchor.rebase(transform);
            }
        }
        if channel != Channel::Drag {
            if let Some(drag) = &mut self.drag {
                drag.anchor.rebase(transform);
            }
        }
    }

    pub fn touch_mut(&mut self, identifier: u64) -> Option<&mut TouchSlot> {
        [self.touch0.as_mut(), self.touch1.as_mut()]
            .into_iter()
            .flatten()
            .find(|slot| slot.identifier == identifier)
    }

    pub fn tracks_touch(&self, identifier: u64) -> bool {
        [self.touch0.as_ref(), self.touch1.as_ref()]
            .into_iter()
            .flatten()
            .any(|slot| slot.identifier == identifier)
    }
}
