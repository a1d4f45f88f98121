//! Raw input as delivered by the host's event capture layer.
//!
//! Coordinates are client-space f64 values; the controller resolves them to
//! target-local space through [`Platform::local_point`](crate::Platform::local_point)
//! and converts them to exact decimals on entry.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Unit of a wheel delta.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub client: (f64, f64),
    pub delta_y: f64,
    pub delta_mode: DeltaMode,
    pub modifiers: Modifiers,
}

impl WheelInput {
    pub fn new(client: (f64, f64), delta_y: f64) -> Self {
        Self {
            client,
            delta_y,
            delta_mode: DeltaMode::Pixel,
            modifiers: Modifiers::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub client: (f64, f64),
    /// 0 = primary button
    pub button: u16,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(client: (f64, f64)) -> Self {
        Self {
            client,
            button: 0,
            modifiers: Modifiers::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub identifier: u64,
    pub client: (f64, f64),
}

impl TouchPoint {
    pub fn new(identifier: u64, client: (f64, f64)) -> Self {
        Self { identifier, client }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchInput {
    /// Every touch currently on the target.
    pub touches: Vec<TouchPoint>,
    /// Touches that changed in this event.
    pub changed: Vec<TouchPoint>,
    pub modifiers: Modifiers,
}

impl TouchInput {
    pub fn new(touches: Vec<TouchPoint>, changed: Vec<TouchPoint>) -> Self {
        Self {
            touches,
            changed,
            modifiers: Modifiers::default(),
        }
    }
}

/// Originating raw event carried by lifecycle notifications.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Wheel(WheelInput),
    PointerDown(PointerInput),
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    DoubleClick(PointerInput),
    TouchStart(TouchInput),
    TouchMove(TouchInput),
    TouchEnd(TouchInput),
}

impl InputEvent {
    pub fn modifiers(&self) -> Modifiers {
        match self {
            InputEvent::Wheel(e) => e.modifiers,
            InputEvent::PointerDown(e)
            | InputEvent::PointerMove(e)
            | InputEvent::PointerUp(e)
            | InputEvent::DoubleClick(e) => e.modifiers,
            InputEvent::TouchStart(e) | InputEvent::TouchMove(e) | InputEvent::TouchEnd(e) => {
                e.modifiers
            }
        }
    }

    /// Pressed button for pointer events, 0 otherwise.
    pub fn button(&self) -> u16 {
        match self {
            InputEvent::PointerDown(e)
            | InputEvent::PointerMove(e)
            | InputEvent::PointerUp(e)
            | InputEvent::DoubleClick(e) => e.button,
            _ => 0,
        }
    }

    pub fn is_wheel(&self) -> bool {
        matches!(self, InputEvent::Wheel(_))
    }
}
