//! Host hooks consumed by the gesture handlers.

use crate::target::TargetId;

/// Services the host environment provides to the controller.
///
/// Every method has a neutral default, so a host only overrides what it
/// actually supports.
pub trait Platform {
    /// Resolve a client-space position to the target's local coordinate
    /// space. Defaults to the identity.
    fn local_point(&self, _target: TargetId, client: (f64, f64)) -> (f64, f64) {
        client
    }

    /// Suppress native drag and text selection while a pointer drag is live.
    fn disable_drag(&mut self, _target: TargetId) {}

    /// Restore native drag. `moved` is true when the pointer travelled past
    /// the click distance, in which case the host should swallow the click
    /// that follows.
    fn enable_drag(&mut self, _target: TargetId, _moved: bool) {}
}

/// No-op platform: client coordinates are target-local and there is no
/// native drag behaviour to suppress.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Platform for Headless {}
