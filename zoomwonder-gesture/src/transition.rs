//! Animated transform changes driven by scheduler time.

use std::time::Duration;

use zoomwonder_core::{Transform, TransformTween};

/// Cubic in-out easing, the default for animated zooms.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// A running transition on one target. It occupies one channel of the
/// target's gesture from scheduling until it finishes or is interrupted.
pub(crate) struct Transition {
    tween: TransformTween,
    started_at: Duration,
    duration: Duration,
}

impl Transition {
    pub fn new(tween: TransformTween, started_at: Duration, duration: Duration) -> Self {
        Self {
            tween,
            started_at,
            duration,
        }
    }

    /// Linear progress in `[0, 1]` at scheduler time `now`.
    pub fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Frame at `now` and whether it is the last one. The last frame is the
    /// exact end transform.
    pub fn frame(&self, now: Duration) -> (Transform, bool) {
        let t = self.progress(now);
        if t >= 1.0 {
            return (self.tween.end().clone(), true);
        }
        (self.tween.transform_at(ease_cubic_in_out(t)), false)
    }
}
