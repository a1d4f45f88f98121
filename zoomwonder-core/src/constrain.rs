//! Default constraint keeping the viewport inside the translate extent.

use crate::bounds::{Bound, TranslateExtent};
use crate::decimal::Decimal;
use crate::points::Rect;
use crate::transform::Transform;

/// Screen-space viewport rectangle.
pub type Extent = Rect<Decimal>;

/// Clamp the translation of `transform` so the viewport `extent`, mapped
/// into world space, stays inside `translate_extent`.
///
/// Per axis, with `d0`/`d1` the overflow of the low/high viewport edge past
/// the low/high bound: a viewport wider than the bound is centred on it,
/// otherwise the overflowing edge is snapped back. Scale is not touched,
/// and a non-invertible transform is returned as is.
pub fn constrain(
    transform: &Transform,
    extent: &Extent,
    translate_extent: &TranslateExtent,
) -> Transform {
    if !transform.is_invertible() {
        return transform.clone();
    }
    let dx0 = translate_extent
        .min
        .x()
        .subtracted_from(&transform.invert_x(extent.min.x()));
    let dx1 = translate_extent
        .max
        .x()
        .subtracted_from(&transform.invert_x(extent.max.x()));
    let dy0 = translate_extent
        .min
        .y()
        .subtracted_from(&transform.invert_y(extent.min.y()));
    let dy1 = translate_extent
        .max
        .y()
        .subtracted_from(&transform.invert_y(extent.max.y()));

    transform.translate(&axis_adjustment(dx0, dx1), &axis_adjustment(dy0, dy1))
}

fn axis_adjustment(d0: Bound, d1: Bound) -> Decimal {
    let zero = Bound::Finite(Decimal::zero());
    let adjustment = if d1 > d0 {
        d0.midpoint(&d1)
    } else if d0 < zero {
        d0
    } else if d1 > zero {
        d1
    } else {
        zero
    };
    // an unbounded side can never be overflowed by a finite amount
    adjustment.finite().cloned().unwrap_or_else(Decimal::zero)
}
