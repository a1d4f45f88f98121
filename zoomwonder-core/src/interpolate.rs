//! Interpolated paths between two transforms.
//!
//! A view is the world-space point under a fixed screen anchor together with
//! the visible world width, `(ux, uy, w)`. The default path is the smooth
//! zoom of van Wijk & Nuij ("Smooth and efficient zooming and panning"),
//! which keeps the perceived zoom velocity constant.

use std::f64::consts::SQRT_2;

use crate::decimal::Decimal;
use crate::points::Point;
use crate::transform::Transform;

const EPSILON2: f64 = 1e-12;

#[derive(Clone, Debug, PartialEq)]
pub struct ZoomView {
    pub center: Point<Decimal>,
    pub width: Decimal,
}

impl ZoomView {
    pub fn new(center: Point<Decimal>, width: Decimal) -> Self {
        Self { center, width }
    }
}

/// A time-parameterised path of views over `t ∈ [0, 1]`.
pub trait ViewPath {
    fn view_at(&self, t: f64) -> ZoomView;
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Shape {
    /// Equal widths: straight pan.
    Linear,
    /// Coincident centres: zoom in place, `w0 * exp(rho * t * s)`.
    Exponential { s: f64 },
    Hyperbolic { s: f64, r0: f64, d1: f64 },
}

/// Path between two views.
///
/// The curve parameters are f64 scalars; they are only ever applied to the
/// exact decimal endpoints, so the endpoints themselves never drift.
#[derive(Clone, Debug)]
pub struct ZoomInterpolator {
    start: ZoomView,
    end: ZoomView,
    rho: f64,
    shape: Shape,
}

impl ZoomInterpolator {
    pub fn new(start: &ZoomView, end: &ZoomView) -> Self {
        Self::with_rho(start, end, SQRT_2)
    }

    /// Curvature `rho` trades zooming out against panning; larger values
    /// zoom out further during long pans.
    pub fn with_rho(start: &ZoomView, end: &ZoomView, rho: f64) -> Self {
        let rho = rho.max(1e-3);
        let w0 = start.width.to_f64();
        let w1 = end.width.to_f64();
        let dx = end.center.x().to_f64() - start.center.x().to_f64();
        let dy = end.center.y().to_f64() - start.center.y().to_f64();
        let d2 = dx * dx + dy * dy;

        let shape = if start.width == end.width {
            Shape::Linear
        } else if d2 < EPSILON2 {
            Shape::Exponential {
                s: libm::log(w1 / w0) / rho,
            }
        } else {
            let rho2 = rho * rho;
            let rho4 = rho2 * rho2;
            let d1 = libm::sqrt(d2);
            let b0 = (w1 * w1 - w0 * w0 + rho4 * d2) / (2.0 * w0 * rho2 * d1);
            let b1 = (w1 * w1 - w0 * w0 - rho4 * d2) / (2.0 * w1 * rho2 * d1);
            let r0 = libm::log(libm::sqrt(b0 * b0 + 1.0) - b0);
            let r1 = libm::log(libm::sqrt(b1 * b1 + 1.0) - b1);
            Shape::Hyperbolic {
                s: (r1 - r0) / rho,
                r0,
                d1,
            }
        };

        Self {
            start: start.clone(),
            end: end.clone(),
            rho,
            shape,
        }
    }

    /// Straight-line interpolation of centre and width.
    pub fn linear(start: &ZoomView, end: &ZoomView) -> Self {
        Self {
            start: start.clone(),
            end: end.clone(),
            rho: SQRT_2,
            shape: Shape::Linear,
        }
    }

    /// Recommended duration in milliseconds for this path.
    pub fn duration(&self) -> f64 {
        let s = match self.shape {
            Shape::Linear => {
                let w0 = self.start.width.to_f64();
                let d2 = self.end.center.distance_squared(&self.start.center).to_f64();
                if w0 > 0.0 {
                    libm::sqrt(d2) / w0 / self.rho
                } else {
                    0.0
                }
            }
            Shape::Exponential { s } | Shape::Hyperbolic { s, .. } => s,
        };
        (s.abs() * 1000.0 * self.rho / SQRT_2).max(0.0)
    }

    fn center_at(&self, u: f64) -> Point<Decimal> {
        let u = exact(u);
        let delta = self.end.center.sub(&self.start.center);
        self.start.center.add(&delta.scaled(&u))
    }
}

impl ViewPath for ZoomInterpolator {
    fn view_at(&self, t: f64) -> ZoomView {
        match self.shape {
            Shape::Linear => {
                let t_exact = exact(t);
                let width = &self.start.width + (&self.end.width - &self.start.width) * &t_exact;
                ZoomView::new(self.center_at(t), width)
            }
            Shape::Exponential { s } => {
                let ratio = libm::exp(self.rho * t * s);
                ZoomView::new(self.center_at(t), &self.start.width * exact(ratio))
            }
            Shape::Hyperbolic { s, r0, d1 } => {
                let w0 = self.start.width.to_f64();
                let rho2 = self.rho * self.rho;
                let s = t * s;
                let cosh_r0 = libm::cosh(r0);
                let u = w0 / (rho2 * d1) * (cosh_r0 * libm::tanh(self.rho * s + r0) - libm::sinh(r0));
                let ratio = cosh_r0 / libm::cosh(self.rho * s + r0);
                ZoomView::new(self.center_at(u), &self.start.width * exact(ratio))
            }
        }
    }
}

fn exact(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Default interpolation: the smooth zoom path.
pub fn interpolate_zoom(start: &ZoomView, end: &ZoomView) -> Box<dyn ViewPath> {
    Box::new(ZoomInterpolator::new(start, end))
}

/// Transforms along a view path anchored at a fixed screen point.
///
/// Endpoints are `(a.invert(p), w / a.k)` and `(b.invert(p), w / b.k)` with
/// `w` the viewport's larger dimension; each intermediate transform is
/// re-derived as `k = w / z`, `x = p.x - ux * k`, `y = p.y - uy * k`.
pub struct TransformTween {
    end: Transform,
    anchor: Point<Decimal>,
    width: Decimal,
    path: Option<Box<dyn ViewPath>>,
}

impl TransformTween {
    pub fn new(
        start: &Transform,
        end: Transform,
        anchor: Point<Decimal>,
        reference_width: Decimal,
        interpolate: impl FnOnce(&ZoomView, &ZoomView) -> Box<dyn ViewPath>,
    ) -> Self {
        // zero-size viewports still need a positive reference width
        let width = if reference_width.is_zero() || reference_width.is_negative() {
            Decimal::one()
        } else {
            reference_width
        };

        let path = if start.k().is_zero() || end.k().is_zero() {
            None
        } else {
            let from = ZoomView::new(start.invert(&anchor), &width / start.k());
            let to = ZoomView::new(end.invert(&anchor), &width / end.k());
            Some(interpolate(&from, &to))
        };

        Self {
            end,
            anchor,
            width,
            path,
        }
    }

    pub fn end(&self) -> &Transform {
        &self.end
    }

    /// Transform at normalised time `t`; `t >= 1` yields the end transform
    /// verbatim.
    pub fn transform_at(&self, t: f64) -> Transform {
        let Some(path) = self.path.as_ref().filter(|_| t < 1.0) else {
            return self.end.clone();
        };
        let view = path.view_at(t.max(0.0));
        if view.width.is_zero() || view.width.is_negative() {
            return self.end.clone();
        }
        let k = &self.width / &view.width;
        let x = self.anchor.x() - view.center.x() * &k;
        let y = self.anchor.y() - view.center.y() * &k;
        Transform::new(k, x, y)
    }
}
