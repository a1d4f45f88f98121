use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Decimal;
use crate::points::Point;

/// Uniform scale plus 2D translation mapping world to screen coordinates:
/// `screen = world * k + (x, y)`.
///
/// Transforms are values; every operation returns a new transform and no
/// transform is mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transform {
    k: Decimal,
    x: Decimal,
    y: Decimal,
}

impl Transform {
    pub fn new(k: impl Into<Decimal>, x: impl Into<Decimal>, y: impl Into<Decimal>) -> Self {
        Self {
            k: k.into(),
            x: x.into(),
            y: y.into(),
        }
    }

    /// k = 1, x = y = 0
    pub fn identity() -> Self {
        Self::new(Decimal::one(), Decimal::zero(), Decimal::zero())
    }

    pub fn k(&self) -> &Decimal {
        &self.k
    }

    pub fn x(&self) -> &Decimal {
        &self.x
    }

    pub fn y(&self) -> &Decimal {
        &self.y
    }

    /// A zero scale collapses the plane and cannot be inverted.
    pub fn is_invertible(&self) -> bool {
        !self.k.is_zero()
    }

    /// Translation as a point.
    pub fn offset(&self) -> Point<Decimal> {
        Point::new(self.x.clone(), self.y.clone())
    }

    /// Compose with a further scale by `k`. Scaling by 1 is a no-op.
    pub fn scale(&self, k: &Decimal) -> Self {
        if *k == Decimal::one() {
            return self.clone();
        }
        Self::new(&self.k * k, self.x.clone(), self.y.clone())
    }

    /// Compose with a translation expressed in world units, so the screen
    /// shift is `k * (dx, dy)`.
    pub fn translate(&self, dx: &Decimal, dy: &Decimal) -> Self {
        if dx.is_zero() && dy.is_zero() {
            return self.clone();
        }
        Self::new(
            self.k.clone(),
            &self.x + &self.k * dx,
            &self.y + &self.k * dy,
        )
    }

    pub fn apply(&self, point: &Point<Decimal>) -> Point<Decimal> {
        Point::new(self.apply_x(point.x()), self.apply_y(point.y()))
    }

    pub fn apply_x(&self, x: &Decimal) -> Decimal {
        x * &self.k + &self.x
    }

    pub fn apply_y(&self, y: &Decimal) -> Decimal {
        y * &self.k + &self.y
    }

    pub fn invert(&self, point: &Point<Decimal>) -> Point<Decimal> {
        Point::new(self.invert_x(point.x()), self.invert_y(point.y()))
    }

    pub fn invert_x(&self, x: &Decimal) -> Decimal {
        (x - &self.x) / &self.k
    }

    pub fn invert_y(&self, y: &Decimal) -> Decimal {
        (y - &self.y) / &self.k
    }

    /// Offset of a screen point from the translation origin: the world point
    /// under `point` scaled by the current k. Unlike [`Transform::invert`]
    /// the result stays valid as a pin target when k changes.
    pub fn translate_at_coordinate_space(&self, point: &Point<Decimal>) -> Point<Decimal> {
        point.sub(&self.offset())
    }

    /// Same translation, scale replaced by `k`.
    pub fn with_scale(&self, k: Decimal) -> Self {
        if k == self.k {
            return self.clone();
        }
        Self::new(k, self.x.clone(), self.y.clone())
    }

    /// Re-translate so that world point `world` lands on screen point
    /// `screen` at the current scale.
    pub fn pin(&self, screen: &Point<Decimal>, world: &Point<Decimal>) -> Self {
        let x = screen.x() - world.x() * &self.k;
        let y = screen.y() - world.y() * &self.k;
        self.with_translation(x, y)
    }

    /// Re-translate so that a captured coordinate-space `offset`, grown by
    /// `factor`, lands on screen point `screen`. Scale is left unchanged.
    pub fn pin_offset(
        &self,
        screen: &Point<Decimal>,
        offset: &Point<Decimal>,
        factor: &Decimal,
    ) -> Self {
        let x = screen.x() - offset.x() * factor;
        let y = screen.y() - offset.y() * factor;
        self.with_translation(x, y)
    }

    fn with_translation(&self, x: Decimal, y: Decimal) -> Self {
        if x == self.x && y == self.y {
            return self.clone();
        }
        Self::new(self.k.clone(), x, y)
    }

    /// Visible domain of a linear 1-D scale mapping `domain` onto `range`
    /// along x, after this transform.
    pub fn rescale_x(&self, domain: [Decimal; 2], range: [Decimal; 2]) -> [Decimal; 2] {
        rescale(domain, range, |v| self.invert_x(v))
    }

    /// Visible domain of a linear 1-D scale along y.
    pub fn rescale_y(&self, domain: [Decimal; 2], range: [Decimal; 2]) -> [Decimal; 2] {
        rescale(domain, range, |v| self.invert_y(v))
    }
}

fn rescale(
    domain: [Decimal; 2],
    range: [Decimal; 2],
    invert: impl Fn(&Decimal) -> Decimal,
) -> [Decimal; 2] {
    let [d0, d1] = domain;
    let [r0, r1] = range;
    let span = &r1 - &r0;
    if span.is_zero() {
        return [d0.clone(), d0];
    }
    // range value -> domain value of the original linear scale
    let to_domain = |r: &Decimal| &d0 + (r - &r0) * (&d1 - &d0) / &span;
    [to_domain(&invert(&r0)), to_domain(&invert(&r1))]
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({},{}) scale({})", self.x, self.y, self.k)
    }
}
