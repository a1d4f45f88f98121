use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::error::DecimalError;

/// 2D point. Screen and world points are `Point<Decimal>`; extent corners
/// may be `Point<Bound>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point<T> {
    x: T,
    y: T,
}

impl<T> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> &T {
        &self.x
    }

    pub fn y(&self) -> &T {
        &self.y
    }
}

impl Point<Decimal> {
    /// Exact decimal point from raw input coordinates.
    pub fn from_f64(x: f64, y: f64) -> Result<Self, DecimalError> {
        Ok(Self::new(Decimal::from_f64(x)?, Decimal::from_f64(y)?))
    }

    pub fn origin() -> Self {
        Self::new(Decimal::zero(), Decimal::zero())
    }

    pub fn add(&self, other: &Self) -> Self {
        Self::new(&self.x + &other.x, &self.y + &other.y)
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self::new(&self.x - &other.x, &self.y - &other.y)
    }

    /// Both coordinates multiplied by `factor`.
    pub fn scaled(&self, factor: &Decimal) -> Self {
        Self::new(&self.x * factor, &self.y * factor)
    }

    pub fn distance_squared(&self, other: &Self) -> Decimal {
        let d = other.sub(self);
        &d.x * &d.x + &d.y * &d.y
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((&self.x + &other.x).half(), (&self.y + &other.y).half())
    }
}

/// Axis-aligned rectangle given by its `min` and `max` corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<T> {
    pub min: Point<T>,
    pub max: Point<T>,
}

impl<T> Rect<T> {
    pub fn new(min: Point<T>, max: Point<T>) -> Self {
        Self { min, max }
    }
}

impl Rect<Decimal> {
    /// Rectangle from `[[x0, y0], [x1, y1]]` corner coordinates.
    pub fn from_f64(corners: [[f64; 2]; 2]) -> Result<Self, DecimalError> {
        Ok(Self::new(
            Point::from_f64(corners[0][0], corners[0][1])?,
            Point::from_f64(corners[1][0], corners[1][1])?,
        ))
    }

    pub fn width(&self) -> Decimal {
        self.max.x() - self.min.x()
    }

    pub fn height(&self) -> Decimal {
        self.max.y() - self.min.y()
    }

    pub fn centroid(&self) -> Point<Decimal> {
        self.min.midpoint(&self.max)
    }

    /// The larger of width and height.
    pub fn major_dimension(&self) -> Decimal {
        self.width().max(self.height())
    }
}
