//! Scale and translate extents.
//!
//! Translate bounds may be infinite on either side, so they are modelled as
//! [`Bound`] rather than [`Decimal`]; the default translate extent is
//! unbounded in every direction.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::decimal::Decimal;
use crate::error::DecimalError;
use crate::points::{Point, Rect};

/// A decimal extended with both infinities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    NegInfinity,
    Finite(Decimal),
    PosInfinity,
}

impl Bound {
    pub fn finite(&self) -> Option<&Decimal> {
        match self {
            Bound::Finite(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.finite().is_none()
    }

    /// `value - self`; subtracting an infinity flips its sign.
    pub fn subtracted_from(&self, value: &Decimal) -> Bound {
        match self {
            Bound::NegInfinity => Bound::PosInfinity,
            Bound::Finite(b) => Bound::Finite(value - b),
            Bound::PosInfinity => Bound::NegInfinity,
        }
    }

    /// Midpoint of two bounds. Only finite pairs have a meaningful midpoint;
    /// anything involving an infinity collapses to zero.
    pub fn midpoint(&self, other: &Bound) -> Bound {
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite((a + b).half()),
            _ => Bound::Finite(Decimal::zero()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Bound::NegInfinity => 0,
            Bound::Finite(_) => 1,
            Bound::PosInfinity => 2,
        }
    }
}

impl From<Decimal> for Bound {
    fn from(value: Decimal) -> Self {
        Bound::Finite(value)
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Bound::Finite(Decimal::from(value))
    }
}

impl TryFrom<f64> for Bound {
    type Error = DecimalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == f64::INFINITY {
            Ok(Bound::PosInfinity)
        } else if value == f64::NEG_INFINITY {
            Ok(Bound::NegInfinity)
        } else {
            Decimal::from_f64(value).map(Bound::Finite)
        }
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => a.partial_cmp(b),
            _ => self.rank().partial_cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::NegInfinity => f.write_str("-Infinity"),
            Bound::Finite(v) => write!(f, "{v}"),
            Bound::PosInfinity => f.write_str("Infinity"),
        }
    }
}

impl FromStr for Bound {
    type Err = DecimalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "-Infinity" | "-inf" => Ok(Bound::NegInfinity),
            "Infinity" | "+Infinity" | "inf" => Ok(Bound::PosInfinity),
            other => other.parse().map(Bound::Finite),
        }
    }
}

impl Serialize for Bound {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// World-space rectangle bounding where panning may go.
pub type TranslateExtent = Rect<Bound>;

impl TranslateExtent {
    pub fn unbounded() -> Self {
        Rect::new(
            Point::new(Bound::NegInfinity, Bound::NegInfinity),
            Point::new(Bound::PosInfinity, Bound::PosInfinity),
        )
    }

    pub fn bounded(extent: &Rect<Decimal>) -> Self {
        Rect::new(
            Point::new(
                Bound::Finite(extent.min.x().clone()),
                Bound::Finite(extent.min.y().clone()),
            ),
            Point::new(
                Bound::Finite(extent.max.x().clone()),
                Bound::Finite(extent.max.y().clone()),
            ),
        )
    }
}

impl Default for TranslateExtent {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Allowed scale range `[min, max]`.
///
/// Not validated: a `min` above `max` simply produces whatever the clamp
/// arithmetic yields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
    pub min: Decimal,
    pub max: Bound,
}

impl ScaleExtent {
    pub fn new(min: Decimal, max: impl Into<Bound>) -> Self {
        Self {
            min,
            max: max.into(),
        }
    }

    /// Hard clamp into `[min, max]`, used by discrete operations.
    pub fn clamp(&self, k: &Decimal) -> Decimal {
        let upper = match &self.max {
            Bound::Finite(max) if k > max => max.clone(),
            Bound::NegInfinity => self.min.clone(),
            _ => k.clone(),
        };
        self.min.clone().max(upper)
    }

    /// Clamp against `min` only, used while a continuous gesture is live.
    pub fn clamp_lower(&self, k: &Decimal) -> Decimal {
        self.min.clone().max(k.clone())
    }
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self {
            min: Decimal::zero(),
            max: Bound::PosInfinity,
        }
    }
}
