use dashu_base::Abs;
use dashu_float::ops::SquareRoot;
use dashu_float::DBig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use crate::error::DecimalError;

/// Significant decimal digits carried by every [`Decimal`].
pub const WORKING_PRECISION: usize = 50;

/// Exact base-10 number used for every transform component.
///
/// Wraps a `DBig` normalised to [`WORKING_PRECISION`] digits, so sums and
/// products of decimal inputs are exact and only division and square roots
/// round (half away from zero). Gesture channels re-derive transforms from
/// captured point pairs many times per gesture; binary floats would drift.
#[derive(Clone, Debug)]
pub struct Decimal(DBig);

impl Decimal {
    fn from_dbig(value: DBig) -> Self {
        Self(value.with_precision(WORKING_PRECISION).value())
    }

    pub fn zero() -> Self {
        Self::from_dbig(DBig::ZERO)
    }

    pub fn one() -> Self {
        Self::from_dbig(DBig::ONE)
    }

    pub fn from_i64(value: i64) -> Self {
        Self::from_dbig(DBig::from(value))
    }

    /// Convert from f64 through its shortest round-trip decimal form.
    ///
    /// `0.1` becomes exactly `0.1`, not the nearest binary fraction.
    pub fn from_f64(value: f64) -> Result<Self, DecimalError> {
        if !value.is_finite() {
            return Err(DecimalError::NonFinite(value));
        }
        format!("{value}").parse()
    }

    /// Convert to f64 (for interpolation scalars and display only)
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == DBig::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < DBig::ZERO
    }

    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    pub fn sqrt(&self) -> Self {
        Self::from_dbig(self.0.sqrt())
    }

    /// Half of this value, exact for every finite decimal.
    pub fn half(&self) -> Self {
        Self::from_dbig(&self.0 / &DBig::from(2u8))
    }

    pub fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    pub fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        input
            .trim()
            .parse::<DBig>()
            .map(Self::from_dbig)
            .map_err(|e| DecimalError::Parse {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }
}

impl TryFrom<f64> for Decimal {
    type Error = DecimalError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

macro_rules! decimal_from_int {
    ($($t:ty)*) => {$(
        impl From<$t> for Decimal {
            fn from(value: $t) -> Self {
                Self::from_i64(i64::from(value))
            }
        }
    )*};
}

decimal_from_int!(i8 i16 i32 i64 u8 u16 u32);

macro_rules! decimal_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Decimal> for &Decimal {
            type Output = Decimal;

            fn $method(self, rhs: &Decimal) -> Decimal {
                Decimal::from_dbig(&self.0 $op &rhs.0)
            }
        }

        impl $trait<Decimal> for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                &self $op &rhs
            }
        }

        impl $trait<&Decimal> for Decimal {
            type Output = Decimal;

            fn $method(self, rhs: &Decimal) -> Decimal {
                &self $op rhs
            }
        }

        impl $trait<Decimal> for &Decimal {
            type Output = Decimal;

            fn $method(self, rhs: Decimal) -> Decimal {
                self $op &rhs
            }
        }
    };
}

decimal_binop!(Add, add, +);
decimal_binop!(Sub, sub, -);
decimal_binop!(Mul, mul, *);
decimal_binop!(Div, div, /);

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0.clone())
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&positional(&self.0.to_string()))
    }
}

/// Render a decimal literal in plain positional form without trailing
/// fractional zeros: `"1.50e2"` → `"150"`, `"0.2500"` → `"0.25"`.
fn positional(raw: &str) -> String {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (
            &unsigned[..at],
            unsigned[at + 1..].parse::<isize>().unwrap_or(0),
        ),
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let digits = format!("{int_part}{frac_part}");
    let point = int_part.len() as isize + exponent;

    let (int_digits, frac_digits) = if point <= 0 {
        (
            String::from("0"),
            format!("{}{}", "0".repeat(point.unsigned_abs()), digits),
        )
    } else if point as usize >= digits.len() {
        (
            format!("{}{}", digits, "0".repeat(point as usize - digits.len())),
            String::new(),
        )
    } else {
        let (i, f) = digits.split_at(point as usize);
        (i.to_string(), f.to_string())
    };

    let int_digits = int_digits.trim_start_matches('0');
    let int_digits = if int_digits.is_empty() { "0" } else { int_digits };
    let frac_digits = frac_digits.trim_end_matches('0');

    let is_zero = int_digits == "0" && frac_digits.is_empty();
    let sign = if negative && !is_zero { "-" } else { "" };
    if frac_digits.is_empty() {
        format!("{sign}{int_digits}")
    } else {
        format!("{sign}{int_digits}.{frac_digits}")
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
