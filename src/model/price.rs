use std::fmt;
use std::ops::{Mul, Sub};

use charming::datatype::NumericValue;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exact decimal price. Serialized as a string so cached values keep the
/// exchange's scale (`"100.50000000"` stays `"100.50000000"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialOrd, Ord, PartialEq, Eq, Default)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Price {
    pub fn new(v: i64) -> Self {
        Price(Decimal::from(v))
    }

    /// `self` scaled up by `pct` percent.
    pub fn plus_pct(self, pct: Decimal) -> Self {
        Price(self.0 * (Decimal::ONE + pct / Decimal::ONE_HUNDRED))
    }

    /// `self` scaled down by `pct` percent.
    pub fn minus_pct(self, pct: Decimal) -> Self {
        Price(self.0 * (Decimal::ONE - pct / Decimal::ONE_HUNDRED))
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Self) -> Self::Output {
        Price(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Decimal;

    fn mul(self, size: Decimal) -> Self::Output {
        self.0 * size
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Price> for NumericValue {
    fn from(n: Price) -> Self {
        NumericValue::Float(n.0.to_f64().unwrap_or(f64::NAN))
    }
}
