use crate::model::kline::Kline;
use crate::model::price::Price;
use crate::{error::Result, to_utc_time};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One OHLC sample. Field order is the cache file's column order.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub high: Price,
    pub low: Price,
    pub open: Price,
    pub close: Price,
}

impl TryFrom<&Kline> for Bar {
    type Error = crate::error::Error;

    fn try_from(k: &Kline) -> Result<Self> {
        Ok(Bar {
            timestamp: k.open_time,
            high: Price(Decimal::from_str(&k.high)?),
            low: Price(Decimal::from_str(&k.low)?),
            open: Price(Decimal::from_str(&k.open)?),
            close: Price(Decimal::from_str(&k.close)?),
        })
    }
}

impl fmt::Debug for Bar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let t = to_utc_time(self.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.to_string());

        f.debug_struct("Bar")
            .field("time", &t)
            .field("open", &self.open.0)
            .field("high", &self.high.0)
            .field("low", &self.low.0)
            .field("close", &self.close.0)
            .finish()
    }
}
