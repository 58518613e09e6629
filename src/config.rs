//! Run parameters. The constants below are the whole configuration surface;
//! `StrategyConfig` and `RunConfig` carry them into the components so nothing
//! reads process-wide state.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::cache::parse_since;
use crate::error::{Error, Result};
use crate::model::interval::Interval;

/// Starting cash, in quote currency.
pub const ACCOUNT_BALANCE: i64 = 100_000;
/// Size of each trade in base currency, e.g. 1 ETH when trading ETHUSDT.
pub const TRADE_SIZE: i64 = 1;
/// In %.
pub const TAKE_PROFIT: i64 = 10;
pub const STOP_LOSS: i64 = 5;
/// Minimum % rise of a close over the previous close that opens a position.
pub const BUY_TRIGGER: i64 = 1;

pub const SYMBOL: &str = "ETHUSDT";
pub const SINCE: &str = "1 Jan 2021";
pub const INTERVAL: Interval = Interval::OneMinute;
pub const CACHE_DIR: &str = "assets";

/// Replay window, inclusive at midnight UTC on both ends.
pub const FROM_DATE: &str = "2021-01-01";
pub const TO_DATE: &str = "2021-05-24";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyConfig {
    pub trade_size: Decimal,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub buy_trigger: Decimal,
}

impl StrategyConfig {
    pub fn new(
        trade_size: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
        buy_trigger: Decimal,
    ) -> Result<Self> {
        if trade_size <= Decimal::ZERO {
            return Err(Error::InvalidConfig(format!(
                "trade size must be positive, got {trade_size}"
            )));
        }
        if take_profit.is_sign_negative() || buy_trigger.is_sign_negative() {
            return Err(Error::InvalidConfig(
                "take-profit and buy-trigger must not be negative".into(),
            ));
        }
        if stop_loss.is_sign_negative() || stop_loss >= Decimal::ONE_HUNDRED {
            return Err(Error::InvalidConfig(format!(
                "stop-loss must be in [0, 100), got {stop_loss}"
            )));
        }
        Ok(StrategyConfig {
            trade_size,
            take_profit,
            stop_loss,
            buy_trigger,
        })
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            trade_size: Decimal::from(TRADE_SIZE),
            take_profit: Decimal::from(TAKE_PROFIT),
            stop_loss: Decimal::from(STOP_LOSS),
            buy_trigger: Decimal::from(BUY_TRIGGER),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub account_balance: Decimal,
    pub symbol: String,
    pub since: String,
    pub interval: Interval,
    pub cache_dir: PathBuf,
    pub from_date: String,
    pub to_date: String,
    pub strategy: StrategyConfig,
}

impl RunConfig {
    /// The replay window as `[from 00:00, to 00:00]`.
    pub fn window(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        Ok((midnight(&self.from_date)?, midnight(&self.to_date)?))
    }
}

fn midnight(date: &str) -> Result<NaiveDateTime> {
    let d: NaiveDate = parse_since(date)?;
    d.and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::InvalidDate(date.to_string()))
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            account_balance: Decimal::from(ACCOUNT_BALANCE),
            symbol: SYMBOL.to_string(),
            since: SINCE.to_string(),
            interval: INTERVAL,
            cache_dir: PathBuf::from(CACHE_DIR),
            from_date: FROM_DATE.to_string(),
            to_date: TO_DATE.to_string(),
            strategy: StrategyConfig::default(),
        }
    }
}
