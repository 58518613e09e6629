use chrono::{DateTime, TimeZone, Utc};

pub mod backtest;
pub mod broker;
pub mod cache;
pub mod chart;
pub mod config;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod model;
pub mod strategies;

pub use error::{Error, Result};

pub fn to_utc_time(timestamp: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(timestamp).single()
}
