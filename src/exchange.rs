use std::time::Duration;

use chrono::{TimeZone, Utc};
use tracing::{debug, info};

use crate::cache::parse_since;
use crate::error::{Error, Result};
use crate::model::interval::Interval;
use crate::model::kline::Kline;

const BINANCE_API: &str = "https://api.binance.com";
/// Largest page `/api/v3/klines` serves.
const PAGE_LIMIT: usize = 1000;

/// Bulk historical kline query. Pagination, if any, happens inside.
pub trait KlineSource {
    fn historical_klines(&self, symbol: &str, interval: Interval, since: &str) -> Result<Vec<Kline>>;
}

/// Public Binance market data over blocking REST. No credentials, no retry.
pub struct BinanceClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BINANCE_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        // Each request is bounded so a stalled connection fails the fetch
        // instead of hanging the run. There is still no retry.
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(BinanceClient {
            client,
            base_url: base_url.into(),
        })
    }

    fn page(&self, symbol: &str, interval: Interval, start_time: i64) -> Result<Vec<Kline>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&startTime={}&limit={}",
            self.base_url, symbol, interval, start_time, PAGE_LIMIT
        );

        let response = self.client.get(&url).send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

impl KlineSource for BinanceClient {
    fn historical_klines(&self, symbol: &str, interval: Interval, since: &str) -> Result<Vec<Kline>> {
        let date = parse_since(since)?;
        let mut start_time = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp_millis())
            .ok_or_else(|| Error::InvalidDate(since.to_string()))?;

        let mut all_klines: Vec<Kline> = Vec::new();
        loop {
            let klines = self.page(symbol, interval, start_time)?;
            let received = klines.len();
            debug!(symbol, start_time, received, "kline page");

            match klines.last() {
                Some(last) => start_time = last.close_time + 1,
                None => break,
            }
            all_klines.extend(klines);

            if received < PAGE_LIMIT {
                break;
            }
        }

        info!(symbol, %interval, count = all_klines.len(), "downloaded klines");
        Ok(all_klines)
    }
}
