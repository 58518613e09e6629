//! Flat-file cache of historical bars.
//!
//! A cache file is keyed by symbol and since-date only. Once written it is
//! never refreshed: existence of the file is the whole hit check, so a stale
//! or truncated file is reused as-is.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use tracing::info;

use crate::error::{Error, Result};
use crate::exchange::KlineSource;
use crate::model::bar::Bar;
use crate::model::interval::Interval;

pub const HEADER: [&str; 5] = ["timestamp", "high", "low", "open", "close"];

/// A key segment must stay a single file name inside the cache directory.
fn is_safe_segment(segment: &str) -> bool {
    !segment.contains(['/', '\\']) && !segment.contains("..")
}

/// Parses an exchange-style date (`1 Jan 2021`) or an ISO date (`2021-01-01`).
pub fn parse_since(since: &str) -> Result<NaiveDate> {
    let s = since.trim();
    NaiveDate::parse_from_str(s, "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| Error::InvalidDate(since.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHandle {
    path: PathBuf,
}

impl CacheHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Bar>> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let bars = rdr.deserialize().collect::<Result<Vec<Bar>, csv::Error>>()?;
        Ok(bars)
    }
}

pub struct HistoricalDataCache {
    dir: PathBuf,
}

impl HistoricalDataCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HistoricalDataCache { dir: dir.into() }
    }

    pub fn key(symbol: &str, since: &str) -> String {
        format!("{}_{}.csv", symbol, since)
    }

    fn path_for(&self, symbol: &str, since: &str) -> PathBuf {
        self.dir.join(Self::key(symbol, since))
    }

    /// Handle to an already cached series, never touching the exchange.
    /// Keys that would escape the cache directory are never found.
    pub fn existing(&self, symbol: &str, since: &str) -> Option<CacheHandle> {
        if !is_safe_segment(symbol) || !is_safe_segment(since) {
            return None;
        }
        let path = self.path_for(symbol, since);
        path.is_file().then_some(CacheHandle { path })
    }

    /// Returns the cached series for `(symbol, since)`, downloading it with
    /// one `source` call first if no file exists yet.
    pub fn fetch<S: KlineSource + ?Sized>(
        &self,
        source: &S,
        symbol: &str,
        since: &str,
        interval: Interval,
    ) -> Result<CacheHandle> {
        if symbol.is_empty() {
            return Err(Error::EmptySymbol);
        }
        if let Some(bad) = [symbol, since].into_iter().find(|s| !is_safe_segment(s)) {
            return Err(Error::InvalidCacheKey(bad.to_string()));
        }

        if let Some(handle) = self.existing(symbol, since) {
            info!(path = %handle.path.display(), "Datafile already exists, loading file");
            return Ok(handle);
        }

        info!(symbol, since, %interval, "Fetching historical data, this may take a few minutes");
        let start = Instant::now();

        let bars = source
            .historical_klines(symbol, interval, since)?
            .iter()
            .map(Bar::try_from)
            .collect::<Result<Vec<_>>>()?;

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(symbol, since);
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        wtr.write_record(HEADER)?;
        for bar in &bars {
            wtr.serialize(bar)?;
        }
        wtr.flush()?;

        info!(
            path = %path.display(),
            rows = bars.len(),
            elapsed_secs = start.elapsed().as_secs(),
            "Historical data saved"
        );
        Ok(CacheHandle { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::kline::Kline;
    use crate::model::price::Price;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
        closes: Vec<&'static str>,
    }

    impl CountingSource {
        fn new(closes: Vec<&'static str>) -> Self {
            CountingSource {
                calls: Cell::new(0),
                closes,
            }
        }
    }

    impl KlineSource for CountingSource {
        fn historical_klines(&self, _: &str, _: Interval, _: &str) -> Result<Vec<Kline>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self
                .closes
                .iter()
                .enumerate()
                .map(|(i, c)| Kline {
                    open_time: 1609459200000 + i as i64 * 60_000,
                    open: "100.00000000".into(),
                    high: "110.50000000".into(),
                    low: "90.25000000".into(),
                    close: c.to_string(),
                    volume: "1".into(),
                    close_time: 1609459259999 + i as i64 * 60_000,
                    quote_asset_volume: "1".into(),
                    number_of_trades: 1,
                    taker_buy_base_asset_volume: "1".into(),
                    taker_buy_quote_asset_volume: "1".into(),
                    ignore: "0".into(),
                })
                .collect())
        }
    }

    struct FailingSource;

    impl KlineSource for FailingSource {
        fn historical_klines(&self, _: &str, _: Interval, _: &str) -> Result<Vec<Kline>> {
            Err(Error::Api {
                status: 418,
                body: "banned".into(),
            })
        }
    }

    #[test]
    fn test_parse_since_formats() {
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(parse_since("1 Jan 2021").unwrap(), d);
        assert_eq!(parse_since("01 Jan 2021").unwrap(), d);
        assert_eq!(parse_since("2021-01-01").unwrap(), d);
        assert!(parse_since("Jan 1st").is_err());
    }

    #[test]
    fn test_key_matches_symbol_and_since() {
        assert_eq!(
            HistoricalDataCache::key("ETHUSDT", "1 Jan 2021"),
            "ETHUSDT_1 Jan 2021.csv"
        );
    }

    #[test]
    fn test_miss_fetches_once_and_writes_header_plus_rows() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoricalDataCache::new(dir.path().join("assets"));
        let source = CountingSource::new(vec!["100.00000000", "101.50000000", "99.00000000"]);

        let handle = cache
            .fetch(&source, "ETHUSDT", "1 Jan 2021", Interval::OneMinute)
            .unwrap();

        assert_eq!(source.calls.get(), 1);
        let text = fs::read_to_string(handle.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3 + 1);
        assert_eq!(lines[0], "timestamp,high,low,open,close");
        assert_eq!(
            lines[1],
            "1609459200000,110.50000000,90.25000000,100.00000000,100.00000000"
        );
    }

    #[test]
    fn test_hit_skips_exchange() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ETHUSDT_1 Jan 2021.csv"), "anything").unwrap();
        let cache = HistoricalDataCache::new(dir.path());
        let source = CountingSource::new(vec!["1"]);

        let handle = cache
            .fetch(&source, "ETHUSDT", "1 Jan 2021", Interval::OneMinute)
            .unwrap();

        assert_eq!(source.calls.get(), 0);
        // no content validation on a hit
        assert_eq!(fs::read_to_string(handle.path()).unwrap(), "anything");
    }

    #[test]
    fn test_second_fetch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoricalDataCache::new(dir.path());
        let source = CountingSource::new(vec!["100.0", "101.5"]);

        let first = cache
            .fetch(&source, "ETHUSDT", "1 Jan 2021", Interval::OneMinute)
            .unwrap();
        let before = fs::read(first.path()).unwrap();
        let second = cache
            .fetch(&source, "ETHUSDT", "1 Jan 2021", Interval::FiveMinutes)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(fs::read(second.path()).unwrap(), before);
    }

    #[test]
    fn test_load_round_trips_exact_prices() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoricalDataCache::new(dir.path());
        let source = CountingSource::new(vec!["100.0", "101.5"]);

        let bars = cache
            .fetch(&source, "BTCUSDT", "2021-01-01", Interval::OneHour)
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].timestamp, 1609459260000);
        assert_eq!(bars[1].close, Price("101.5".parse().unwrap()));
        assert_eq!(bars[0].high, Price("110.5".parse().unwrap()));
    }

    #[test]
    fn test_exchange_error_propagates_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoricalDataCache::new(dir.path());

        let r = cache.fetch(&FailingSource, "ETHUSDT", "1 Jan 2021", Interval::OneMinute);

        assert!(matches!(r, Err(Error::Api { status: 418, .. })));
        assert!(cache.existing("ETHUSDT", "1 Jan 2021").is_none());
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HistoricalDataCache::new(dir.path());
        let source = CountingSource::new(vec![]);
        let r = cache.fetch(&source, "", "1 Jan 2021", Interval::OneMinute);
        assert!(matches!(r, Err(Error::EmptySymbol)));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_existing_refuses_to_leave_cache_dir() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("secret_x.csv"), "timestamp,high,low,open,close\n").unwrap();
        let cache = HistoricalDataCache::new(root.path().join("assets"));
        fs::create_dir_all(root.path().join("assets")).unwrap();

        assert!(cache.existing("../secret", "x").is_none());
        assert!(cache.existing("..\\secret", "x").is_none());
        assert!(cache.existing("ETHUSDT", "../../etc/passwd").is_none());
    }

    #[test]
    fn test_fetch_rejects_traversal_before_exchange() {
        let root = tempfile::tempdir().unwrap();
        let cache = HistoricalDataCache::new(root.path().join("assets"));
        let source = CountingSource::new(vec!["1"]);

        let r = cache.fetch(&source, "../ETHUSDT", "1 Jan 2021", Interval::OneMinute);

        assert!(matches!(r, Err(Error::InvalidCacheKey(ref s)) if s == "../ETHUSDT"));
        assert_eq!(source.calls.get(), 0);
        assert!(!root.path().join("ETHUSDT_1 Jan 2021.csv").exists());
    }
}
