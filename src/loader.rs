use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use threshold_backtest::cache::HistoricalDataCache;
use threshold_backtest::config::RunConfig;
use threshold_backtest::exchange::BinanceClient;
use threshold_backtest::logging;
use tracing::info;

fn main() -> Result<()> {
    let matches = Command::new("loader")
        .version("1.0")
        .about("Downloads historical klines into the local cache unless already cached")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .get_matches();
    logging::init(matches.get_count("verbose"));

    let config = RunConfig::default();
    let cache = HistoricalDataCache::new(&config.cache_dir);
    let client = BinanceClient::new()?;

    let handle = cache.fetch(&client, &config.symbol, &config.since, config.interval)?;
    info!(path = %handle.path().display(), "cache ready");

    Ok(())
}
