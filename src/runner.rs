use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use threshold_backtest::backtest;
use threshold_backtest::cache::HistoricalDataCache;
use threshold_backtest::config::RunConfig;
use threshold_backtest::exchange::BinanceClient;
use threshold_backtest::logging;
use tracing::{debug, info};

fn main() -> Result<()> {
    let matches = Command::new("runner")
        .version("1.0")
        .about("Backtests the threshold strategy over cached (or freshly fetched) klines")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity; -v logs every close, -vv adds trace output"),
        )
        .get_matches();
    logging::init(matches.get_count("verbose"));

    let config = RunConfig::default();
    let cache = HistoricalDataCache::new(&config.cache_dir);
    let client = BinanceClient::new()?;

    let handle = cache.fetch(&client, &config.symbol, &config.since, config.interval)?;
    let bars = handle.load()?;
    info!(path = %handle.path().display(), bars = bars.len(), "loaded");

    let result = backtest::run(&config, bars)?;
    debug!("{:#?}", result);

    for trade in &result.trades {
        info!(
            entry = %trade.entry,
            exit = %trade.exit,
            pnl = %trade.pnl().round_dp(2),
            return_pct = ?trade.return_pct().map(|r| r.round_dp(2)),
            result = ?trade.result,
            "trade"
        );
    }

    info!(
        starting = %result.starting_value,
        final_value = %result.final_value.round_dp(2),
        return_pct = %result.total_return_pct().round_dp(2),
        trades = result.number_of_trades(),
        "done"
    );

    Ok(())
}
