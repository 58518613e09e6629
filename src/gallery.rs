use axum::{
    extract,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use charming::HtmlRenderer;
use clap::{Arg, ArgAction, Command};
use std::net::SocketAddr;
use threshold_backtest::backtest;
use threshold_backtest::cache::HistoricalDataCache;
use threshold_backtest::chart::chart;
use threshold_backtest::config::RunConfig;
use threshold_backtest::logging;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("gallery")
        .version("1.0")
        .about("Serves candlestick charts of cached backtests at /:symbol/:since")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity"),
        )
        .get_matches();
    logging::init(matches.get_count("verbose"));

    let app = Router::new().route("/:symbol/:since", get(render));

    let addr: SocketAddr = "127.0.0.1:5555".parse()?;
    info!(%addr, "gallery listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn render(
    extract::Path((symbol, since)): extract::Path<(String, String)>,
) -> impl IntoResponse {
    let config = RunConfig::default();
    let cache = HistoricalDataCache::new(&config.cache_dir);

    let Some(handle) = cache.existing(&symbol, &since) else {
        return (
            StatusCode::NOT_FOUND,
            format!("{symbol} since {since} is not cached"),
        )
            .into_response();
    };

    // file read and simulation are blocking work
    let rendered = tokio::task::spawn_blocking(move || {
        let bars = handle.load()?;
        let result = backtest::run(&config, bars.clone())?;
        Ok::<_, threshold_backtest::Error>((bars, result))
    })
    .await;
    let (bars, result) = match rendered {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => {
            warn!(%symbol, %since, error = %e, "backtest failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
        Err(e) => {
            warn!(%symbol, %since, error = %e, "backtest task failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let title = format!("{symbol} - {since}");
    let renderer = HtmlRenderer::new(title, 1000, 800)
        .theme(charming::theme::Theme::Westeros);
    match renderer.render(&chart(&symbol, &bars, &result)) {
        Ok(html) => Html(html).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:?}")).into_response(),
    }
}
