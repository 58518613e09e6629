use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` takes precedence; otherwise
/// each `-v` raises the level one step above info.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
