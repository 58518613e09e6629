use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Exchange API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid price: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Invalid date '{0}', expected e.g. '1 Jan 2021' or '2021-01-01'")]
    InvalidDate(String),

    #[error("Invalid cache key segment '{0}'")]
    InvalidCacheKey(String),

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
