use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Price fetch failed for {symbol}: {message}")]
    PriceFetch { symbol: String, message: String },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl AppError {
    /// Shorthand for a per-symbol price feed failure.
    pub fn price_fetch(symbol: &str, message: impl Into<String>) -> Self {
        AppError::PriceFetch {
            symbol: symbol.to_string(),
            message: message.into(),
        }
    }
}
