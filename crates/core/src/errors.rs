//! Core error types for chainlens analysis modules.

use chainlens_market_data::errors::MarketDataError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analysis layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("Unknown analysis module: {0}")]
    UnknownModule(String),

    #[error("No liquid data found for {0}")]
    NoData(String),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error was raised before any market data was requested.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::MissingConfigKey(_) => true,
            Error::MarketData(e) => matches!(e, MarketDataError::ConfigMissing(_)),
            _ => false,
        }
    }
}
