//! Error types and classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for resolution, normalization and analytics
//! - [`ErrorKind`]: The user-facing classification reported at the analytics boundary

mod kind;

pub use kind::ErrorKind;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant maps onto an [`ErrorKind`] via [`kind`](Self::kind).
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// Resolution exhausted the cache, the exact-match probe and the fallback scan.
    /// Not retried automatically: the instrument may be unlisted or delisted.
    #[error("Instrument not found: {0}")]
    NotFound(String),

    /// The payload status was not success, or no delimiter/alias combination
    /// yielded a price field for the instrument.
    #[error("Malformed response for {instrument_key}: {reason}")]
    MalformedResponse {
        /// The instrument key that was being looked up
        instrument_key: String,
        /// What was wrong with the payload
        reason: String,
    },

    /// A required credential or configuration key is absent.
    /// Raised before any network call.
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    /// An analytics computation could not produce a finite result.
    #[error("Computation failed: {0}")]
    Computation(String),

    /// The provider does not implement the requested operation.
    #[error("Operation '{operation}' not supported by {provider}")]
    NotSupported {
        /// The operation that was requested
        operation: String,
        /// The provider that rejected it
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// A provider-specific transport or HTTP error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The mapping store could not be read or written.
    #[error("Mapping store error: {0}")]
    Persistence(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Shorthand for a [`MarketDataError::MalformedResponse`].
    pub fn malformed(instrument_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            instrument_key: instrument_key.into(),
            reason: reason.into(),
        }
    }

    /// Returns the user-facing classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainlens_market_data::errors::{ErrorKind, MarketDataError};
    ///
    /// let error = MarketDataError::NotFound("^NSEI".to_string());
    /// assert_eq!(error.kind(), ErrorKind::NotFound);
    ///
    /// let error = MarketDataError::RateLimited { provider: "UPSTOX".to_string() };
    /// assert_eq!(error.kind(), ErrorKind::Provider);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::ConfigMissing(_) => ErrorKind::ConfigMissing,
            Self::Computation(_) => ErrorKind::Computation,
            Self::Persistence(_) => ErrorKind::Storage,
            Self::NotSupported { .. }
            | Self::RateLimited { .. }
            | Self::ProviderError { .. }
            | Self::Network(_) => ErrorKind::Provider,
        }
    }

    /// Whether this failure, observed while using a cached instrument key,
    /// means the cached mapping has gone stale and should be invalidated.
    ///
    /// Only payload-level rejections qualify. Transport failures say nothing
    /// about the key itself.
    pub fn signals_stale_mapping(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. } | Self::NotFound(_))
    }

    /// Whether a resolution probe that failed with this error should move on
    /// to the next strategy or candidate instead of aborting.
    pub(crate) fn is_probe_miss(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. } | Self::NotFound(_))
    }
}
