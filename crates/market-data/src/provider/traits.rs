//! Instrument provider trait definitions.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{FuturesContract, InstrumentKey, RawQuoteBlob, UniverseEntry};

use super::capabilities::ProviderCapabilities;

/// Trait for broker API clients.
///
/// Implement this trait to add support for a new broker. The resolver and
/// analytics engine only ever talk to brokers through it.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use chainlens_market_data::provider::{InstrumentProvider, ProviderCapabilities};
///
/// struct MyBroker;
///
/// #[async_trait]
/// impl InstrumentProvider for MyBroker {
///     fn id(&self) -> &'static str {
///         "MY_BROKER"
///     }
///
///     async fn fetch_quote(&self, key: &str) -> Result<RawQuoteBlob, MarketDataError> {
///         // ...
///     }
///
///     async fn fetch_universe(&self) -> Result<Vec<InstrumentKey>, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait InstrumentProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "UPSTOX".
    fn id(&self) -> &'static str;

    /// Describes which optional operations are implemented.
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::default()
    }

    /// Fetch the raw quote payload for an instrument key.
    ///
    /// A payload whose status is not success is still returned as `Ok`;
    /// only transport failures are errors here.
    async fn fetch_quote(&self, instrument_key: &str) -> Result<RawQuoteBlob, MarketDataError>;

    /// Enumerate every instrument key the provider knows about.
    async fn fetch_universe(&self) -> Result<Vec<InstrumentKey>, MarketDataError>;

    /// Enumerate the universe with whatever names the provider lists for
    /// each instrument.
    ///
    /// Default implementation wraps [`fetch_universe`](Self::fetch_universe),
    /// leaving only the key code to match against.
    async fn fetch_universe_entries(&self) -> Result<Vec<UniverseEntry>, MarketDataError> {
        let keys = self.fetch_universe().await?;
        Ok(keys.into_iter().map(UniverseEntry::from).collect())
    }

    /// Fetch the raw option chain payload for an underlying and expiry.
    async fn fetch_option_chain(
        &self,
        instrument_key: &str,
        expiry: NaiveDate,
    ) -> Result<RawQuoteBlob, MarketDataError> {
        let _ = (instrument_key, expiry);
        Err(MarketDataError::NotSupported {
            operation: "option_chain".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// List the option expiries available for an underlying, in any order.
    ///
    /// Default implementation lists none, leaving expiry selection to the
    /// weekly schedule.
    async fn fetch_option_expiries(
        &self,
        underlying_key: &str,
    ) -> Result<Vec<NaiveDate>, MarketDataError> {
        let _ = underlying_key;
        Ok(Vec::new())
    }

    /// List futures contracts for an underlying, in any order.
    ///
    /// Default implementation lists none.
    async fn fetch_futures_contracts(
        &self,
        underlying_key: &str,
    ) -> Result<Vec<FuturesContract>, MarketDataError> {
        let _ = underlying_key;
        Ok(Vec::new())
    }
}
