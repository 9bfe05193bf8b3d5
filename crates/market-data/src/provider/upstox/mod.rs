//! Upstox provider implementation.
//!
//! Fetches quotes and option chains from the Upstox v2 REST API with Bearer
//! token authentication. The instrument universe, futures contracts and option
//! expiries come from a local copy of the instrument master.
//!
//! # API Endpoints
//!
//! - Full market quote: `{base}/market-quote/quotes?instrument_key={key}`
//! - Option chain: `{base}/option/chain?instrument_key={key}&expiry_date={YYYY-MM-DD}`
//!
//! # Response Format
//!
//! Every response carries a top-level `status` ("success" or "error"). Quote
//! data is keyed by instrument, and the key in the response may use `:` where
//! the request used `|`.

mod master;

pub use master::{InstrumentMaster, MasterInstrument};

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{header, Client, StatusCode};

use crate::errors::MarketDataError;
use crate::models::{FuturesContract, InstrumentKey, RawQuoteBlob, UniverseEntry};
use crate::provider::{InstrumentProvider, ProviderCapabilities};

pub const DEFAULT_BASE_URL: &str = "https://api.upstox.com/v2";
const PROVIDER_ID: &str = "UPSTOX";

/// Configuration key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "UPSTOX_ACCESS_TOKEN";
/// Configuration key of the instrument master file.
pub const INSTRUMENT_MASTER_KEY: &str = "CHAINLENS_INSTRUMENT_MASTER";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstox client for quotes and option chains.
///
/// # Example
///
/// ```ignore
/// let provider = UpstoxProvider::new(Some(token))
///     .with_master(InstrumentMaster::load(Path::new("NSE.json"))?);
/// let blob = provider.fetch_quote("NSE_EQ|INE154A01025").await?;
/// ```
pub struct UpstoxProvider {
    client: Client,
    access_token: Option<String>,
    base_url: String,
    master: Option<InstrumentMaster>,
}

impl UpstoxProvider {
    /// Create a provider. A missing token is reported on first use, before
    /// any request is sent.
    pub fn new(access_token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            master: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_master(mut self, master: InstrumentMaster) -> Self {
        self.master = Some(master);
        self
    }

    /// Attach the instrument master stored at `path`.
    pub fn with_master_file(self, path: &Path) -> Result<Self, MarketDataError> {
        let master = InstrumentMaster::load(path)?;
        Ok(self.with_master(master))
    }

    fn token(&self) -> Result<&str, MarketDataError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| MarketDataError::ConfigMissing(ACCESS_TOKEN_KEY.to_string()))
    }

    fn master(&self) -> Result<&InstrumentMaster, MarketDataError> {
        self.master
            .as_ref()
            .ok_or_else(|| MarketDataError::ConfigMissing(INSTRUMENT_MASTER_KEY.to_string()))
    }

    /// Issue a GET and hand back the payload.
    ///
    /// Instrument-level rejections (400/404) still carry a status payload and
    /// are returned for the normalizer to judge. Auth and server failures are
    /// errors because they say nothing about the instrument.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RawQuoteBlob, MarketDataError> {
        let token = self.token()?;
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let instrument_rejection =
            status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND;
        if !status.is_success() && !instrument_rejection {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP error: {}", status),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })?;

        RawQuoteBlob::from_json_str(&body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse response ({}): {}", status, e),
        })
    }
}

#[async_trait]
impl InstrumentProvider for UpstoxProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_option_chain: true,
            supports_futures: self.master.is_some(),
            supports_universe: self.master.is_some(),
        }
    }

    async fn fetch_quote(&self, instrument_key: &str) -> Result<RawQuoteBlob, MarketDataError> {
        self.get("/market-quote/quotes", &[("instrument_key", instrument_key)])
            .await
    }

    async fn fetch_universe(&self) -> Result<Vec<InstrumentKey>, MarketDataError> {
        Ok(self.master()?.keys())
    }

    async fn fetch_universe_entries(&self) -> Result<Vec<UniverseEntry>, MarketDataError> {
        Ok(self.master()?.entries())
    }

    async fn fetch_option_chain(
        &self,
        instrument_key: &str,
        expiry: NaiveDate,
    ) -> Result<RawQuoteBlob, MarketDataError> {
        let expiry = expiry.format("%Y-%m-%d").to_string();
        self.get(
            "/option/chain",
            &[("instrument_key", instrument_key), ("expiry_date", &expiry)],
        )
        .await
    }

    async fn fetch_option_expiries(
        &self,
        underlying_key: &str,
    ) -> Result<Vec<NaiveDate>, MarketDataError> {
        Ok(self
            .master
            .as_ref()
            .map(|m| m.option_expiries_for(underlying_key))
            .unwrap_or_default())
    }

    async fn fetch_futures_contracts(
        &self,
        underlying_key: &str,
    ) -> Result<Vec<FuturesContract>, MarketDataError> {
        Ok(self.master()?.futures_for(underlying_key))
    }
}
