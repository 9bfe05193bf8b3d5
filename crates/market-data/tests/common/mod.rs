//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chainlens_market_data::errors::MarketDataError;
use chainlens_market_data::provider::{InstrumentProvider, ProviderCapabilities};
use chainlens_market_data::{
    CacheConfig, FuturesContract, InstrumentKey, MappingCache, RawQuoteBlob, UniverseEntry,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

/// In-memory provider that counts every call.
///
/// Quotes are answered from a table keyed by instrument key; unknown keys
/// get the broker's "invalid instrument" error payload.
#[derive(Default)]
pub struct MockProvider {
    quotes: Mutex<HashMap<String, Value>>,
    universe: Mutex<Vec<UniverseEntry>>,
    chains: Mutex<HashMap<String, Value>>,
    expiries: Mutex<HashMap<String, Vec<NaiveDate>>>,
    futures: Mutex<HashMap<String, Vec<FuturesContract>>>,
    fail_with: Mutex<Option<fn() -> MarketDataError>>,
    capabilities: Mutex<Option<ProviderCapabilities>>,
    stalled: AtomicBool,
    pub quote_calls: AtomicUsize,
    pub universe_calls: AtomicUsize,
    pub chain_calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `last_price` for `key`, keyed in the payload with `:` like the
    /// live quote endpoint does.
    pub fn with_quote(self, key: &str, last_price: f64) -> Self {
        self.set_quote(key, json!({ "last_price": last_price }));
        self
    }

    pub fn set_quote(&self, key: &str, fields: Value) {
        self.quotes.lock().unwrap().insert(key.to_string(), fields);
    }

    pub fn remove_quote(&self, key: &str) {
        self.quotes.lock().unwrap().remove(key);
    }

    pub fn with_universe(self, keys: &[&str]) -> Self {
        self.universe
            .lock()
            .unwrap()
            .extend(keys.iter().map(|k| UniverseEntry::new(k)));
        self
    }

    pub fn with_universe_entry(self, entry: UniverseEntry) -> Self {
        self.universe.lock().unwrap().push(entry);
        self
    }

    pub fn with_chain(self, underlying: &str, payload: Value) -> Self {
        self.chains
            .lock()
            .unwrap()
            .insert(underlying.to_string(), payload);
        self
    }

    pub fn with_expiries(self, underlying: &str, expiries: Vec<NaiveDate>) -> Self {
        self.expiries
            .lock()
            .unwrap()
            .insert(underlying.to_string(), expiries);
        self
    }

    pub fn with_futures(self, underlying: &str, contracts: Vec<FuturesContract>) -> Self {
        self.futures
            .lock()
            .unwrap()
            .insert(underlying.to_string(), contracts);
        self
    }

    pub fn with_capabilities(self, capabilities: ProviderCapabilities) -> Self {
        *self.capabilities.lock().unwrap() = Some(capabilities);
        self
    }

    /// Leave every later quote request pending forever.
    pub fn stall_quotes(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    /// Fail every quote request with the given error.
    pub fn fail_quotes_with(&self, error: fn() -> MarketDataError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn universe_calls(&self) -> usize {
        self.universe_calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl InstrumentProvider for MockProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(ProviderCapabilities {
                supports_option_chain: true,
                supports_futures: true,
                supports_universe: true,
            })
    }

    async fn fetch_quote(&self, instrument_key: &str) -> Result<RawQuoteBlob, MarketDataError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push(instrument_key.to_string());
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(error) = *self.fail_with.lock().unwrap() {
            return Err(error());
        }

        let quotes = self.quotes.lock().unwrap();
        let payload = match quotes.get(instrument_key) {
            Some(fields) => {
                let mut data = serde_json::Map::new();
                data.insert(instrument_key.replacen('|', ":", 1), fields.clone());
                json!({"status": "success", "data": data})
            }
            None => json!({
                "status": "error",
                "errors": [{"errorCode": "UDAPI100011", "message": "Invalid Instrument key"}]
            }),
        };
        Ok(RawQuoteBlob::new(payload))
    }

    async fn fetch_universe(&self) -> Result<Vec<InstrumentKey>, MarketDataError> {
        Ok(self
            .fetch_universe_entries()
            .await?
            .into_iter()
            .map(|e| e.instrument_key)
            .collect())
    }

    async fn fetch_universe_entries(&self) -> Result<Vec<UniverseEntry>, MarketDataError> {
        self.universe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.universe.lock().unwrap().clone())
    }

    async fn fetch_option_chain(
        &self,
        instrument_key: &str,
        _expiry: NaiveDate,
    ) -> Result<RawQuoteBlob, MarketDataError> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        let chains = self.chains.lock().unwrap();
        let payload = chains
            .get(instrument_key)
            .cloned()
            .unwrap_or_else(|| json!({"status": "success", "data": []}));
        Ok(RawQuoteBlob::new(payload))
    }

    async fn fetch_option_expiries(
        &self,
        underlying_key: &str,
    ) -> Result<Vec<NaiveDate>, MarketDataError> {
        Ok(self
            .expiries
            .lock()
            .unwrap()
            .get(underlying_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_futures_contracts(
        &self,
        underlying_key: &str,
    ) -> Result<Vec<FuturesContract>, MarketDataError> {
        Ok(self
            .futures
            .lock()
            .unwrap()
            .get(underlying_key)
            .cloned()
            .unwrap_or_default())
    }
}

/// Universe around the Nifty 50 index with a few near-miss names.
pub fn nifty_universe() -> MockProvider {
    MockProvider::new()
        .with_universe(&[
            "NSE_INDEX|Nifty Bank",
            "NSE_INDEX|Nifty 500",
            "NSE_INDEX|Nifty 50",
            "NSE_EQ|INE154A01025",
        ])
        .with_quote("NSE_INDEX|Nifty 50", 24500.0)
        .with_quote("NSE_INDEX|Nifty 500", 22100.0)
        .with_quote("NSE_INDEX|Nifty Bank", 51200.0)
}

pub fn memory_cache() -> Arc<MappingCache> {
    Arc::new(MappingCache::new(CacheConfig::default()))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
