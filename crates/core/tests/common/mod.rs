//! Broker double and engine fixtures shared by the module tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chainlens_market_data::errors::MarketDataError;
use chainlens_market_data::provider::{InstrumentProvider, ProviderCapabilities};
use chainlens_market_data::{
    AnalyticsEngine, CacheConfig, FuturesContract, InstrumentKey, MappingCache, RawQuoteBlob,
    ResolverConfig, UniverseEntry,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

pub const NIFTY: &str = "NSE_INDEX|Nifty 50";
pub const NIFTY_FUT: &str = "NSE_FO|51001";
pub const TOKEN_KEY: &str = "UPSTOX_ACCESS_TOKEN";

/// Monday 2026-10-19, 10:00 in Kolkata.
pub fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 4, 30, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Broker serving Nifty 50 spot, one weekly chain and one futures contract.
#[derive(Default)]
pub struct NiftyBroker {
    quotes: HashMap<String, Value>,
    chain: Option<Value>,
    pub quote_calls: AtomicUsize,
}

impl NiftyBroker {
    pub fn new() -> Self {
        let mut quotes = HashMap::new();
        quotes.insert(NIFTY.to_string(), json!({ "last_price": 24500.0 }));
        quotes.insert(
            NIFTY_FUT.to_string(),
            json!({ "last_price": 24650.0, "net_change": 150.0 }),
        );
        Self {
            quotes,
            chain: Some(nifty_chain()),
            quote_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_chain(mut self) -> Self {
        self.chain = None;
        self
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstrumentProvider for NiftyBroker {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_option_chain: true,
            supports_futures: true,
            supports_universe: true,
        }
    }

    async fn fetch_quote(&self, instrument_key: &str) -> Result<RawQuoteBlob, MarketDataError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let payload = match self.quotes.get(instrument_key) {
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
        Ok(vec![Arc::from(NIFTY), Arc::from("NSE_INDEX|Nifty Bank")])
    }

    async fn fetch_universe_entries(&self) -> Result<Vec<UniverseEntry>, MarketDataError> {
        Ok(vec![
            UniverseEntry::new(NIFTY),
            UniverseEntry::new("NSE_INDEX|Nifty Bank"),
        ])
    }

    async fn fetch_option_chain(
        &self,
        _instrument_key: &str,
        _expiry: NaiveDate,
    ) -> Result<RawQuoteBlob, MarketDataError> {
        let payload = self
            .chain
            .clone()
            .unwrap_or_else(|| json!({"status": "success", "data": []}));
        Ok(RawQuoteBlob::new(payload))
    }

    async fn fetch_option_expiries(
        &self,
        _underlying_key: &str,
    ) -> Result<Vec<NaiveDate>, MarketDataError> {
        Ok(vec![date(2026, 10, 27), date(2026, 10, 20)])
    }

    async fn fetch_futures_contracts(
        &self,
        underlying_key: &str,
    ) -> Result<Vec<FuturesContract>, MarketDataError> {
        if underlying_key != NIFTY {
            return Ok(Vec::new());
        }
        Ok(vec![FuturesContract {
            instrument_key: Arc::from(NIFTY_FUT),
            underlying: "NIFTY".to_string(),
            expiry: date(2026, 10, 27),
        }])
    }
}

/// Two strikes around 24500 spot; the 24600 put omits its Greeks.
pub fn nifty_chain() -> Value {
    json!({
        "status": "success",
        "data": [
            {
                "strike_price": 24600,
                "underlying_spot_price": 24500,
                "call_options": {
                    "instrument_key": "NSE_FO|61011",
                    "market_data": {"ltp": 120.0, "oi": 700000, "prev_oi": 650000, "volume": 90000},
                    "option_greeks": {"delta": 0.41, "gamma": 0.0012, "theta": -10.2, "vega": 11.8, "iv": 13.1}
                },
                "put_options": {
                    "instrument_key": "NSE_FO|61012",
                    "market_data": {"ltp": 205.0, "oi": 300000, "prev_oi": 320000, "volume": 70000}
                }
            },
            {
                "strike_price": 24500,
                "underlying_spot_price": 24500,
                "call_options": {
                    "market_data": {"ltp": 180.0, "oi": 500000},
                    "option_greeks": {"delta": 0.52, "gamma": 0.0013}
                },
                "put_options": {
                    "market_data": {"ltp": 160.0, "oi": 650000},
                    "option_greeks": {"delta": -0.48, "gamma": 0.0013}
                }
            }
        ]
    })
}

pub fn engine(broker: Arc<NiftyBroker>) -> Arc<AnalyticsEngine> {
    let cache = Arc::new(MappingCache::new(CacheConfig::default()));
    Arc::new(
        AnalyticsEngine::new(broker, cache, ResolverConfig::default()).with_clock(monday_morning),
    )
}
