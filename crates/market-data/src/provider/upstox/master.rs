//! Upstox instrument master.
//!
//! The broker publishes its full instrument list as a JSON array. A local copy
//! serves as the fallback-scan universe and as the source of futures contracts
//! and option expiries.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Asia::Kolkata;
use log::{debug, info};
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{FuturesContract, InstrumentKey, UniverseEntry};
use crate::resolver::{same_instrument_key, split_instrument_key};

/// One row of the instrument master.
#[derive(Clone, Debug, Deserialize)]
pub struct MasterInstrument {
    pub instrument_key: String,
    #[serde(default)]
    pub trading_symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub instrument_type: Option<String>,
    #[serde(default)]
    pub underlying_key: Option<String>,
    #[serde(default)]
    pub underlying_symbol: Option<String>,
    /// Expiry as epoch milliseconds
    #[serde(default)]
    pub expiry: Option<i64>,
}

impl MasterInstrument {
    fn is_type(&self, kinds: &[&str]) -> bool {
        self.instrument_type
            .as_deref()
            .is_some_and(|t| kinds.iter().any(|k| t.eq_ignore_ascii_case(k)))
    }

    fn is_future(&self) -> bool {
        self.is_type(&["FUT", "FUTIDX", "FUTSTK"])
    }

    fn is_option(&self) -> bool {
        self.is_type(&["CE", "PE", "OPTIDX", "OPTSTK"])
    }

    /// Expiry date on the exchange calendar.
    fn expiry_date(&self) -> Option<NaiveDate> {
        let millis = self.expiry?;
        Kolkata
            .timestamp_millis_opt(millis)
            .single()
            .map(|dt| dt.date_naive())
    }

    /// Whether this derivative is written on the given underlying.
    ///
    /// Matches the underlying key under any delimiter, or the underlying
    /// symbol against the code part of the key.
    fn has_underlying(&self, underlying_key: &str) -> bool {
        if let Some(key) = self.underlying_key.as_deref() {
            if same_instrument_key(key, underlying_key) {
                return true;
            }
        }
        let code = split_instrument_key(underlying_key)
            .map(|(_, code)| code)
            .unwrap_or(underlying_key);
        self.underlying_symbol
            .as_deref()
            .is_some_and(|symbol| symbol.eq_ignore_ascii_case(code))
    }
}

/// In-memory copy of the instrument master.
#[derive(Clone, Debug, Default)]
pub struct InstrumentMaster {
    instruments: Vec<MasterInstrument>,
}

impl InstrumentMaster {
    pub fn new(instruments: Vec<MasterInstrument>) -> Self {
        Self { instruments }
    }

    /// Parse the master from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, MarketDataError> {
        let instruments: Vec<MasterInstrument> = serde_json::from_str(json)
            .map_err(|e| MarketDataError::Persistence(format!("Invalid instrument master: {}", e)))?;
        Ok(Self::new(instruments))
    }

    /// Load the master from a local file.
    pub fn load(path: &Path) -> Result<Self, MarketDataError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MarketDataError::Persistence(format!(
                "Failed to read instrument master {}: {}",
                path.display(),
                e
            ))
        })?;
        let master = Self::from_json_str(&raw)?;
        info!(
            "Loaded {} instruments from {}",
            master.len(),
            path.display()
        );
        Ok(master)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Every instrument key in the master.
    pub fn keys(&self) -> Vec<InstrumentKey> {
        self.instruments
            .iter()
            .map(|i| Arc::from(i.instrument_key.as_str()))
            .collect()
    }

    /// Every instrument with its trading symbol and display name.
    pub fn entries(&self) -> Vec<UniverseEntry> {
        self.instruments
            .iter()
            .map(|i| {
                let mut entry = UniverseEntry::new(&i.instrument_key);
                entry.names.extend(i.trading_symbol.iter().cloned());
                entry.names.extend(i.name.iter().cloned());
                entry
            })
            .collect()
    }

    /// Futures contracts on the underlying, nearest expiry first.
    pub fn futures_for(&self, underlying_key: &str) -> Vec<FuturesContract> {
        let mut contracts: Vec<FuturesContract> = self
            .instruments
            .iter()
            .filter(|i| i.is_future() && i.has_underlying(underlying_key))
            .filter_map(|i| {
                Some(FuturesContract {
                    instrument_key: Arc::from(i.instrument_key.as_str()),
                    underlying: i
                        .underlying_symbol
                        .clone()
                        .unwrap_or_else(|| underlying_key.to_string()),
                    expiry: i.expiry_date()?,
                })
            })
            .collect();
        contracts.sort_by(|a, b| {
            a.expiry
                .cmp(&b.expiry)
                .then_with(|| a.instrument_key.cmp(&b.instrument_key))
        });
        debug!(
            "Found {} futures contracts for {}",
            contracts.len(),
            underlying_key
        );
        contracts
    }

    /// Distinct option expiries on the underlying, ascending.
    pub fn option_expiries_for(&self, underlying_key: &str) -> Vec<NaiveDate> {
        let expiries: BTreeSet<NaiveDate> = self
            .instruments
            .iter()
            .filter(|i| i.is_option() && i.has_underlying(underlying_key))
            .filter_map(MasterInstrument::expiry_date)
            .collect();
        expiries.into_iter().collect()
    }
}
