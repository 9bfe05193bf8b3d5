//! Option chain extraction.
//!
//! Expected payload (one row per strike):
//!
//! ```json
//! {
//!   "status": "success",
//!   "data": [{
//!     "strike_price": 24500,
//!     "underlying_spot_price": 24512.3,
//!     "call_options": {
//!       "instrument_key": "NSE_FO|61001",
//!       "market_data": {"ltp": 182.5, "volume": 120000, "oi": 560000, "prev_oi": 510000},
//!       "option_greeks": {"delta": 0.52, "gamma": 0.0011, "theta": -9.8, "vega": 12.1, "iv": 13.4}
//!     },
//!     "put_options": { ... }
//!   }]
//! }
//! ```

use log::{debug, warn};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::errors::MarketDataError;
use crate::models::{OptionChainEntry, OptionGreeks, OptionLeg, RawQuoteBlob};
use crate::normalizer::values::{as_decimal, as_f64, first_decimal};

const CALL_SECTION: &str = "call_options";
const PUT_SECTION: &str = "put_options";
const MARKET_DATA_SECTION: &str = "market_data";
const GREEKS_SECTION: &str = "option_greeks";

const LTP_ALIASES: &[&str] = &["ltp", "last_price"];
const OI_ALIASES: &[&str] = &["oi", "open_interest"];
const PREV_OI_ALIASES: &[&str] = &["prev_oi", "previous_oi"];
const VOLUME_ALIASES: &[&str] = &["volume", "total_volume"];

/// Extracts per-strike market data and Greeks from an option chain payload.
///
/// Missing nested sections leave the matching fields unset instead of failing
/// the extraction. Every entry comes from the one payload passed in.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreeksExtractor;

impl GreeksExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the chain for `underlying_key`, ordered by strike.
    ///
    /// A missing or empty chain list is an empty result. Rows without a
    /// readable strike are skipped.
    pub fn extract(
        &self,
        blob: &RawQuoteBlob,
        underlying_key: &str,
    ) -> Result<Vec<OptionChainEntry>, MarketDataError> {
        if !blob.is_success() {
            let reason = blob
                .error_message()
                .map(|m| format!("provider rejected option chain: {}", m))
                .unwrap_or_else(|| "option chain status is not success".to_string());
            return Err(MarketDataError::malformed(underlying_key, reason));
        }

        let rows = match blob.data() {
            None => return Ok(Vec::new()),
            Some(Value::Array(rows)) => rows,
            Some(_) => {
                return Err(MarketDataError::malformed(
                    underlying_key,
                    "option chain data is not a list",
                ))
            }
        };

        let mut entries: Vec<OptionChainEntry> = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| {
                let entry = row.as_object().and_then(extract_entry);
                if entry.is_none() {
                    warn!(
                        "Skipping option chain row {} for {}: no strike price",
                        idx, underlying_key
                    );
                }
                entry
            })
            .collect();

        entries.sort_by(|a, b| a.strike_price.cmp(&b.strike_price));
        debug!(
            "Extracted {} strikes for {}",
            entries.len(),
            underlying_key
        );
        Ok(entries)
    }

    /// Spot price of the underlying as reported alongside the chain.
    pub fn underlying_spot(&self, blob: &RawQuoteBlob) -> Option<Decimal> {
        blob.data()?
            .as_array()?
            .iter()
            .find_map(|row| row.get("underlying_spot_price").and_then(as_decimal))
    }
}

fn extract_entry(row: &Map<String, Value>) -> Option<OptionChainEntry> {
    let strike_price = row.get("strike_price").and_then(as_decimal)?;
    Some(OptionChainEntry {
        strike_price,
        call: extract_leg(row.get(CALL_SECTION)),
        put: extract_leg(row.get(PUT_SECTION)),
    })
}

fn extract_leg(section: Option<&Value>) -> OptionLeg {
    let Some(section) = section.and_then(Value::as_object) else {
        return OptionLeg::default();
    };

    let mut leg = OptionLeg {
        instrument_key: section
            .get("instrument_key")
            .and_then(Value::as_str)
            .map(str::to_string),
        greeks: section
            .get(GREEKS_SECTION)
            .and_then(Value::as_object)
            .map(extract_greeks)
            .filter(|g| !g.is_empty()),
        ..OptionLeg::default()
    };

    if let Some(market) = section.get(MARKET_DATA_SECTION).and_then(Value::as_object) {
        let read = |aliases: &[&str]| first_decimal(market, aliases).map(|(_, v)| v);
        leg.ltp = read(LTP_ALIASES);
        leg.open_interest = read(OI_ALIASES);
        leg.prev_open_interest = read(PREV_OI_ALIASES);
        leg.volume = read(VOLUME_ALIASES);
    }
    leg
}

fn extract_greeks(section: &Map<String, Value>) -> OptionGreeks {
    let read = |field: &str| section.get(field).and_then(as_f64);
    OptionGreeks {
        delta: read("delta"),
        gamma: read("gamma"),
        theta: read("theta"),
        vega: read("vega"),
        iv: read("iv"),
        pop: read("pop"),
    }
}
