use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::errors::MarketDataError;
use crate::models::{InstrumentKey, NormalizedQuote, RawQuoteBlob};
use crate::resolver::{same_instrument_key, with_delimiter, KEY_DELIMITERS};

use super::values::{as_decimal, first_decimal};

/// Accepted names for the last traded price, in priority order.
pub const PRICE_ALIASES: &[&str] = &["last_price", "ltp", "lastPrice"];
/// Accepted names for open interest, in priority order.
pub const OPEN_INTEREST_ALIASES: &[&str] = &["oi", "open_interest", "openInterest"];
/// Accepted names for traded volume, in priority order.
pub const VOLUME_ALIASES: &[&str] = &["volume", "total_volume", "vtt"];

const NET_CHANGE_FIELD: &str = "net_change";
const INSTRUMENT_TOKEN_FIELD: &str = "instrument_token";

/// How the entry for an instrument was found inside a payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryLocator {
    /// `data` keyed by the instrument key written with this delimiter.
    Delimiter(char),
    /// An entry whose `instrument_token` equals the key.
    InstrumentToken,
}

/// Delimiter variant and price alias that worked for an instrument key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QuoteShape {
    pub locator: EntryLocator,
    pub price_alias: &'static str,
}

/// Turns heterogeneous quote payloads into [`NormalizedQuote`]s.
///
/// For each instrument key the normalizer tries every delimiter variant of
/// the key and every alias of the price field until one yields a price. The
/// working combination is remembered per key and tried first next time.
#[derive(Default)]
pub struct ResponseNormalizer {
    shapes: RwLock<HashMap<String, QuoteShape>>,
}

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_shapes(&self) -> RwLockReadGuard<'_, HashMap<String, QuoteShape>> {
        self.shapes.read().unwrap_or_else(|poisoned| {
            warn!("Normalizer shape lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_shapes(&self) -> RwLockWriteGuard<'_, HashMap<String, QuoteShape>> {
        self.shapes.write().unwrap_or_else(|poisoned| {
            warn!("Normalizer shape lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// The shape remembered for `instrument_key`, if any.
    pub fn learned_shape(&self, instrument_key: &str) -> Option<QuoteShape> {
        self.read_shapes().get(instrument_key).copied()
    }

    /// Forget the shape remembered for `instrument_key`.
    pub fn forget(&self, instrument_key: &str) {
        self.write_shapes().remove(instrument_key);
    }

    /// Extract the quote for `instrument_key` from `blob`.
    ///
    /// Fails with `MalformedResponse` when the top-level status is not
    /// success, or when no delimiter/alias combination yields a price.
    pub fn normalize(
        &self,
        blob: &RawQuoteBlob,
        instrument_key: &str,
    ) -> Result<NormalizedQuote, MarketDataError> {
        if !blob.is_success() {
            let reason = match (blob.status(), blob.error_message()) {
                (_, Some(message)) => format!("provider rejected request: {}", message),
                (Some(status), None) => format!("status is '{}'", status),
                (None, None) => "missing status".to_string(),
            };
            return Err(MarketDataError::malformed(instrument_key, reason));
        }

        let data = blob
            .data_object()
            .ok_or_else(|| MarketDataError::malformed(instrument_key, "missing data section"))?;

        if let Some(shape) = self.learned_shape(instrument_key) {
            if let Some(quote) = apply_shape(data, instrument_key, shape) {
                return Ok(quote);
            }
            debug!(
                "Learned shape {:?} no longer matches payload for {}",
                shape, instrument_key
            );
        }

        for shape in candidate_shapes() {
            if let Some(quote) = apply_shape(data, instrument_key, shape) {
                debug!("Learned shape {:?} for {}", shape, instrument_key);
                self.write_shapes().insert(instrument_key.to_string(), shape);
                return Ok(quote);
            }
        }

        Err(MarketDataError::malformed(
            instrument_key,
            "no price field under any delimiter or alias",
        ))
    }
}

/// Every locator/alias combination in trial order.
fn candidate_shapes() -> impl Iterator<Item = QuoteShape> {
    KEY_DELIMITERS
        .into_iter()
        .map(EntryLocator::Delimiter)
        .chain(std::iter::once(EntryLocator::InstrumentToken))
        .flat_map(|locator| {
            PRICE_ALIASES.iter().copied().map(move |price_alias| QuoteShape {
                locator,
                price_alias,
            })
        })
}

fn locate<'a>(
    data: &'a Map<String, Value>,
    instrument_key: &str,
    locator: EntryLocator,
) -> Option<&'a Map<String, Value>> {
    match locator {
        EntryLocator::Delimiter(delimiter) => data
            .get(&with_delimiter(instrument_key, delimiter))
            .and_then(Value::as_object),
        EntryLocator::InstrumentToken => data.values().filter_map(Value::as_object).find(|entry| {
            entry
                .get(INSTRUMENT_TOKEN_FIELD)
                .and_then(Value::as_str)
                .is_some_and(|token| same_instrument_key(token, instrument_key))
        }),
    }
}

fn apply_shape(
    data: &Map<String, Value>,
    instrument_key: &str,
    shape: QuoteShape,
) -> Option<NormalizedQuote> {
    let entry = locate(data, instrument_key, shape.locator)?;
    let last_price = entry.get(shape.price_alias).and_then(as_decimal)?;

    let mut quote = NormalizedQuote::new(InstrumentKey::from(instrument_key), last_price);
    quote.open_interest = first_decimal(entry, OPEN_INTEREST_ALIASES).map(|(_, v)| v);
    quote.volume = first_decimal(entry, VOLUME_ALIASES).map(|(_, v)| v);
    quote.close_price = entry
        .get("ohlc")
        .and_then(|ohlc| ohlc.get("close"))
        .and_then(as_decimal);
    quote.net_change = entry.get(NET_CHANGE_FIELD).and_then(as_decimal);
    Some(quote)
}
