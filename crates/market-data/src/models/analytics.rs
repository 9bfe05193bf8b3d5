use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::option_chain::OptionChainEntry;
use super::quote::NormalizedQuote;
use super::types::{CanonicalSymbol, InstrumentKey};

/// What an analytics request should include beyond the spot quote.
#[derive(Clone, Debug, Default)]
pub struct AnalysisOptions {
    /// Fetch and extract the option chain.
    pub include_chain: bool,

    /// Compute the futures basis against the spot quote.
    pub include_basis: bool,

    /// Option chain expiry; the nearest expiry is selected when unset.
    pub expiry: Option<NaiveDate>,

    /// Canonical symbol of the futures contract to use for the basis.
    /// The nearest unexpired contract for the underlying is used when unset.
    pub futures_symbol: Option<CanonicalSymbol>,
}

impl AnalysisOptions {
    pub fn spot_only() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self) -> Self {
        self.include_chain = true;
        self
    }

    pub fn with_basis(mut self) -> Self {
        self.include_basis = true;
        self
    }

    pub fn expiry(mut self, expiry: NaiveDate) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn futures_symbol(mut self, symbol: &str) -> Self {
        self.futures_symbol = Some(symbol.into());
        self
    }
}

/// A listed futures contract for an underlying.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesContract {
    pub instrument_key: InstrumentKey,
    pub underlying: String,
    pub expiry: NaiveDate,
}

/// Whether futures trade above or below spot.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BasisStance {
    Premium,
    Discount,
    Flat,
}

/// Futures basis against the spot price of the same underlying.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesBasis {
    pub futures_key: InstrumentKey,
    pub futures_price: Decimal,
    pub spot_price: Decimal,
    /// `futures_price - spot_price`
    pub basis: Decimal,
    /// `basis / spot_price * 100`
    pub basis_pct: Decimal,
    pub stance: BasisStance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
    /// Session change of the futures leg against its previous close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub futures_change: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub futures_change_pct: Option<Decimal>,
}

/// Sentiment bands for the put/call open-interest ratio.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PcrSentiment {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

/// Aggregate statistics over an option chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary {
    pub total_call_oi: Decimal,
    pub total_put_oi: Decimal,
    /// Put OI / call OI; unset when there is no call OI.
    pub pcr: Option<Decimal>,
    pub sentiment: Option<PcrSentiment>,
    /// Strike at which option writers lose the least at expiry.
    pub max_pain_strike: Option<Decimal>,
    pub max_pain_distance_pct: Option<Decimal>,
    /// Strike with the highest call open interest.
    pub call_resistance: Option<Decimal>,
    /// Strike with the highest put open interest.
    pub put_support: Option<Decimal>,
    /// Sum of delta times open interest across both sides.
    pub net_delta: f64,
    /// Sum of theta times open interest across both sides.
    pub net_theta: f64,
    /// Sum of vega times open interest across both sides.
    pub net_vega: f64,
    /// Strike with the largest gamma exposure.
    pub max_gamma_strike: Option<Decimal>,
    /// Number of strikes the statistics were computed over.
    pub strikes_considered: usize,
}

/// Terminal output of one analytics request.
///
/// Never built from a payload whose top-level status is not success.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub canonical: CanonicalSymbol,
    pub resolved_key: InstrumentKey,
    pub quote: NormalizedQuote,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Vec<OptionChainEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_summary: Option<ChainSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis: Option<FuturesBasis>,
}

impl AnalyticsRecord {
    pub fn new(canonical: CanonicalSymbol, resolved_key: InstrumentKey, quote: NormalizedQuote) -> Self {
        Self {
            canonical,
            resolved_key,
            quote,
            chain: None,
            expiry: None,
            chain_summary: None,
            basis: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_options_builder() {
        let expiry = NaiveDate::from_ymd_opt(2026, 10, 27).unwrap();
        let options = AnalysisOptions::spot_only()
            .with_chain()
            .with_basis()
            .expiry(expiry)
            .futures_symbol("NIFTY26OCTFUT");

        assert!(options.include_chain);
        assert!(options.include_basis);
        assert_eq!(options.expiry, Some(expiry));
        assert_eq!(options.futures_symbol.as_deref(), Some("NIFTY26OCTFUT"));
    }

    #[test]
    fn test_record_omits_unrequested_sections() {
        let quote = NormalizedQuote::new(Arc::from("NSE_INDEX|Nifty 50"), dec!(24500));
        let record = AnalyticsRecord::new(Arc::from("^NSEI"), Arc::from("NSE_INDEX|Nifty 50"), quote);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["resolvedKey"], "NSE_INDEX|Nifty 50");
        assert!(json.get("chain").is_none());
        assert!(json.get("basis").is_none());
    }
}
