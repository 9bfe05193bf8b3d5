use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::InstrumentKey;

/// Quote extracted deterministically from a provider payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedQuote {
    /// The instrument key the quote was requested for
    pub instrument_key: InstrumentKey,

    /// Last traded price (required)
    pub last_price: Decimal,

    /// Open interest (derivatives only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_interest: Option<Decimal>,

    /// Traded volume for the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Close from the OHLC section, usually the previous session close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_price: Option<Decimal>,

    /// Absolute change reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_change: Option<Decimal>,
}

impl NormalizedQuote {
    /// Create a quote with only the required fields.
    pub fn new(instrument_key: InstrumentKey, last_price: Decimal) -> Self {
        Self {
            instrument_key,
            last_price,
            open_interest: None,
            volume: None,
            close_price: None,
            net_change: None,
        }
    }

    /// Previous close, preferring the provider's explicit net change.
    ///
    /// When the provider supplies `net_change`, the previous close is
    /// `last_price - net_change`; the OHLC close can equal the last price
    /// intraday and would report no movement.
    pub fn previous_close(&self) -> Option<Decimal> {
        match self.net_change {
            Some(change) => Some(self.last_price - change),
            None => self.close_price,
        }
    }

    /// Absolute change against the previous close.
    pub fn change(&self) -> Option<Decimal> {
        self.net_change
            .or_else(|| self.close_price.map(|close| self.last_price - close))
    }

    /// Percentage change against the previous close, unset when that close is zero.
    pub fn change_pct(&self) -> Option<Decimal> {
        let previous = self.previous_close()?;
        if previous.is_zero() {
            return None;
        }
        Some(self.change()? / previous * Decimal::ONE_HUNDRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_quote_new() {
        let quote = NormalizedQuote::new(Arc::from("NSE_EQ|ITC"), dec!(432.5));
        assert_eq!(quote.last_price, dec!(432.5));
        assert!(quote.open_interest.is_none());
        assert!(quote.change_pct().is_none());
    }

    #[test]
    fn test_change_prefers_net_change() {
        let mut quote = NormalizedQuote::new(Arc::from("NSE_EQ|ITC"), dec!(110));
        quote.close_price = Some(dec!(110));
        quote.net_change = Some(dec!(10));

        assert_eq!(quote.previous_close(), Some(dec!(100)));
        assert_eq!(quote.change(), Some(dec!(10)));
        assert_eq!(quote.change_pct(), Some(dec!(10)));
    }

    #[test]
    fn test_change_falls_back_to_ohlc_close() {
        let mut quote = NormalizedQuote::new(Arc::from("NSE_EQ|ITC"), dec!(99));
        quote.close_price = Some(dec!(100));

        assert_eq!(quote.change(), Some(dec!(-1)));
        assert_eq!(quote.change_pct(), Some(dec!(-1)));
    }

    #[test]
    fn test_change_pct_zero_close() {
        let mut quote = NormalizedQuote::new(Arc::from("NSE_EQ|ITC"), dec!(5));
        quote.close_price = Some(Decimal::ZERO);
        assert!(quote.change_pct().is_none());
    }
}
