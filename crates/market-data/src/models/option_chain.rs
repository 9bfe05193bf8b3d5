use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option sensitivities for one side of a strike.
///
/// Every field is optional: `None` means the provider did not supply the
/// value, which is distinct from a supplied zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionGreeks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vega: Option<f64>,
    /// Implied volatility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<f64>,
    /// Probability of profit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
}

impl OptionGreeks {
    pub fn is_empty(&self) -> bool {
        self.delta.is_none()
            && self.gamma.is_none()
            && self.theta.is_none()
            && self.vega.is_none()
            && self.iv.is_none()
            && self.pop.is_none()
    }
}

/// Market data and Greeks for the call or put side of a strike.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLeg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ltp: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_interest: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_open_interest: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
    /// Unset when the provider omitted the Greeks section for this side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeks: Option<OptionGreeks>,
}

impl OptionLeg {
    /// Change in open interest since the previous session, when both are supplied.
    pub fn oi_change(&self) -> Option<Decimal> {
        Some(self.open_interest? - self.prev_open_interest?)
    }

    /// Open interest, treating an unsupplied value as zero for aggregation.
    pub fn oi_or_zero(&self) -> Decimal {
        self.open_interest.unwrap_or(Decimal::ZERO)
    }
}

/// One strike of an option chain. All Greeks in a chain come from the same
/// provider response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainEntry {
    pub strike_price: Decimal,
    pub call: OptionLeg,
    pub put: OptionLeg,
}
