//! Greeks analysis over the option chain.

use std::sync::Arc;

use async_trait::async_trait;
use chainlens_market_data::{AnalysisOptions, AnalyticsEngine, InstrumentKey};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use super::BROKER_CONFIG;
use crate::analysis::model::{into_data, AnalysisResult, ModuleCategory};
use crate::analysis::traits::{AnalysisContext, AnalysisModule};
use crate::errors::{Error, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GreeksReport {
    resolved_key: InstrumentKey,
    spot_price: Decimal,
    expiry: Option<NaiveDate>,
    net_delta: f64,
    delta_interpretation: &'static str,
    max_gamma_strike: Option<Decimal>,
    gamma_interpretation: String,
    net_theta: f64,
    net_vega: f64,
}

pub fn delta_interpretation(net_delta: f64) -> &'static str {
    if net_delta > 0.0 {
        "Net long delta, positioning leans bullish"
    } else if net_delta < 0.0 {
        "Net short delta, positioning leans bearish"
    } else {
        "Delta neutral"
    }
}

pub fn gamma_interpretation(max_gamma_strike: Option<Decimal>) -> String {
    match max_gamma_strike {
        Some(strike) => format!("Gamma concentrated at {}, price may pin near it", strike),
        None => "No gamma supplied".to_string(),
    }
}

/// Open interest weighted delta, theta and vega, plus the strike with the
/// largest gamma.
pub struct GreeksModule {
    engine: Arc<AnalyticsEngine>,
}

impl GreeksModule {
    pub fn new(engine: Arc<AnalyticsEngine>) -> Self {
        Self { engine }
    }

    async fn run(&self, ctx: &AnalysisContext) -> Result<Map<String, Value>> {
        ctx.require_config(self.requires_config())?;

        let mut options = AnalysisOptions::spot_only().with_chain();
        if let Some(expiry) = ctx.expiry {
            options = options.expiry(expiry);
        }

        let record = self.engine.analyze(&ctx.symbol, &options).await?;
        let summary = record
            .chain_summary
            .filter(|s| s.strikes_considered > 0)
            .ok_or_else(|| Error::NoData(ctx.symbol.clone()))?;

        into_data(&GreeksReport {
            resolved_key: record.resolved_key,
            spot_price: record.quote.last_price,
            expiry: record.expiry,
            net_delta: summary.net_delta,
            delta_interpretation: delta_interpretation(summary.net_delta),
            max_gamma_strike: summary.max_gamma_strike,
            gamma_interpretation: gamma_interpretation(summary.max_gamma_strike),
            net_theta: summary.net_theta,
            net_vega: summary.net_vega,
        })
    }
}

#[async_trait]
impl AnalysisModule for GreeksModule {
    fn id(&self) -> &'static str {
        "greeks"
    }

    fn name(&self) -> &'static str {
        "Greeks Analysis"
    }

    fn description(&self) -> &'static str {
        "Delta, gamma, theta and vega from the option chain"
    }

    fn category(&self) -> ModuleCategory {
        ModuleCategory::Asset
    }

    fn enabled_by_default(&self) -> bool {
        false
    }

    fn requires_config(&self) -> &'static [&'static str] {
        BROKER_CONFIG
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
        let outcome = self.run(ctx).await;
        AnalysisResult::from_outcome(self.id(), outcome, ctx.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_delta_interpretation() {
        assert_eq!(delta_interpretation(1250.0), "Net long delta, positioning leans bullish");
        assert_eq!(delta_interpretation(-3.5), "Net short delta, positioning leans bearish");
        assert_eq!(delta_interpretation(0.0), "Delta neutral");
    }

    #[test]
    fn test_gamma_interpretation() {
        assert_eq!(
            gamma_interpretation(Some(dec!(24500))),
            "Gamma concentrated at 24500, price may pin near it"
        );
        assert_eq!(gamma_interpretation(None), "No gamma supplied");
    }
}
