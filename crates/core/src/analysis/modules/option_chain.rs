//! Option chain analysis.
//!
//! Put/call ratio with its sentiment band, max pain and the OI walls on
//! either side of spot.

use std::sync::Arc;

use async_trait::async_trait;
use chainlens_market_data::{
    AnalysisOptions, AnalyticsEngine, ChainSummary, InstrumentKey, OptionChainEntry, PcrSentiment,
};
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use super::BROKER_CONFIG;
use crate::analysis::model::{into_data, AnalysisResult, ModuleCategory};
use crate::analysis::traits::{AnalysisContext, AnalysisModule};
use crate::errors::{Error, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OptionChainReport {
    resolved_key: InstrumentKey,
    spot_price: Decimal,
    expiry: Option<NaiveDate>,
    summary: ChainSummary,
    interpretation: &'static str,
    chain: Vec<OptionChainEntry>,
}

/// Reading of the put/call ratio band.
pub fn pcr_interpretation(sentiment: Option<PcrSentiment>) -> &'static str {
    match sentiment {
        Some(PcrSentiment::StrongBullish) => "High put writing (support)",
        Some(PcrSentiment::Bullish) => "More puts than calls",
        Some(PcrSentiment::Neutral) => "Balanced OI",
        Some(PcrSentiment::Bearish) => "Call writing dominant",
        Some(PcrSentiment::StrongBearish) => "Heavy call writing (resistance)",
        None => "No call open interest",
    }
}

/// PCR, max pain and OI levels for the symbol's option chain.
pub struct OptionChainModule {
    engine: Arc<AnalyticsEngine>,
}

impl OptionChainModule {
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
        let (chain, summary) = match (record.chain, record.chain_summary) {
            (Some(chain), Some(summary)) if summary.strikes_considered > 0 => (chain, summary),
            _ => return Err(Error::NoData(ctx.symbol.clone())),
        };
        debug!(
            "Option chain for {}: {} strikes, {} near spot",
            ctx.symbol,
            chain.len(),
            summary.strikes_considered
        );

        into_data(&OptionChainReport {
            resolved_key: record.resolved_key,
            spot_price: record.quote.last_price,
            expiry: record.expiry,
            interpretation: pcr_interpretation(summary.sentiment),
            summary,
            chain,
        })
    }
}

#[async_trait]
impl AnalysisModule for OptionChainModule {
    fn id(&self) -> &'static str {
        "options"
    }

    fn name(&self) -> &'static str {
        "Options Analysis"
    }

    fn description(&self) -> &'static str {
        "PCR, max pain and OI levels from the option chain"
    }

    fn category(&self) -> ModuleCategory {
        ModuleCategory::Asset
    }

    fn requires_config(&self) -> &'static [&'static str] {
        BROKER_CONFIG
    }

    async fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
        let outcome = self.run(ctx).await;
        AnalysisResult::from_outcome(self.id(), outcome, ctx.now)
    }
}
