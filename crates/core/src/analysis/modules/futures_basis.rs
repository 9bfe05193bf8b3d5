//! Futures basis analysis.

use std::sync::Arc;

use async_trait::async_trait;
use chainlens_market_data::{
    AnalysisOptions, AnalyticsEngine, BasisStance, FuturesBasis, InstrumentKey,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::BROKER_CONFIG;
use crate::analysis::model::{into_data, AnalysisResult, ModuleCategory};
use crate::analysis::traits::{AnalysisContext, AnalysisModule};
use crate::errors::{Error, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BasisReport {
    resolved_key: InstrumentKey,
    #[serde(flatten)]
    basis: FuturesBasis,
    interpretation: &'static str,
}

pub fn stance_interpretation(stance: BasisStance) -> &'static str {
    match stance {
        BasisStance::Premium => "Futures trade at a premium to spot",
        BasisStance::Discount => "Futures trade at a discount to spot",
        BasisStance::Flat => "Futures trade at spot",
    }
}

/// Futures premium or discount against the spot quote.
pub struct FuturesBasisModule {
    engine: Arc<AnalyticsEngine>,
}

impl FuturesBasisModule {
    pub fn new(engine: Arc<AnalyticsEngine>) -> Self {
        Self { engine }
    }

    async fn run(&self, ctx: &AnalysisContext) -> Result<Map<String, Value>> {
        ctx.require_config(self.requires_config())?;

        let mut options = AnalysisOptions::spot_only().with_basis();
        if let Some(symbol) = ctx.futures_symbol.as_deref() {
            options = options.futures_symbol(symbol);
        }

        let record = self.engine.analyze(&ctx.symbol, &options).await?;
        let basis = record
            .basis
            .ok_or_else(|| Error::NoData(ctx.symbol.clone()))?;

        into_data(&BasisReport {
            resolved_key: record.resolved_key,
            interpretation: stance_interpretation(basis.stance),
            basis,
        })
    }
}

#[async_trait]
impl AnalysisModule for FuturesBasisModule {
    fn id(&self) -> &'static str {
        "basis"
    }

    fn name(&self) -> &'static str {
        "Futures Analysis"
    }

    fn description(&self) -> &'static str {
        "Futures basis, premium or discount to spot"
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
