//! Analysis module traits.
//!
//! - `AnalysisModule` - Trait for implementing one analysis
//! - `AnalysisContext` - Shared input handed to every module

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::model::{AnalysisResult, DateRange, ModuleCategory, PriceBar};
use crate::errors::{Error, Result};

// =============================================================================
// Analysis Context
// =============================================================================

/// Input shared by every module in one run.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Canonical symbol under analysis (e.g., "^NSEI", "ITC.NS")
    pub symbol: String,

    pub date_range: Option<DateRange>,

    /// Price history, oldest first
    pub price_data: Vec<PriceBar>,

    /// Configuration values by key (credentials, file locations)
    pub config: HashMap<String, String>,

    /// Option chain expiry; the nearest tradable expiry when unset
    pub expiry: Option<NaiveDate>,

    /// Futures symbol to measure the basis against; the nearest contract when unset
    pub futures_symbol: Option<String>,

    /// Timestamp stamped on every result of this run
    pub now: DateTime<Utc>,
}

impl AnalysisContext {
    /// Creates a context for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_timestamp(symbol, Utc::now())
    }

    /// Creates a context with a specific timestamp (for testing).
    pub fn with_timestamp(symbol: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            date_range: None,
            price_data: Vec::new(),
            config: HashMap::new(),
            expiry: None,
            futures_symbol: None,
            now,
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_price_data(mut self, bars: Vec<PriceBar>) -> Self {
        self.price_data = bars;
        self
    }

    pub fn with_expiry(mut self, expiry: NaiveDate) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_futures_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.futures_symbol = Some(symbol.into());
        self
    }

    /// Non-blank configuration value for `key`.
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Fails with the first of `keys` that has no value.
    pub fn require_config(&self, keys: &[&str]) -> Result<()> {
        match keys.iter().find(|key| self.config_value(key).is_none()) {
            Some(key) => Err(Error::MissingConfigKey((*key).to_string())),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Analysis Module Trait
// =============================================================================

/// Trait for implementing an analysis module.
///
/// # Implementation Notes
///
/// - Check `requires_config` against the context before touching market data
/// - Never return an error: report it through [`AnalysisResult::failure`]
/// - Stamp results with `ctx.now`
///
/// # Example
///
/// ```ignore
/// pub struct OptionChainModule {
///     engine: Arc<AnalyticsEngine>,
/// }
///
/// #[async_trait]
/// impl AnalysisModule for OptionChainModule {
///     fn id(&self) -> &'static str {
///         "options"
///     }
///
///     async fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult {
///         let outcome = self.run(ctx).await;
///         AnalysisResult::from_outcome(self.id(), outcome, ctx.now)
///     }
/// }
/// ```
#[async_trait]
pub trait AnalysisModule: Send + Sync {
    /// Short identifier used on the command line and in results.
    fn id(&self) -> &'static str;

    /// Display name.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn category(&self) -> ModuleCategory;

    /// Whether the module runs when none are requested explicitly.
    fn enabled_by_default(&self) -> bool {
        true
    }

    /// Configuration keys that must be present for the module to run.
    fn requires_config(&self) -> &'static [&'static str] {
        &[]
    }

    /// Runs the analysis. Failures are reported in the result.
    async fn analyze(&self, ctx: &AnalysisContext) -> AnalysisResult;
}
