//! Analytics engine - one request to one analytics record.
//!
//! ```text
//! canonical symbol
//!       │ SymbolResolver (cache → exact → scan)
//!       ▼
//! instrument key ── fetch_quote ── ResponseNormalizer ──► NormalizedQuote
//!       │                                                     │
//!       ├─ fetch_option_chain ── GreeksExtractor ── summarize │
//!       └─ futures contract ── fetch_quote ── BasisCalculator ◄┘
//!                                                             ▼
//!                                                      AnalyticsRecord
//! ```

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};

use crate::cache::MappingCache;
use crate::derivatives::expiry::{is_tradable, select_expiry};
use crate::derivatives::{summarize, BasisCalculator, ChainFilter, GreeksExtractor};
use crate::errors::MarketDataError;
use crate::models::{
    AnalysisOptions, AnalyticsRecord, FuturesBasis, FuturesContract, InstrumentKey,
    NormalizedQuote, OptionChainEntry,
};
use crate::normalizer::ResponseNormalizer;
use crate::provider::InstrumentProvider;
use crate::resolver::{KeyResolver, ResolvedKey, ResolverConfig, SymbolResolver};

/// Orchestrates resolution, normalization and derivatives analytics.
///
/// # Example
///
/// ```ignore
/// let engine = AnalyticsEngine::new(provider, cache, ResolverConfig::default());
///
/// let record = engine
///     .analyze("^NSEI", &AnalysisOptions::spot_only().with_chain().with_basis())
///     .await?;
/// ```
pub struct AnalyticsEngine {
    provider: Arc<dyn InstrumentProvider>,
    resolver: Arc<dyn KeyResolver>,
    normalizer: Arc<ResponseNormalizer>,
    greeks: GreeksExtractor,
    basis: BasisCalculator,
    chain_filter: ChainFilter,
    clock: fn() -> DateTime<Utc>,
}

impl AnalyticsEngine {
    /// Build an engine with a [`SymbolResolver`] over `provider` and `cache`.
    pub fn new(
        provider: Arc<dyn InstrumentProvider>,
        cache: Arc<MappingCache>,
        config: ResolverConfig,
    ) -> Self {
        let normalizer = Arc::new(ResponseNormalizer::new());
        let resolver = Arc::new(SymbolResolver::new(
            Arc::clone(&provider),
            cache,
            Arc::clone(&normalizer),
            config,
        ));
        Self::with_resolver(provider, resolver, normalizer)
    }

    /// Build an engine around an existing resolver. The normalizer should be
    /// the one the resolver uses so learned shapes are shared.
    pub fn with_resolver(
        provider: Arc<dyn InstrumentProvider>,
        resolver: Arc<dyn KeyResolver>,
        normalizer: Arc<ResponseNormalizer>,
    ) -> Self {
        Self {
            provider,
            resolver,
            normalizer,
            greeks: GreeksExtractor::new(),
            basis: BasisCalculator::new(),
            chain_filter: ChainFilter::default(),
            clock: Utc::now,
        }
    }

    pub fn with_chain_filter(mut self, chain_filter: ChainFilter) -> Self {
        self.chain_filter = chain_filter;
        self
    }

    /// Replace the clock used for expiry selection.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Resolve, normalize and compute the requested analytics for one symbol.
    pub async fn analyze(
        &self,
        canonical: &str,
        options: &AnalysisOptions,
    ) -> Result<AnalyticsRecord, MarketDataError> {
        self.check_capabilities(options)?;

        let (resolved, quote) = self.resolve_quote(canonical).await?;
        let mut record = AnalyticsRecord::new(canonical.trim().into(), resolved.key.clone(), quote);

        if options.include_chain {
            let (expiry, chain) = self.option_chain(&resolved.key, options.expiry).await?;
            let spot = Some(record.quote.last_price).filter(|p| !p.is_zero());
            record.chain_summary = Some(summarize(&chain, spot, &self.chain_filter));
            record.chain = Some(chain);
            record.expiry = Some(expiry);
        }

        if options.include_basis {
            let basis = self
                .futures_basis(canonical, &resolved.key, &record.quote, options)
                .await?;
            record.basis = Some(basis);
        }

        info!(
            "Analyzed {} as {} on {} (chain: {}, basis: {})",
            record.canonical,
            record.resolved_key,
            self.provider_id(),
            record.chain.is_some(),
            record.basis.is_some()
        );
        Ok(record)
    }

    fn check_capabilities(&self, options: &AnalysisOptions) -> Result<(), MarketDataError> {
        let caps = self.provider.capabilities();
        if options.include_chain && !caps.supports_option_chain {
            return Err(MarketDataError::NotSupported {
                operation: "option_chain".to_string(),
                provider: self.provider.id().to_string(),
            });
        }
        if options.include_basis && options.futures_symbol.is_none() && !caps.supports_futures {
            return Err(MarketDataError::NotSupported {
                operation: "futures_contracts".to_string(),
                provider: self.provider.id().to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_normalized(&self, key: &str) -> Result<NormalizedQuote, MarketDataError> {
        let blob = self.provider.fetch_quote(key).await?;
        self.normalizer.normalize(&blob, key)
    }

    /// Resolve `canonical` and fetch its quote.
    ///
    /// A cached key whose quote comes back malformed or not found is treated
    /// as stale: the mapping is invalidated and the symbol resolved again
    /// once.
    async fn resolve_quote(
        &self,
        canonical: &str,
    ) -> Result<(ResolvedKey, NormalizedQuote), MarketDataError> {
        let resolved = self.resolver.resolve(canonical).await?;
        match self.fetch_normalized(&resolved.key).await {
            Ok(quote) => Ok((resolved, quote)),
            Err(e) if resolved.source.is_cached() && e.signals_stale_mapping() => {
                warn!(
                    "Cached key {} for {} looks stale ({}), re-resolving",
                    resolved.key, canonical, e
                );
                self.resolver.invalidate(canonical)?;
                let fresh = self.resolver.resolve(canonical).await?;
                let quote = self.fetch_normalized(&fresh.key).await?;
                Ok((fresh, quote))
            }
            Err(e) => Err(e),
        }
    }

    async fn option_chain(
        &self,
        key: &str,
        expiry: Option<NaiveDate>,
    ) -> Result<(NaiveDate, Vec<OptionChainEntry>), MarketDataError> {
        let expiry = match expiry {
            Some(expiry) => expiry,
            None => {
                let listed = self.provider.fetch_option_expiries(key).await?;
                let selected = select_expiry(&listed, key, (self.clock)());
                debug!(
                    "Selected expiry {} for {} from {} listed",
                    selected,
                    key,
                    listed.len()
                );
                selected
            }
        };

        let blob = self.provider.fetch_option_chain(key, expiry).await?;
        let chain = self.greeks.extract(&blob, key)?;
        Ok((expiry, chain))
    }

    /// Nearest futures contract still tradable.
    fn nearest_contract(&self, mut contracts: Vec<FuturesContract>) -> Option<FuturesContract> {
        let now = (self.clock)();
        contracts.sort_by(|a, b| {
            a.expiry
                .cmp(&b.expiry)
                .then_with(|| a.instrument_key.cmp(&b.instrument_key))
        });
        contracts.into_iter().find(|c| is_tradable(c.expiry, now))
    }

    async fn futures_basis(
        &self,
        canonical: &str,
        spot_key: &InstrumentKey,
        spot: &NormalizedQuote,
        options: &AnalysisOptions,
    ) -> Result<FuturesBasis, MarketDataError> {
        let (futures_quote, expiry) = match options.futures_symbol.as_deref() {
            Some(symbol) => {
                let (_, quote) = self.resolve_quote(symbol).await?;
                (quote, None)
            }
            None => {
                let contracts = self.provider.fetch_futures_contracts(spot_key).await?;
                let contract = self.nearest_contract(contracts).ok_or_else(|| {
                    MarketDataError::NotFound(format!("futures contract for {}", canonical.trim()))
                })?;
                debug!(
                    "Using futures contract {} expiring {}",
                    contract.instrument_key, contract.expiry
                );
                let quote = self.fetch_normalized(&contract.instrument_key).await?;
                (quote, Some(contract.expiry))
            }
        };
        self.basis.compute(&futures_quote, spot, expiry)
    }
}
