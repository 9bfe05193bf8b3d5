//! Symbol resolver - cache, exact match, then fallback scan.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::Mutex as AsyncMutex;

use crate::cache::MappingCache;
use crate::errors::MarketDataError;
use crate::models::{InstrumentKey, KeyMapping, MappingSource, NormalizedQuote};
use crate::normalizer::ResponseNormalizer;
use crate::provider::InstrumentProvider;

use super::matcher::rank_candidates;
use super::naming::{default_instrument_key, name_hints, same_instrument_key};
use super::traits::{KeyResolver, ResolutionSource, ResolvedKey};

/// Tuning for the fallback scan.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Maximum number of candidate payloads fetched in one scan.
    pub max_scan_candidates: usize,
    /// Minimum `2 * lcs / (|a| + |b|)` for a name to count as a match when
    /// neither text contains the other.
    pub similarity_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_scan_candidates: 500,
            similarity_threshold: 0.8,
        }
    }
}

/// Registration of one caller in the per-symbol in-flight map.
///
/// Dropping it, including when the owning `resolve` future is cancelled,
/// removes the map entry once no other caller holds it.
struct InflightEntry<'a> {
    resolver: &'a SymbolResolver,
    canonical: &'a str,
    flight: Arc<AsyncMutex<()>>,
}

impl<'a> InflightEntry<'a> {
    fn register(resolver: &'a SymbolResolver, canonical: &'a str) -> Self {
        let flight = Arc::clone(
            resolver
                .lock_inflight()
                .entry(canonical.to_string())
                .or_default(),
        );
        Self {
            resolver,
            canonical,
            flight,
        }
    }
}

impl Drop for InflightEntry<'_> {
    fn drop(&mut self) {
        let mut inflight = self.resolver.lock_inflight();
        // The map's reference plus ours.
        let last = inflight
            .get(self.canonical)
            .is_some_and(|f| Arc::ptr_eq(f, &self.flight) && Arc::strong_count(f) == 2);
        if last {
            inflight.remove(self.canonical);
        }
    }
}

/// Resolves canonical symbols to broker instrument keys.
///
/// Resolution order:
/// 1. Fresh mapping in the [`MappingCache`] (no network call)
/// 2. The default naming convention, accepted if the provider returns a price
/// 3. A bounded fallback scan over the provider's universe
///
/// Concurrent resolutions of the same symbol wait for each other, so the
/// scan runs at most once per symbol per cache lifetime.
///
/// # Example
///
/// ```ignore
/// let resolver = SymbolResolver::new(provider, cache, normalizer, ResolverConfig::default());
///
/// let resolved = resolver.resolve("^NSEI").await?;
/// // resolved.key = "NSE_INDEX|Nifty 50"
/// // resolved.source = ResolutionSource::FallbackScan
///
/// let again = resolver.resolve("^NSEI").await?;
/// // again.source = ResolutionSource::Cache
/// ```
pub struct SymbolResolver {
    provider: Arc<dyn InstrumentProvider>,
    cache: Arc<MappingCache>,
    normalizer: Arc<ResponseNormalizer>,
    config: ResolverConfig,
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    scans: AtomicUsize,
}

impl SymbolResolver {
    pub fn new(
        provider: Arc<dyn InstrumentProvider>,
        cache: Arc<MappingCache>,
        normalizer: Arc<ResponseNormalizer>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            normalizer,
            config,
            inflight: Mutex::new(HashMap::new()),
            scans: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<MappingCache> {
        &self.cache
    }

    /// Number of symbols with a resolution currently in flight.
    pub fn pending_resolutions(&self) -> usize {
        self.lock_inflight().len()
    }

    /// Number of fallback scans started since construction.
    pub fn scans_performed(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    fn lock_inflight(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.inflight.lock().unwrap_or_else(|poisoned| {
            warn!("Resolver in-flight map was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn cached(&self, canonical: &str) -> Option<ResolvedKey> {
        self.cache.get(canonical).map(|mapping| ResolvedKey {
            key: mapping.resolved,
            source: ResolutionSource::Cache,
        })
    }

    /// Fetch and normalize one candidate key.
    ///
    /// `Ok(None)` means the provider does not know the key or the payload had
    /// no price. Any other failure aborts resolution.
    async fn probe(&self, key: &str) -> Result<Option<NormalizedQuote>, MarketDataError> {
        debug!("Probing {} on {}", key, self.provider.id());
        let blob = match self.provider.fetch_quote(key).await {
            Ok(blob) => blob,
            Err(e) if e.is_probe_miss() => return Ok(None),
            Err(e) => return Err(e),
        };
        match self.normalizer.normalize(&blob, key) {
            Ok(quote) => Ok(Some(quote)),
            Err(e) if e.is_probe_miss() => {
                debug!("Probe of {} rejected: {}", key, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn record(&self, canonical: &str, key: &str, source: MappingSource) -> ResolvedKey {
        info!("Resolved {} -> {} via {:?}", canonical, key, source);
        if let Err(e) = self.cache.put(KeyMapping::new(canonical, key, source)) {
            warn!("Failed to persist mapping for {}: {}", canonical, e);
        }
        ResolvedKey {
            key: InstrumentKey::from(key),
            source: source.into(),
        }
    }

    async fn fallback_scan(&self, canonical: &str, skip: &str) -> Result<Option<String>, MarketDataError> {
        if !self.provider.capabilities().supports_universe {
            info!(
                "{} cannot list its universe, skipping fallback scan for {}",
                self.provider.id(),
                canonical
            );
            return Ok(None);
        }

        self.scans.fetch_add(1, Ordering::SeqCst);
        let universe = self.provider.fetch_universe_entries().await?;
        let hints = name_hints(canonical);
        let ranked = rank_candidates(universe, &hints, self.config.similarity_threshold);
        info!(
            "Fallback scan for {}: {} plausible candidates (hints {:?})",
            canonical,
            ranked.len(),
            hints
        );

        let candidates = ranked
            .into_iter()
            .filter(|c| !same_instrument_key(&c.entry.instrument_key, skip))
            .take(self.config.max_scan_candidates);
        for candidate in candidates {
            let key = candidate.entry.instrument_key;
            if self.probe(&key).await?.is_some() {
                return Ok(Some(key.to_string()));
            }
        }
        Ok(None)
    }

    async fn resolve_uncached(&self, canonical: &str) -> Result<ResolvedKey, MarketDataError> {
        let exact = default_instrument_key(canonical);
        if self.probe(&exact).await?.is_some() {
            return Ok(self.record(canonical, &exact, MappingSource::Exact));
        }
        debug!("No exact match for {} as {}", canonical, exact);

        match self.fallback_scan(canonical, &exact).await? {
            Some(key) => Ok(self.record(canonical, &key, MappingSource::FallbackScan)),
            None => {
                info!("No instrument key found for {}", canonical);
                Err(MarketDataError::NotFound(canonical.to_string()))
            }
        }
    }
}

#[async_trait]
impl KeyResolver for SymbolResolver {
    async fn resolve(&self, canonical: &str) -> Result<ResolvedKey, MarketDataError> {
        let canonical = canonical.trim();
        if canonical.is_empty() {
            return Err(MarketDataError::NotFound(canonical.to_string()));
        }

        if let Some(resolved) = self.cached(canonical) {
            return Ok(resolved);
        }

        let entry = InflightEntry::register(self, canonical);
        let _guard = entry.flight.lock().await;
        // Another task may have finished resolving while we waited.
        match self.cached(canonical) {
            Some(resolved) => Ok(resolved),
            None => self.resolve_uncached(canonical).await,
        }
    }

    fn invalidate(&self, canonical: &str) -> Result<Option<KeyMapping>, MarketDataError> {
        let removed = self.cache.invalidate(canonical.trim())?;
        if let Some(ref mapping) = removed {
            self.normalizer.forget(&mapping.resolved);
        }
        Ok(removed)
    }
}
