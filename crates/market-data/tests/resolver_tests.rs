//! Integration tests for symbol resolution and the mapping cache.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chainlens_market_data::errors::MarketDataError;
use chainlens_market_data::provider::ProviderCapabilities;
use chainlens_market_data::{
    CacheConfig, JsonFileMappingStore, KeyResolver, MappingCache, MappingSource, ResolutionSource,
    ResolverConfig, ResponseNormalizer, SymbolResolver, UniverseEntry,
};
use common::{memory_cache, nifty_universe, MockProvider};

fn resolver(provider: Arc<MockProvider>, cache: Arc<MappingCache>) -> SymbolResolver {
    resolver_with(provider, cache, ResolverConfig::default())
}

fn resolver_with(
    provider: Arc<MockProvider>,
    cache: Arc<MappingCache>,
    config: ResolverConfig,
) -> SymbolResolver {
    SymbolResolver::new(provider, cache, Arc::new(ResponseNormalizer::new()), config)
}

#[tokio::test]
async fn test_nsei_resolves_by_fallback_scan_then_cache() {
    let provider = Arc::new(nifty_universe());
    let cache = memory_cache();
    let resolver = resolver(provider.clone(), cache.clone());

    let first = resolver.resolve("^NSEI").await.unwrap();
    assert_eq!(first.key.as_ref(), "NSE_INDEX|Nifty 50");
    assert_eq!(first.source, ResolutionSource::FallbackScan);
    assert_eq!(provider.requested(), vec!["NSE_INDEX|NSEI", "NSE_INDEX|Nifty 50"]);

    let mapping = cache.get("^NSEI").unwrap();
    assert_eq!(mapping.source, MappingSource::FallbackScan);

    let calls_before = provider.quote_calls();
    let second = resolver.resolve("^NSEI").await.unwrap();
    assert_eq!(second.key, first.key);
    assert_eq!(second.source, ResolutionSource::Cache);
    assert_eq!(provider.quote_calls(), calls_before);
    assert_eq!(provider.universe_calls(), 1);
    assert_eq!(resolver.scans_performed(), 1);
}

#[tokio::test]
async fn test_exact_match_skips_scan() {
    let provider = Arc::new(MockProvider::new().with_quote("NSE_EQ|ITC", 432.5));
    let cache = memory_cache();
    let resolver = resolver(provider.clone(), cache.clone());

    let resolved = resolver.resolve("ITC.NS").await.unwrap();
    assert_eq!(resolved.key.as_ref(), "NSE_EQ|ITC");
    assert_eq!(resolved.source, ResolutionSource::Exact);
    assert_eq!(provider.universe_calls(), 0);
    assert_eq!(cache.get("ITC.NS").unwrap().source, MappingSource::Exact);
}

#[tokio::test]
async fn test_scan_prefers_exact_symbol_over_longer_name() {
    let provider = Arc::new(
        MockProvider::new()
            .with_universe_entry(UniverseEntry::new("NSE_EQ|INE669E01016").with_name("IDEA"))
            .with_universe_entry(UniverseEntry::new("NSE_EQ|INE349Y01013").with_name("IDEAFORGE"))
            .with_quote("NSE_EQ|INE669E01016", 7.4)
            .with_quote("NSE_EQ|INE349Y01013", 512.0),
    );
    let cache = memory_cache();
    let resolver = resolver(provider.clone(), cache.clone());

    let resolved = resolver.resolve("IDEA.NS").await.unwrap();
    assert_eq!(resolved.key.as_ref(), "NSE_EQ|INE669E01016");
    assert_eq!(resolved.source, ResolutionSource::FallbackScan);
    assert_eq!(cache.get("IDEA.NS").unwrap().resolved.as_ref(), "NSE_EQ|INE669E01016");
    assert_eq!(provider.requested(), vec!["NSE_EQ|IDEA", "NSE_EQ|INE669E01016"]);
}

#[tokio::test]
async fn test_scan_matches_listed_names() {
    let provider = Arc::new(
        MockProvider::new()
            .with_universe_entry(
                UniverseEntry::new("NSE_EQ|INE154A01025")
                    .with_name("ITC")
                    .with_name("ITC LTD"),
            )
            .with_universe_entry(UniverseEntry::new("NSE_EQ|INE002A01018").with_name("RELIANCE"))
            .with_quote("NSE_EQ|INE154A01025", 432.5),
    );
    let resolver = resolver(provider, memory_cache());

    let resolved = resolver.resolve("ITC.NS").await.unwrap();
    assert_eq!(resolved.key.as_ref(), "NSE_EQ|INE154A01025");
    assert_eq!(resolved.source, ResolutionSource::FallbackScan);
}

#[tokio::test]
async fn test_not_found_is_not_cached() {
    let provider = Arc::new(nifty_universe());
    let cache = memory_cache();
    let resolver = resolver(provider.clone(), cache.clone());

    let err = resolver.resolve("^GSPC").await.unwrap_err();
    assert!(matches!(err, MarketDataError::NotFound(ref s) if s == "^GSPC"));
    assert!(cache.is_empty());

    // The caller decides whether to retry; a retry scans again.
    assert!(resolver.resolve("^GSPC").await.is_err());
    assert_eq!(resolver.scans_performed(), 2);
}

#[tokio::test]
async fn test_provider_without_universe_skips_scan() {
    let provider = Arc::new(nifty_universe().with_capabilities(ProviderCapabilities {
        supports_option_chain: false,
        supports_futures: false,
        supports_universe: false,
    }));
    let resolver = resolver(provider.clone(), memory_cache());

    let err = resolver.resolve("^NSEI").await.unwrap_err();
    assert!(matches!(err, MarketDataError::NotFound(ref s) if s == "^NSEI"));
    assert_eq!(provider.universe_calls(), 0);
    assert_eq!(resolver.scans_performed(), 0);
}

#[tokio::test]
async fn test_scan_is_bounded() {
    let provider = Arc::new(
        MockProvider::new()
            .with_universe(&["NSE_INDEX|Nifty 50", "NSE_INDEX|Nifty 500"])
            .with_quote("NSE_INDEX|Nifty 500", 22100.0),
    );

    let capped = ResolverConfig {
        max_scan_candidates: 1,
        ..ResolverConfig::default()
    };
    let resolver = resolver_with(provider.clone(), memory_cache(), capped);
    assert!(matches!(
        resolver.resolve("^NSEI").await,
        Err(MarketDataError::NotFound(_))
    ));
    // exact probe plus one candidate
    assert_eq!(provider.quote_calls(), 2);

    let resolver = resolver_with(provider, memory_cache(), ResolverConfig::default());
    let resolved = resolver.resolve("^NSEI").await.unwrap();
    assert_eq!(resolved.key.as_ref(), "NSE_INDEX|Nifty 500");
}

#[tokio::test]
async fn test_transport_failure_aborts_resolution() {
    let provider = Arc::new(nifty_universe());
    provider.fail_quotes_with(|| MarketDataError::ProviderError {
        provider: "MOCK".to_string(),
        message: "HTTP error: 503 Service Unavailable".to_string(),
    });
    let cache = memory_cache();
    let resolver = resolver(provider.clone(), cache.clone());

    let err = resolver.resolve("^NSEI").await.unwrap_err();
    assert!(matches!(err, MarketDataError::ProviderError { .. }));
    assert_eq!(provider.universe_calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_missing_credentials_surface_before_scan() {
    let provider = Arc::new(nifty_universe());
    provider.fail_quotes_with(|| MarketDataError::ConfigMissing("UPSTOX_ACCESS_TOKEN".into()));
    let resolver = resolver(provider, memory_cache());

    let err = resolver.resolve("^NSEI").await.unwrap_err();
    assert!(matches!(err, MarketDataError::ConfigMissing(_)));
}

#[tokio::test]
async fn test_invalidate_forces_rediscovery() {
    let provider = Arc::new(nifty_universe());
    let cache = memory_cache();
    let resolver = resolver(provider.clone(), cache.clone());

    resolver.resolve("^NSEI").await.unwrap();
    let removed = resolver.invalidate("^NSEI").unwrap();
    assert_eq!(removed.unwrap().resolved.as_ref(), "NSE_INDEX|Nifty 50");
    assert!(cache.get("^NSEI").is_none());

    let again = resolver.resolve("^NSEI").await.unwrap();
    assert_eq!(again.source, ResolutionSource::FallbackScan);
    assert_eq!(resolver.scans_performed(), 2);
}

#[tokio::test]
async fn test_mapping_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key_mappings.json");

    {
        let provider = Arc::new(nifty_universe());
        let store = Arc::new(JsonFileMappingStore::new(&path));
        let cache = Arc::new(MappingCache::with_store(store, CacheConfig::default()).unwrap());
        let resolver = resolver(provider, cache);
        resolver.resolve("^NSEI").await.unwrap();
    }

    let provider = Arc::new(nifty_universe());
    let store = Arc::new(JsonFileMappingStore::new(&path));
    let cache = Arc::new(MappingCache::with_store(store, CacheConfig::default()).unwrap());
    let resolver = resolver(provider.clone(), cache);

    let resolved = resolver.resolve("^NSEI").await.unwrap();
    assert_eq!(resolved.key.as_ref(), "NSE_INDEX|Nifty 50");
    assert_eq!(resolved.source, ResolutionSource::Cache);
    assert_eq!(provider.quote_calls(), 0);
    assert_eq!(provider.universe_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolutions_scan_once() {
    let provider = Arc::new(nifty_universe());
    let resolver = Arc::new(resolver(provider.clone(), memory_cache()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve("^NSEI").await })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    for result in results {
        let resolved = result.unwrap().unwrap();
        assert_eq!(resolved.key.as_ref(), "NSE_INDEX|Nifty 50");
    }
    assert_eq!(resolver.scans_performed(), 1);
    assert_eq!(provider.universe_calls(), 1);
}

#[tokio::test]
async fn test_cancelled_resolutions_release_inflight_entry() {
    let provider = Arc::new(nifty_universe());
    provider.stall_quotes();
    let resolver = Arc::new(resolver(provider.clone(), memory_cache()));

    let first = tokio::spawn({
        let resolver = Arc::clone(&resolver);
        async move { resolver.resolve("^NSEI").await }
    });
    while provider.quote_calls() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(resolver.pending_resolutions(), 1);

    // Waits behind the first resolution, then gives up.
    let waiting =
        tokio::time::timeout(Duration::from_millis(20), resolver.resolve("^NSEI")).await;
    assert!(waiting.is_err());
    assert_eq!(resolver.pending_resolutions(), 1);

    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());
    assert_eq!(resolver.pending_resolutions(), 0);
}

#[tokio::test]
async fn test_completed_resolution_releases_inflight_entry() {
    let provider = Arc::new(nifty_universe());
    let resolver = resolver(provider, memory_cache());

    resolver.resolve("^NSEI").await.unwrap();
    assert!(resolver.resolve("NOPE.NS").await.is_err());
    assert_eq!(resolver.pending_resolutions(), 0);
}

#[tokio::test]
async fn test_distinct_symbols_resolve_independently() {
    let provider = Arc::new(nifty_universe().with_quote("NSE_EQ|ITC", 432.5));
    let resolver = resolver(provider, memory_cache());

    let (nifty, itc) = tokio::join!(resolver.resolve("^NSEI"), resolver.resolve("ITC.NS"));
    assert_eq!(nifty.unwrap().key.as_ref(), "NSE_INDEX|Nifty 50");
    assert_eq!(itc.unwrap().key.as_ref(), "NSE_EQ|ITC");
}
