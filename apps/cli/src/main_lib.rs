use std::sync::Arc;

use anyhow::Context;
use chainlens_core::{AnalysisContext, AnalysisResult, ModuleRegistry};
use chainlens_market_data::{
    AnalyticsEngine, CacheConfig, JsonFileMappingStore, MappingCache, UpstoxProvider,
};
use serde_json::{json, Value};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Cli;
use crate::config::{Config, LOG_FORMAT_KEY};

pub fn init_tracing() {
    let log_format = std::env::var(LOG_FORMAT_KEY).unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Library crates log through the `log` facade.
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("log bridge not installed: {}", e);
    }

    // Logs go to stderr so stdout stays machine-readable.
    let installed = if log_format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(
            registry.with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        tracing::subscriber::set_global_default(
            registry.with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            ),
        )
    };
    if let Err(e) = installed {
        eprintln!("tracing subscriber not installed: {}", e);
    }
}

pub fn build_engine(config: &Config) -> anyhow::Result<Arc<AnalyticsEngine>> {
    let mut provider =
        UpstoxProvider::new(config.access_token.clone()).with_base_url(&config.api_base);
    if let Some(path) = &config.instrument_master {
        provider = provider
            .with_master_file(path)
            .with_context(|| format!("loading instrument master {}", path.display()))?;
    }

    let store = Arc::new(JsonFileMappingStore::new(&config.mapping_file));
    let cache_config = match config.mapping_ttl {
        Some(ttl) => CacheConfig::with_ttl(ttl),
        None => CacheConfig::default(),
    };
    let cache = MappingCache::with_store(store, cache_config).with_context(|| {
        format!("loading key mappings from {}", config.mapping_file.display())
    })?;
    tracing::info!(
        "Loaded {} key mappings from {}",
        cache.len(),
        config.mapping_file.display()
    );

    Ok(Arc::new(AnalyticsEngine::new(
        Arc::new(provider),
        Arc::new(cache),
        config.resolver_config(),
    )))
}

/// Registry for describing modules. Its engine keeps mappings in memory and
/// has no instrument master, so nothing is read from disk.
pub fn listing_registry(config: &Config) -> ModuleRegistry {
    let provider =
        UpstoxProvider::new(config.access_token.clone()).with_base_url(&config.api_base);
    let cache = MappingCache::new(CacheConfig::default());
    ModuleRegistry::derivatives(Arc::new(AnalyticsEngine::new(
        Arc::new(provider),
        Arc::new(cache),
        config.resolver_config(),
    )))
}

pub fn build_context(cli: &Cli, config: &Config, symbol: &str) -> AnalysisContext {
    let mut ctx = AnalysisContext::new(symbol);
    for (key, value) in config.module_config() {
        ctx = ctx.with_config(key, value);
    }
    if let Some(expiry) = cli.expiry {
        ctx = ctx.with_expiry(expiry);
    }
    if let Some(futures) = &cli.futures {
        ctx = ctx.with_futures_symbol(futures.clone());
    }
    ctx
}

/// One JSON object per registered module.
pub fn describe_modules(registry: &ModuleRegistry) -> Value {
    let modules: Vec<Value> = registry
        .all()
        .iter()
        .map(|m| {
            json!({
                "id": m.id(),
                "name": m.name(),
                "description": m.description(),
                "category": m.category(),
                "enabledByDefault": m.enabled_by_default(),
                "requiresConfig": m.requires_config(),
            })
        })
        .collect();
    Value::Array(modules)
}

pub fn render(value: &Value, pretty: bool) -> anyhow::Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

/// Runs the requested modules and returns their results.
pub async fn run(cli: &Cli, config: &Config, symbol: &str) -> anyhow::Result<Vec<AnalysisResult>> {
    let engine = build_engine(config)?;
    let registry = ModuleRegistry::derivatives(engine);
    let ctx = build_context(cli, config, symbol);
    let results = registry.run_many(&cli.module_names(), &ctx).await?;
    Ok(results)
}
