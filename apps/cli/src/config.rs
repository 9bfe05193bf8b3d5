use std::path::PathBuf;
use std::time::Duration;

use chainlens_market_data::provider::upstox::{
    ACCESS_TOKEN_KEY, DEFAULT_BASE_URL, INSTRUMENT_MASTER_KEY,
};
use chainlens_market_data::ResolverConfig;

pub const MAPPING_FILE_KEY: &str = "CHAINLENS_MAPPING_FILE";
pub const API_BASE_KEY: &str = "CHAINLENS_API_BASE";
pub const MAX_SCAN_KEY: &str = "CHAINLENS_MAX_SCAN";
pub const SIMILARITY_KEY: &str = "CHAINLENS_SIMILARITY";
pub const MAPPING_TTL_HOURS_KEY: &str = "CHAINLENS_MAPPING_TTL_HOURS";
pub const LOG_FORMAT_KEY: &str = "CHAINLENS_LOG_FORMAT";

const DEFAULT_MAPPING_FILE: &str = "./key_mappings.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub access_token: Option<String>,
    pub mapping_file: PathBuf,
    pub instrument_master: Option<PathBuf>,
    pub api_base: String,
    pub max_scan_candidates: usize,
    pub similarity_threshold: f64,
    /// Unset keeps discovered mappings indefinitely.
    pub mapping_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unparseable numbers fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = ResolverConfig::default();

        let access_token = value(ACCESS_TOKEN_KEY);
        let mapping_file = value(MAPPING_FILE_KEY)
            .unwrap_or_else(|| DEFAULT_MAPPING_FILE.into())
            .into();
        let instrument_master = value(INSTRUMENT_MASTER_KEY).map(PathBuf::from);
        let api_base = value(API_BASE_KEY).unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let max_scan_candidates = value(MAX_SCAN_KEY)
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_scan_candidates);
        let similarity_threshold = value(SIMILARITY_KEY)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|t| *t > 0.0 && *t <= 1.0)
            .unwrap_or(defaults.similarity_threshold);
        let mapping_ttl = value(MAPPING_TTL_HOURS_KEY)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|hours| *hours > 0)
            .and_then(|hours| hours.checked_mul(3600))
            .map(Duration::from_secs);

        Self {
            access_token,
            mapping_file,
            instrument_master,
            api_base,
            max_scan_candidates,
            similarity_threshold,
            mapping_ttl,
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_scan_candidates: self.max_scan_candidates,
            similarity_threshold: self.similarity_threshold,
        }
    }

    /// Values analysis modules check for before they run.
    pub fn module_config(&self) -> Vec<(&'static str, String)> {
        let mut config = Vec::new();
        if let Some(token) = &self.access_token {
            config.push((ACCESS_TOKEN_KEY, token.clone()));
        }
        if let Some(path) = &self.instrument_master {
            config.push((INSTRUMENT_MASTER_KEY, path.display().to_string()));
        }
        config
    }
}
