//! Resolution traits for the market data crate.
//!
//! Defines the abstraction the analytics engine uses to turn a canonical
//! symbol into the instrument key a broker expects.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{InstrumentKey, KeyMapping, MappingSource};

/// Resolution result containing the instrument key and its source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedKey {
    /// The broker instrument key to query.
    pub key: InstrumentKey,
    /// Where this resolution came from.
    pub source: ResolutionSource,
}

/// Indicates how an instrument key was resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionSource {
    /// From a fresh entry in the mapping cache, without any network call.
    Cache,
    /// The default naming convention produced a key the provider accepted.
    Exact,
    /// Discovered by scanning the provider's instrument universe.
    FallbackScan,
}

impl ResolutionSource {
    /// Whether this resolution came from the mapping cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cache)
    }
}

impl From<MappingSource> for ResolutionSource {
    fn from(source: MappingSource) -> Self {
        match source {
            MappingSource::Exact => Self::Exact,
            MappingSource::FallbackScan => Self::FallbackScan,
        }
    }
}

/// Main key resolver interface.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Resolve a canonical symbol to a broker instrument key.
    ///
    /// # Returns
    /// * `Ok(resolved)` - The key to query and how it was found
    /// * `Err(NotFound)` - Every strategy was exhausted
    /// * `Err(other)` - Configuration or transport failure, resolution aborted
    async fn resolve(&self, canonical: &str) -> Result<ResolvedKey, MarketDataError>;

    /// Drop the cached mapping for `canonical` so the next `resolve`
    /// rediscovers it. Returns the mapping that was removed.
    fn invalidate(&self, canonical: &str) -> Result<Option<KeyMapping>, MarketDataError>;
}
