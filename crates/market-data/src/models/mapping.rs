use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{CanonicalSymbol, InstrumentKey};

/// How a mapping was discovered.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingSource {
    /// The default naming convention produced a key the provider accepted.
    Exact,
    /// The key was found by scanning the provider's instrument universe.
    FallbackScan,
}

/// Association between a canonical symbol and the instrument key a broker
/// uses for it.
///
/// Owned by the mapping cache; at most one mapping exists per canonical
/// symbol and a newer discovery replaces the older one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMapping {
    pub canonical: CanonicalSymbol,
    pub resolved: InstrumentKey,
    pub discovered_at: DateTime<Utc>,
    pub source: MappingSource,
}

impl KeyMapping {
    /// Create a mapping discovered now.
    pub fn new(canonical: &str, resolved: &str, source: MappingSource) -> Self {
        Self {
            canonical: Arc::from(canonical),
            resolved: Arc::from(resolved),
            discovered_at: Utc::now(),
            source,
        }
    }
}
