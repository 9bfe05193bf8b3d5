use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::InstrumentKey;

/// One instrument of a provider's universe, as seen by the fallback scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniverseEntry {
    pub instrument_key: InstrumentKey,

    /// Trading symbol and display name, when the provider lists them.
    /// The code part of the key is always matched as well.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
}

impl UniverseEntry {
    pub fn new(instrument_key: &str) -> Self {
        Self {
            instrument_key: Arc::from(instrument_key),
            names: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }
}

impl From<InstrumentKey> for UniverseEntry {
    fn from(instrument_key: InstrumentKey) -> Self {
        Self {
            instrument_key,
            names: Vec::new(),
        }
    }
}
