//! Durable storage for discovered key mappings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;
use crate::models::KeyMapping;

const CURRENT_VERSION: u32 = 1;

/// Key-value persistence for [`KeyMapping`]s, keyed by canonical symbol.
///
/// Loaded once at startup and rewritten after every change.
pub trait MappingStore: Send + Sync {
    /// Load every persisted mapping. A store that was never written is empty.
    fn load(&self) -> Result<Vec<KeyMapping>, MarketDataError>;

    /// Replace the persisted contents with `mappings`.
    fn save(&self, mappings: &[KeyMapping]) -> Result<(), MarketDataError>;
}

#[derive(Serialize, Deserialize, Default)]
struct MappingFile {
    version: u32,
    mappings: BTreeMap<String, KeyMapping>,
}

/// Mapping store backed by a pretty-printed JSON file.
#[derive(Debug)]
pub struct JsonFileMappingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileMappingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, action: &str, e: impl std::fmt::Display) -> MarketDataError {
        MarketDataError::Persistence(format!(
            "Failed to {} {}: {}",
            action,
            self.path.display(),
            e
        ))
    }
}

impl MappingStore for JsonFileMappingStore {
    fn load(&self) -> Result<Vec<KeyMapping>, MarketDataError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| MarketDataError::Persistence("Mapping store lock poisoned".into()))?;

        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read(&self.path).map_err(|e| self.storage_error("read", e))?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let file: MappingFile =
            serde_json::from_slice(&raw).map_err(|e| self.storage_error("parse", e))?;
        if file.version > CURRENT_VERSION {
            return Err(MarketDataError::Persistence(format!(
                "Unsupported mapping file version {} in {}",
                file.version,
                self.path.display()
            )));
        }
        Ok(file.mappings.into_values().collect())
    }

    fn save(&self, mappings: &[KeyMapping]) -> Result<(), MarketDataError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| MarketDataError::Persistence("Mapping store lock poisoned".into()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.storage_error("create directory for", e))?;
        }

        let file = MappingFile {
            version: CURRENT_VERSION,
            mappings: mappings
                .iter()
                .map(|m| (m.canonical.to_string(), m.clone()))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| self.storage_error("encode", e))?;
        fs::write(&self.path, json).map_err(|e| self.storage_error("write", e))
    }
}
