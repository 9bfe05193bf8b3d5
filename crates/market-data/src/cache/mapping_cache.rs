//! In-process cache of canonical symbol to instrument key mappings.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};

use crate::errors::MarketDataError;
use crate::models::KeyMapping;

use super::store::MappingStore;

/// Freshness policy for cached mappings.
#[derive(Clone, Debug, Default)]
pub struct CacheConfig {
    /// Maximum age of a mapping. `None` keeps mappings fresh until they are
    /// explicitly invalidated.
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// Cache of discovered mappings, optionally backed by a [`MappingStore`].
///
/// Safe under concurrent use. Each `put` or `invalidate` on one symbol is
/// atomic and the backing store is rewritten in the same order the changes
/// were applied.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(JsonFileMappingStore::new("key_mappings.json"));
/// let cache = MappingCache::with_store(store, CacheConfig::default())?;
///
/// cache.put(KeyMapping::new("^NSEI", "NSE_INDEX|Nifty 50", MappingSource::FallbackScan))?;
/// assert!(cache.get("^NSEI").is_some());
/// ```
pub struct MappingCache {
    entries: RwLock<HashMap<String, KeyMapping>>,
    store: Option<Arc<dyn MappingStore>>,
    /// Serialises mutate-then-persist sequences.
    persist_lock: Mutex<()>,
    config: CacheConfig,
}

impl MappingCache {
    /// Create an empty in-memory cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            store: None,
            persist_lock: Mutex::new(()),
            config,
        }
    }

    /// Create a cache preloaded from `store`, flushing every change back to it.
    pub fn with_store(
        store: Arc<dyn MappingStore>,
        config: CacheConfig,
    ) -> Result<Self, MarketDataError> {
        let loaded = store.load()?;
        info!("Loaded {} key mappings", loaded.len());

        let entries = loaded
            .into_iter()
            .map(|m| (m.canonical.to_string(), m))
            .collect();

        Ok(Self {
            entries: RwLock::new(entries),
            store: Some(store),
            persist_lock: Mutex::new(()),
            config,
        })
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, KeyMapping>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Mapping cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, KeyMapping>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Mapping cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lock_persist(&self) -> MutexGuard<'_, ()> {
        self.persist_lock.lock().unwrap_or_else(|poisoned| {
            warn!("Mapping persist lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn is_fresh(&self, mapping: &KeyMapping) -> bool {
        let Some(ttl) = self.config.ttl else {
            return true;
        };
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return true;
        };
        Utc::now().signed_duration_since(mapping.discovered_at) <= ttl
    }

    /// Return the mapping for `canonical` if one exists and is still fresh.
    pub fn get(&self, canonical: &str) -> Option<KeyMapping> {
        let entries = self.read_entries();
        let mapping = entries.get(canonical)?;
        if self.is_fresh(mapping) {
            debug!("Mapping cache hit for {}", canonical);
            Some(mapping.clone())
        } else {
            debug!("Mapping for {} has expired", canonical);
            None
        }
    }

    /// Store a mapping, replacing any previous one for the same symbol.
    ///
    /// The in-memory entry is updated even when persisting fails.
    pub fn put(&self, mapping: KeyMapping) -> Result<(), MarketDataError> {
        let _persist = self.lock_persist();
        let snapshot = {
            let mut entries = self.write_entries();
            info!(
                "Caching mapping {} -> {} ({:?})",
                mapping.canonical, mapping.resolved, mapping.source
            );
            entries.insert(mapping.canonical.to_string(), mapping);
            self.store.as_ref().map(|_| entries.values().cloned().collect::<Vec<_>>())
        };
        self.persist(snapshot)
    }

    /// Drop the mapping for `canonical`, returning it if there was one.
    pub fn invalidate(&self, canonical: &str) -> Result<Option<KeyMapping>, MarketDataError> {
        let _persist = self.lock_persist();
        let (removed, snapshot) = {
            let mut entries = self.write_entries();
            let removed = entries.remove(canonical);
            let snapshot = match (&removed, &self.store) {
                (Some(_), Some(_)) => Some(entries.values().cloned().collect::<Vec<_>>()),
                _ => None,
            };
            (removed, snapshot)
        };

        if let Some(ref mapping) = removed {
            info!("Invalidated mapping {} -> {}", canonical, mapping.resolved);
        }
        self.persist(snapshot)?;
        Ok(removed)
    }

    fn persist(&self, snapshot: Option<Vec<KeyMapping>>) -> Result<(), MarketDataError> {
        match (&self.store, snapshot) {
            (Some(store), Some(mut mappings)) => {
                mappings.sort_by(|a, b| a.canonical.cmp(&b.canonical));
                store.save(&mappings)
            }
            _ => Ok(()),
        }
    }

    /// Number of cached mappings, fresh or not.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// All cached mappings ordered by canonical symbol.
    pub fn snapshot(&self) -> Vec<KeyMapping> {
        let mut mappings: Vec<KeyMapping> = self.read_entries().values().cloned().collect();
        mappings.sort_by(|a, b| a.canonical.cmp(&b.canonical));
        mappings
    }
}

impl Default for MappingCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
