//! Mapping cache and its persistent store.
//!
//! The cache is the only owner of [`KeyMapping`](crate::models::KeyMapping)s.
//! It is constructed once and shared by the resolver and the analytics engine.

mod mapping_cache;
mod store;

pub use mapping_cache::{CacheConfig, MappingCache};
pub use store::{JsonFileMappingStore, MappingStore};
