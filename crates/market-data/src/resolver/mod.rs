//! Symbol resolution for broker instrument keys.
//!
//! Converts canonical price-feed symbols (e.g. "^NSEI", "ITC.NS") into the
//! instrument keys a broker expects (e.g. "NSE_INDEX|Nifty 50").
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SymbolResolver                          │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 1. MappingCache                                         │ │
//! │  │    - Fresh mapping from an earlier discovery            │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                           │ miss                             │
//! │                           ▼                                  │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 2. Exact match (naming convention)                      │ │
//! │  │    - "X.NS" -> "NSE_EQ|X", "^X" -> "NSE_INDEX|X"        │ │
//! │  │    - Accepted when the provider returns a price         │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! │                           │ miss                             │
//! │                           ▼                                  │
//! │  ┌────────────────────────────────────────────────────────┐ │
//! │  │ 3. Fallback scan (bounded)                              │ │
//! │  │    - Rank universe by name match, probe best first      │ │
//! │  └────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Successful steps 2 and 3 are recorded in the cache. If all three miss,
//! resolution fails with `NotFound`.

mod matcher;
mod naming;
mod symbol_resolver;
mod traits;

pub use matcher::{longest_common_substring, normalize_text, rank_candidates, similarity, ScanCandidate};
pub use naming::{
    default_instrument_key, index_alias, name_hints, same_instrument_key, split_instrument_key,
    strip_exchange_suffix, with_delimiter, CANONICAL_DELIMITER, KEY_DELIMITERS,
};
pub use symbol_resolver::{ResolverConfig, SymbolResolver};
pub use traits::{KeyResolver, ResolutionSource, ResolvedKey};
