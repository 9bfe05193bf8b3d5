//! Market data models
//!
//! This module contains the core data types for resolution and analytics:
//! - `types` - Type aliases for identifiers (CanonicalSymbol, InstrumentKey)
//! - `mapping` - Discovered canonical-symbol to instrument-key associations (KeyMapping)
//! - `raw` - Opaque provider payloads (RawQuoteBlob)
//! - `universe` - Fallback-scan candidates (UniverseEntry)
//! - `quote` - Normalized quote data (NormalizedQuote)
//! - `option_chain` - Per-strike option data and Greeks (OptionChainEntry)
//! - `analytics` - Request options and the terminal AnalyticsRecord

mod analytics;
mod mapping;
mod option_chain;
mod quote;
mod raw;
mod types;
mod universe;

pub use analytics::{
    AnalysisOptions, AnalyticsRecord, BasisStance, ChainSummary, FuturesBasis, FuturesContract,
    PcrSentiment,
};
pub use mapping::{KeyMapping, MappingSource};
pub use option_chain::{OptionChainEntry, OptionGreeks, OptionLeg};
pub use quote::NormalizedQuote;
pub use raw::RawQuoteBlob;
pub use types::{CanonicalSymbol, InstrumentKey};
pub use universe::UniverseEntry;
