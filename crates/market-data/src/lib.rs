//! Chainlens Market Data Crate
//!
//! Instrument key resolution and derivatives normalization for brokers whose
//! symbol naming, response shape and key delimiters disagree with the
//! price feed.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Resolving canonical symbols ("^NSEI") to broker keys ("NSE_INDEX|Nifty 50")
//! - Remembering discoveries across restarts so fallback scans run once
//! - Normalizing quote payloads regardless of delimiter or field alias
//! - Extracting option chains with Greeks, chain statistics and futures basis
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  Plugin Layer    | --> | AnalyticsEngine  |  (orchestrator)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+     +------------------+
//!                          |  SymbolResolver  | <-> |  MappingCache    |  (persisted)
//!                          +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  (Upstox, etc.)
//!                          +------------------+
//!                                  |
//!                                  v
//!                         +--------------------+
//!                         | ResponseNormalizer |  (delimiters, aliases)
//!                         +--------------------+
//!                                  |
//!                                  v
//!                    +-----------------------------+
//!                    | GreeksExtractor / Basis     |  (derivatives)
//!                    +-----------------------------+
//! ```
//!
//! # Core Types
//!
//! - [`KeyMapping`] - Discovered canonical symbol to instrument key association
//! - [`RawQuoteBlob`] - Opaque provider payload
//! - [`NormalizedQuote`] - Quote extracted from a payload
//! - [`OptionChainEntry`] - One strike of an option chain with Greeks
//! - [`AnalyticsRecord`] - Terminal output of one analytics request
//!
//! # Type Aliases
//!
//! - [`CanonicalSymbol`] - Price-feed symbol (e.g., "^NSEI", "ITC.NS")
//! - [`InstrumentKey`] - Broker key (e.g., "NSE_EQ|INE154A01025")

pub mod cache;
pub mod derivatives;
pub mod engine;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod resolver;

// Re-export all public types from models
pub use models::{
    AnalysisOptions, AnalyticsRecord, BasisStance, CanonicalSymbol, ChainSummary, FuturesBasis,
    FuturesContract, InstrumentKey, KeyMapping, MappingSource, NormalizedQuote, OptionChainEntry,
    OptionGreeks, OptionLeg, PcrSentiment, RawQuoteBlob, UniverseEntry,
};

// Re-export component types
pub use cache::{CacheConfig, JsonFileMappingStore, MappingCache, MappingStore};
pub use derivatives::{BasisCalculator, ChainFilter, GreeksExtractor};
pub use engine::AnalyticsEngine;
pub use errors::{ErrorKind, MarketDataError};
pub use normalizer::ResponseNormalizer;
pub use resolver::{KeyResolver, ResolutionSource, ResolvedKey, ResolverConfig, SymbolResolver};

// Re-export provider types
pub use provider::upstox::UpstoxProvider;
pub use provider::{InstrumentProvider, ProviderCapabilities};
