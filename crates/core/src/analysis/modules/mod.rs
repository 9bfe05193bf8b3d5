//! Analysis module implementations.
//!
//! - Option chain analysis (PCR, max pain, OI levels)
//! - Greeks analysis (net delta, gamma concentration)
//! - Futures basis analysis (premium or discount to spot)

pub mod futures_basis;
pub mod greeks;
pub mod option_chain;

// Re-export module implementations
pub use futures_basis::FuturesBasisModule;
pub use greeks::GreeksModule;
pub use option_chain::OptionChainModule;

use chainlens_market_data::provider::upstox::ACCESS_TOKEN_KEY;

/// Configuration every broker-backed module needs.
pub(crate) const BROKER_CONFIG: &[&str] = &[ACCESS_TOKEN_KEY];
