//! Derivatives analytics.
//!
//! - [`GreeksExtractor`] turns an option chain payload into per-strike entries
//! - [`BasisCalculator`] compares a futures quote with its spot quote
//! - [`chain_stats`] summarizes a chain (PCR, max pain, OI walls, exposures)
//! - [`expiry`] picks the option expiry to request

mod basis;
pub mod chain_stats;
pub mod expiry;
mod greeks;

pub use basis::BasisCalculator;
pub use chain_stats::{summarize, ChainFilter};
pub use greeks::GreeksExtractor;
