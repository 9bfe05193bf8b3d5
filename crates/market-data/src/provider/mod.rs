//! Instrument provider abstractions and implementations.
//!
//! This module contains:
//! - The `InstrumentProvider` trait every broker client implements
//! - Provider capabilities
//! - The Upstox client (quotes, option chains, instrument master)
//!
//! Providers return raw payloads. Status checks, delimiter variants and field
//! aliases are handled by the normalizer, not by the providers themselves.

mod capabilities;
mod traits;

pub mod upstox;

pub use capabilities::ProviderCapabilities;
pub use traits::InstrumentProvider;
