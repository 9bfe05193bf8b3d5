//! Provider capabilities.
//!
//! Describes which optional operations a provider client implements so the
//! analytics engine can reject a request before any network call.

/// Describes the capabilities of an instrument provider.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Whether the provider serves option chains.
    pub supports_option_chain: bool,

    /// Whether the provider can list futures contracts for an underlying.
    pub supports_futures: bool,

    /// Whether the provider can enumerate its instrument universe.
    pub supports_universe: bool,
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self {
            supports_option_chain: false,
            supports_futures: false,
            supports_universe: true,
        }
    }
}
