use std::sync::Arc;

/// Instrument identifier in the price-feed convention (e.g. "^NSEI", "ITC.NS")
pub type CanonicalSymbol = Arc<str>;

/// Broker-specific instrument identifier (e.g. "NSE_INDEX|Nifty 50")
pub type InstrumentKey = Arc<str>;
