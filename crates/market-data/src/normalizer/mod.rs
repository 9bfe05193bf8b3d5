//! Response normalization.
//!
//! Provider payloads disagree on two axes:
//!
//! ```text
//! data key:     "NSE_EQ|ITC"  vs  "NSE_EQ:ITC"  vs  any entry with instrument_token
//! price field:  last_price    vs  ltp           vs  lastPrice
//! ```
//!
//! [`ResponseNormalizer`] hides both behind [`NormalizedQuote`](crate::models::NormalizedQuote).

mod response_normalizer;
pub(crate) mod values;

pub use response_normalizer::{
    EntryLocator, QuoteShape, ResponseNormalizer, OPEN_INTEREST_ALIASES, PRICE_ALIASES,
    VOLUME_ALIASES,
};
