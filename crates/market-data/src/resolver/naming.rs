//! Default naming convention between price-feed symbols and broker keys.
//!
//! A broker instrument key is `SEGMENT<delim>CODE`, e.g. `NSE_EQ|INE154A01025`
//! or `NSE_INDEX|Nifty 50`. Responses may use `:` where requests use `|`.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Known compound-key delimiters, in the order they are tried.
pub const KEY_DELIMITERS: [char; 2] = ['|', ':'];

/// Delimiter used when building keys.
pub const CANONICAL_DELIMITER: char = '|';

const NSE_EQUITY_SEGMENT: &str = "NSE_EQ";
const BSE_EQUITY_SEGMENT: &str = "BSE_EQ";
const NSE_INDEX_SEGMENT: &str = "NSE_INDEX";

/// Price-feed exchange suffixes and the broker segment each maps to.
const EXCHANGE_SUFFIXES: &[(&str, &str)] = &[(".NS", NSE_EQUITY_SEGMENT), (".BO", BSE_EQUITY_SEGMENT)];

lazy_static! {
    /// Price-feed index tickers and the display name the broker lists them under.
    static ref INDEX_ALIASES: HashMap<&'static str, &'static str> = HashMap::from([
        ("^NSEI", "Nifty 50"),
        ("^NSEBANK", "Nifty Bank"),
        ("^NSEMDCP100", "Nifty Midcap 100"),
        ("^CNXIT", "Nifty IT"),
        ("^INDIAVIX", "India VIX"),
        ("^BSESN", "SENSEX"),
        ("^CNXFIN", "Nifty Fin Service"),
    ]);
}

/// Split a compound key at its first known delimiter into `(segment, code)`.
///
/// # Examples
///
/// ```
/// use chainlens_market_data::resolver::split_instrument_key;
///
/// assert_eq!(split_instrument_key("NSE_EQ|ITC"), Some(("NSE_EQ", "ITC")));
/// assert_eq!(split_instrument_key("NSE_EQ:ITC"), Some(("NSE_EQ", "ITC")));
/// assert_eq!(split_instrument_key("ITC"), None);
/// ```
pub fn split_instrument_key(key: &str) -> Option<(&str, &str)> {
    let idx = key.find(|c| KEY_DELIMITERS.contains(&c))?;
    Some((&key[..idx], &key[idx + 1..]))
}

/// Rewrite a compound key with the given delimiter. Non-compound strings are
/// returned unchanged.
pub fn with_delimiter(key: &str, delimiter: char) -> String {
    match split_instrument_key(key) {
        Some((segment, code)) => format!("{}{}{}", segment, delimiter, code),
        None => key.to_string(),
    }
}

/// Whether two keys name the same instrument regardless of delimiter.
pub fn same_instrument_key(a: &str, b: &str) -> bool {
    match (split_instrument_key(a), split_instrument_key(b)) {
        (Some((seg_a, code_a)), Some((seg_b, code_b))) => {
            seg_a.eq_ignore_ascii_case(seg_b) && code_a == code_b
        }
        _ => a == b,
    }
}

/// Strip a known price-feed exchange suffix and a leading index caret.
///
/// Unknown suffixes are preserved (`BRK.B` stays `BRK.B`).
pub fn strip_exchange_suffix(symbol: &str) -> &str {
    let symbol = symbol.trim().trim_start_matches('^');
    for (suffix, _) in EXCHANGE_SUFFIXES {
        if let Some(stripped) = strip_suffix_ignore_case(symbol, suffix) {
            return stripped;
        }
    }
    symbol
}

fn strip_suffix_ignore_case<'a>(symbol: &'a str, suffix: &str) -> Option<&'a str> {
    let split = symbol.len().checked_sub(suffix.len())?;
    if !symbol.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = symbol.split_at(split);
    (tail.eq_ignore_ascii_case(suffix) && !head.is_empty()).then_some(head)
}

/// Instrument key the default naming convention derives for a canonical symbol.
///
/// - `X.NS` becomes `NSE_EQ|X`, `X.BO` becomes `BSE_EQ|X`
/// - `^X` becomes `NSE_INDEX|X`
/// - strings that already look like keys are normalised to `|`
/// - anything else is assumed to be an NSE equity
///
/// The result is only a guess; the provider decides whether it exists.
pub fn default_instrument_key(canonical: &str) -> String {
    let symbol = canonical.trim();

    if split_instrument_key(symbol).is_some() {
        return with_delimiter(symbol, CANONICAL_DELIMITER);
    }

    if let Some(index) = symbol.strip_prefix('^') {
        return format!("{}{}{}", NSE_INDEX_SEGMENT, CANONICAL_DELIMITER, index);
    }

    for (suffix, segment) in EXCHANGE_SUFFIXES {
        if let Some(code) = strip_suffix_ignore_case(symbol, suffix) {
            return format!("{}{}{}", segment, CANONICAL_DELIMITER, code);
        }
    }

    format!("{}{}{}", NSE_EQUITY_SEGMENT, CANONICAL_DELIMITER, symbol)
}

/// Display name the broker uses for a price-feed index ticker, if known.
pub fn index_alias(canonical: &str) -> Option<&'static str> {
    INDEX_ALIASES
        .iter()
        .find(|(ticker, _)| ticker.eq_ignore_ascii_case(canonical.trim()))
        .map(|(_, name)| *name)
}

/// Names a fallback-scan candidate may be listed under.
///
/// The suffix-stripped symbol always comes first, followed by the known
/// display name for index tickers.
pub fn name_hints(canonical: &str) -> Vec<String> {
    let mut hints = Vec::with_capacity(2);
    let base = match split_instrument_key(canonical) {
        Some((_, code)) => code,
        None => strip_exchange_suffix(canonical),
    };
    if !base.is_empty() {
        hints.push(base.to_string());
    }
    if let Some(alias) = index_alias(canonical) {
        hints.push(alias.to_string());
    }
    hints
}
