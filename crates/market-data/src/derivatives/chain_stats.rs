//! Aggregate statistics over an extracted option chain.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{ChainSummary, OptionChainEntry, OptionGreeks, PcrSentiment};

/// Which strikes take part in the statistics.
#[derive(Clone, Debug)]
pub struct ChainFilter {
    /// Strikes further than this percentage from spot are ignored.
    pub max_distance_pct: Decimal,
}

impl Default for ChainFilter {
    fn default() -> Self {
        Self {
            max_distance_pct: Decimal::from(12),
        }
    }
}

impl ChainFilter {
    /// Strikes within range of `spot`. Without a positive spot every strike
    /// is kept.
    pub fn apply<'a>(
        &self,
        chain: &'a [OptionChainEntry],
        spot: Option<Decimal>,
    ) -> Vec<&'a OptionChainEntry> {
        match spot.filter(|s| *s > Decimal::ZERO) {
            Some(spot) => chain
                .iter()
                .filter(|e| {
                    (e.strike_price - spot).abs() / spot * Decimal::ONE_HUNDRED
                        <= self.max_distance_pct
                })
                .collect(),
            None => chain.iter().collect(),
        }
    }
}

/// Sentiment band for a put/call ratio.
pub fn pcr_sentiment(pcr: Decimal) -> PcrSentiment {
    if pcr > Decimal::new(15, 1) {
        PcrSentiment::StrongBullish
    } else if pcr > Decimal::ONE {
        PcrSentiment::Bullish
    } else if pcr > Decimal::new(7, 1) {
        PcrSentiment::Neutral
    } else if pcr > Decimal::new(5, 1) {
        PcrSentiment::Bearish
    } else {
        PcrSentiment::StrongBearish
    }
}

/// Strike at which the total intrinsic value owed to option holders is lowest.
///
/// Ties resolve to the lower strike. Unset when the chain carries no open
/// interest at all.
pub fn max_pain(chain: &[&OptionChainEntry]) -> Option<Decimal> {
    let has_oi = chain
        .iter()
        .any(|e| e.call.oi_or_zero() > Decimal::ZERO || e.put.oi_or_zero() > Decimal::ZERO);
    if !has_oi {
        return None;
    }

    let mut best: Option<(Decimal, Decimal)> = None;
    for settle in chain.iter().map(|e| e.strike_price) {
        let pain: Decimal = chain
            .iter()
            .map(|e| {
                let call = (settle - e.strike_price).max(Decimal::ZERO) * e.call.oi_or_zero();
                let put = (e.strike_price - settle).max(Decimal::ZERO) * e.put.oi_or_zero();
                call + put
            })
            .sum();
        let better = match best {
            None => true,
            Some((best_strike, best_pain)) => {
                pain < best_pain || (pain == best_pain && settle < best_strike)
            }
        };
        if better {
            best = Some((settle, pain));
        }
    }
    best.map(|(strike, _)| strike)
}

/// Strike with the largest positive value of `metric`, lowest strike on ties.
fn strike_with_max<F>(chain: &[&OptionChainEntry], metric: F) -> Option<Decimal>
where
    F: Fn(&OptionChainEntry) -> Decimal,
{
    let mut best: Option<(Decimal, Decimal)> = None;
    for entry in chain {
        let value = metric(entry);
        if value <= Decimal::ZERO {
            continue;
        }
        if best.map_or(true, |(_, v)| value > v) {
            best = Some((entry.strike_price, value));
        }
    }
    best.map(|(strike, _)| strike)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Sum of `greek * OI` across both sides of every strike. Legs that do not
/// supply the greek are skipped.
fn oi_weighted<F>(chain: &[&OptionChainEntry], greek: F) -> f64
where
    F: Fn(&OptionGreeks) -> Option<f64>,
{
    chain
        .iter()
        .flat_map(|e| [&e.call, &e.put])
        .filter_map(|leg| Some(greek(leg.greeks.as_ref()?)? * to_f64(leg.oi_or_zero())))
        .sum()
}

/// Sum of `delta * OI` across both sides of every strike.
pub fn net_delta(chain: &[&OptionChainEntry]) -> f64 {
    oi_weighted(chain, |g| g.delta)
}

/// Sum of `theta * OI`: open interest weighted time decay per day.
pub fn net_theta(chain: &[&OptionChainEntry]) -> f64 {
    oi_weighted(chain, |g| g.theta)
}

/// Sum of `vega * OI`.
pub fn net_vega(chain: &[&OptionChainEntry]) -> f64 {
    oi_weighted(chain, |g| g.vega)
}

/// Strike with the largest `gamma * OI` summed over both sides.
pub fn max_gamma_strike(chain: &[&OptionChainEntry]) -> Option<Decimal> {
    let mut best: Option<(Decimal, f64)> = None;
    for entry in chain {
        let exposures: Vec<f64> = [&entry.call, &entry.put]
            .into_iter()
            .filter_map(|leg| Some(leg.greeks.as_ref()?.gamma? * to_f64(leg.oi_or_zero())))
            .collect();
        if exposures.is_empty() {
            continue;
        }
        let exposure: f64 = exposures.iter().sum();
        if best.map_or(true, |(_, b)| exposure > b) {
            best = Some((entry.strike_price, exposure));
        }
    }
    best.map(|(strike, _)| strike)
}

/// Compute the chain summary for the strikes `filter` keeps around `spot`.
pub fn summarize(
    chain: &[OptionChainEntry],
    spot: Option<Decimal>,
    filter: &ChainFilter,
) -> ChainSummary {
    let considered = filter.apply(chain, spot);

    let total_call_oi: Decimal = considered.iter().map(|e| e.call.oi_or_zero()).sum();
    let total_put_oi: Decimal = considered.iter().map(|e| e.put.oi_or_zero()).sum();
    let pcr = (total_call_oi > Decimal::ZERO).then(|| (total_put_oi / total_call_oi).round_dp(2));

    let max_pain_strike = max_pain(&considered);
    let max_pain_distance_pct = match (max_pain_strike, spot.filter(|s| *s > Decimal::ZERO)) {
        (Some(strike), Some(spot)) => {
            Some(((strike - spot) / spot * Decimal::ONE_HUNDRED).round_dp(2))
        }
        _ => None,
    };

    ChainSummary {
        total_call_oi,
        total_put_oi,
        pcr,
        sentiment: pcr.map(pcr_sentiment),
        max_pain_strike,
        max_pain_distance_pct,
        call_resistance: strike_with_max(&considered, |e| e.call.oi_or_zero()),
        put_support: strike_with_max(&considered, |e| e.put.oi_or_zero()),
        net_delta: net_delta(&considered),
        net_theta: net_theta(&considered),
        net_vega: net_vega(&considered),
        max_gamma_strike: max_gamma_strike(&considered),
        strikes_considered: considered.len(),
    }
}
