use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{BasisStance, FuturesBasis, NormalizedQuote};

/// Computes the futures basis against spot.
///
/// `basis = futures - spot` and `basis_pct = basis / spot * 100`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasisCalculator;

impl BasisCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute the basis from the two normalized quotes.
    ///
    /// Fails with `Computation` when the spot price is not positive, since
    /// the percentage would be undefined.
    pub fn compute(
        &self,
        futures: &NormalizedQuote,
        spot: &NormalizedQuote,
        expiry: Option<NaiveDate>,
    ) -> Result<FuturesBasis, MarketDataError> {
        let spot_price = spot.last_price;
        if spot_price <= Decimal::ZERO {
            return Err(MarketDataError::Computation(format!(
                "cannot compute basis for {}: spot price is {}",
                futures.instrument_key, spot_price
            )));
        }

        let futures_price = futures.last_price;
        let basis = futures_price - spot_price;
        let basis_pct = basis
            .checked_div(spot_price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                MarketDataError::Computation(format!(
                    "basis percentage overflow for {}",
                    futures.instrument_key
                ))
            })?;

        let stance = match basis.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => BasisStance::Premium,
            std::cmp::Ordering::Less => BasisStance::Discount,
            std::cmp::Ordering::Equal => BasisStance::Flat,
        };

        Ok(FuturesBasis {
            futures_key: futures.instrument_key.clone(),
            futures_price,
            spot_price,
            basis,
            basis_pct,
            stance,
            expiry,
            futures_change: futures.change(),
            futures_change_pct: futures.change_pct(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn quote(key: &str, price: Decimal) -> NormalizedQuote {
        NormalizedQuote::new(Arc::from(key), price)
    }

    #[test]
    fn test_premium() {
        let basis = BasisCalculator::new()
            .compute(
                &quote("NSE_FO|51001", dec!(24650)),
                &quote("NSE_INDEX|Nifty 50", dec!(24500)),
                None,
            )
            .unwrap();

        assert_eq!(basis.basis, dec!(150));
        assert_eq!(basis.basis_pct.round_dp(3), dec!(0.612));
        assert_eq!(basis.stance, BasisStance::Premium);
        assert_eq!(basis.futures_key.as_ref(), "NSE_FO|51001");
    }

    #[test]
    fn test_discount_and_flat() {
        let calculator = BasisCalculator::new();
        let spot = quote("NSE_INDEX|Nifty 50", dec!(24500));

        let discount = calculator.compute(&quote("F", dec!(24400)), &spot, None).unwrap();
        assert_eq!(discount.stance, BasisStance::Discount);
        assert!(discount.basis_pct < Decimal::ZERO);

        let flat = calculator.compute(&quote("F", dec!(24500)), &spot, None).unwrap();
        assert_eq!(flat.stance, BasisStance::Flat);
        assert_eq!(flat.basis_pct, Decimal::ZERO);
    }

    #[test]
    fn test_futures_leg_change() {
        let mut futures = quote("NSE_FO|51001", dec!(24650));
        futures.net_change = Some(dec!(-50));
        let basis = BasisCalculator::new()
            .compute(&futures, &quote("NSE_INDEX|Nifty 50", dec!(24500)), None)
            .unwrap();

        assert_eq!(basis.futures_change, Some(dec!(-50)));
        assert_eq!(basis.futures_change_pct.map(|p| p.round_dp(4)), Some(dec!(-0.2024)));

        let flat = BasisCalculator::new()
            .compute(&quote("F", dec!(24500)), &quote("S", dec!(24500)), None)
            .unwrap();
        assert!(flat.futures_change.is_none());
        assert!(flat.futures_change_pct.is_none());
    }

    #[test]
    fn test_zero_spot_is_computation_error() {
        let result = BasisCalculator::new().compute(
            &quote("NSE_FO|51001", dec!(24650)),
            &quote("NSE_INDEX|Nifty 50", Decimal::ZERO),
            None,
        );
        assert!(matches!(result, Err(MarketDataError::Computation(_))));
    }
}
