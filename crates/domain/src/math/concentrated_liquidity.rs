use crate::error::{TokenSide, ValuationError};
use crate::math::price_tick::tick_to_sqrt_price;
use crate::value_objects::amount::Amount;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

/// Where the pool's current tick sits relative to a position's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeStatus {
    /// current tick <= lower bound: only token0 is held.
    BelowRange,
    /// lower < current tick < upper: both tokens are held.
    InRange,
    /// current tick >= upper bound: only token1 is held.
    AboveRange,
}

impl RangeStatus {
    /// Short label used in reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BelowRange => "below",
            Self::InRange => "in-range",
            Self::AboveRange => "above",
        }
    }
}

/// Token amounts attributable to a position at the pool's current price,
/// adjusted by each token's decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub amount0: BigDecimal,
    pub amount1: BigDecimal,
    pub status: RangeStatus,
}

/// Classifies the current tick against `[tick_lower, tick_upper]`.
///
/// Both bounds are exclusive for the mixed case: a tick sitting exactly on
/// `tick_lower` holds only token0, one exactly on `tick_upper` only token1.
/// A zero-width range resolves to `BelowRange`.
pub fn classify(
    tick_lower: i32,
    tick_upper: i32,
    current_tick: i32,
) -> Result<RangeStatus, ValuationError> {
    if tick_lower > tick_upper {
        return Err(ValuationError::InvalidRange {
            lower: tick_lower,
            upper: tick_upper,
        });
    }

    let status = if current_tick <= tick_lower {
        RangeStatus::BelowRange
    } else if current_tick >= tick_upper {
        RangeStatus::AboveRange
    } else {
        RangeStatus::InRange
    };
    Ok(status)
}

/// Calculates the amount of token0 (x) given liquidity and a sqrt price range.
/// delta_x = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
///
/// Arguments are not reordered: an inverted range yields a negative amount.
pub fn get_amount0_delta(
    liquidity: &BigDecimal,
    sqrt_price_a: &BigDecimal,
    sqrt_price_b: &BigDecimal,
) -> Result<BigDecimal, ValuationError> {
    for sqrt_price in [sqrt_price_a, sqrt_price_b] {
        if !sqrt_price.is_positive() {
            return Err(ValuationError::InvalidSqrtPrice(sqrt_price.clone()));
        }
    }

    let num = sqrt_price_b - sqrt_price_a;
    let den = sqrt_price_a * sqrt_price_b;

    Ok(liquidity * num / den)
}

/// Calculates the amount of token1 (y) given liquidity and a sqrt price range.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
pub fn get_amount1_delta(
    liquidity: &BigDecimal,
    sqrt_price_a: &BigDecimal,
    sqrt_price_b: &BigDecimal,
) -> BigDecimal {
    liquidity * (sqrt_price_b - sqrt_price_a)
}

/// Computes the token amounts currently locked in a position.
///
/// `current_sqrt_price` is the plain (not Q64.96) sqrt price of the pool.
/// The range is classified with `current_tick`, the in-range formulas use
/// `current_sqrt_price`; if the two disagree the result can turn negative,
/// which is reported as [`ValuationError::NegativeAmount`].
pub fn current_amounts(
    liquidity: &BigInt,
    tick_lower: i32,
    tick_upper: i32,
    current_tick: i32,
    current_sqrt_price: &BigDecimal,
    decimals0: u8,
    decimals1: u8,
) -> Result<ValuationResult, ValuationError> {
    let status = classify(tick_lower, tick_upper, current_tick)?;

    let sa = tick_to_sqrt_price(tick_lower)?;
    let sb = tick_to_sqrt_price(tick_upper)?;
    let liquidity = BigDecimal::from(liquidity.clone());

    let (raw0, raw1) = match status {
        RangeStatus::AboveRange => (BigDecimal::zero(), get_amount1_delta(&liquidity, &sa, &sb)),
        RangeStatus::InRange => (
            get_amount0_delta(&liquidity, current_sqrt_price, &sb)?,
            get_amount1_delta(&liquidity, &sa, current_sqrt_price),
        ),
        RangeStatus::BelowRange => (get_amount0_delta(&liquidity, &sa, &sb)?, BigDecimal::zero()),
    };

    if raw0.is_negative() {
        return Err(ValuationError::NegativeAmount {
            side: TokenSide::Token0,
            amount: raw0,
        });
    }
    if raw1.is_negative() {
        return Err(ValuationError::NegativeAmount {
            side: TokenSide::Token1,
            amount: raw1,
        });
    }

    Ok(ValuationResult {
        amount0: Amount::new(raw0, decimals0).to_decimal(),
        amount1: Amount::new(raw1, decimals1).to_decimal(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn sqrt_at(tick: i32) -> BigDecimal {
        tick_to_sqrt_price(tick).unwrap()
    }

    fn amounts_at(current_tick: i32) -> ValuationResult {
        let liquidity = BigInt::from(10u64.pow(18));
        current_amounts(&liquidity, -100, 100, current_tick, &sqrt_at(current_tick), 18, 18)
            .unwrap()
    }

    fn assert_close(actual: &BigDecimal, expected: &BigDecimal, tolerance: &str) {
        let rel = ((actual - expected) / expected).abs();
        assert!(rel < dec(tolerance), "{actual} vs {expected}: {rel}");
    }

    #[test]
    fn test_amount_deltas() {
        // Example: Liquidity 1000
        // Price goes from 1 to 4 (sqrt: 1 to 2)
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 1000 * 0.5 = 500

        let liquidity = BigDecimal::from(1000);
        let sqrt_p_a = BigDecimal::from(1);
        let sqrt_p_b = BigDecimal::from(2);

        let dy = get_amount1_delta(&liquidity, &sqrt_p_a, &sqrt_p_b);
        assert_eq!(dy, BigDecimal::from(1000));

        let dx = get_amount0_delta(&liquidity, &sqrt_p_a, &sqrt_p_b).unwrap();
        assert_eq!(dx, BigDecimal::from(500));
    }

    #[test]
    fn test_amount0_delta_rejects_zero_sqrt_price() {
        let result = get_amount0_delta(&BigDecimal::one(), &BigDecimal::zero(), &BigDecimal::one());
        assert!(matches!(result, Err(ValuationError::InvalidSqrtPrice(_))));
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(-100, 100, -100).unwrap(), RangeStatus::BelowRange);
        assert_eq!(classify(-100, 100, -101).unwrap(), RangeStatus::BelowRange);
        assert_eq!(classify(-100, 100, -99).unwrap(), RangeStatus::InRange);
        assert_eq!(classify(-100, 100, 99).unwrap(), RangeStatus::InRange);
        assert_eq!(classify(-100, 100, 100).unwrap(), RangeStatus::AboveRange);
        assert_eq!(classify(-100, 100, 5000).unwrap(), RangeStatus::AboveRange);
        assert_eq!(classify(10, 10, 10).unwrap(), RangeStatus::BelowRange);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = current_amounts(&BigInt::from(1), 100, -100, 0, &BigDecimal::one(), 18, 18)
            .unwrap_err();
        assert_eq!(
            err,
            ValuationError::InvalidRange {
                lower: 100,
                upper: -100
            }
        );
    }

    #[test]
    fn test_lower_boundary_holds_only_token0() {
        let result = amounts_at(-100);
        assert_eq!(result.status, RangeStatus::BelowRange);
        assert!(result.amount1.is_zero());
        assert_close(
            &result.amount0,
            &dec("0.009999541693800299634194037820805841105347630668651177"),
            "1e-30",
        );
    }

    #[test]
    fn test_upper_boundary_holds_only_token1() {
        let result = amounts_at(100);
        assert_eq!(result.status, RangeStatus::AboveRange);
        assert!(result.amount0.is_zero());
        assert_close(
            &result.amount1,
            &dec("0.009999541693800299634194037820805841105347630668651177"),
            "1e-30",
        );
    }

    #[test]
    fn test_in_range_holds_both_tokens() {
        let result = amounts_at(0);
        assert_eq!(result.status, RangeStatus::InRange);
        let expected = dec("0.004987272070749096133500226527844539629524484136083292");
        assert_close(&result.amount0, &expected, "1e-30");
        assert_close(&result.amount1, &expected, "1e-30");
    }

    #[test]
    fn test_exactly_one_token_outside_range() {
        for tick in [-5000, -101, -100, 100, 101, 5000] {
            let result = amounts_at(tick);
            assert!(
                result.amount0.is_zero() ^ result.amount1.is_zero(),
                "tick {tick}: {result:?}"
            );
        }
        for tick in [-99, -1, 0, 1, 99] {
            let result = amounts_at(tick);
            assert!(result.amount0.is_positive() && result.amount1.is_positive());
        }
    }

    #[test]
    fn test_amounts_are_monotonic_in_current_tick() {
        let mut previous: Option<ValuationResult> = None;
        for tick in (-150..=150).step_by(5) {
            let current = amounts_at(tick);
            if let Some(prev) = &previous {
                assert!(current.amount0 <= prev.amount0, "amount0 rose at tick {tick}");
                assert!(current.amount1 >= prev.amount1, "amount1 fell at tick {tick}");
            }
            previous = Some(current);
        }
    }

    #[test]
    fn test_full_range_position() {
        let liquidity = BigInt::from(1_000_000);
        let result = current_amounts(
            &liquidity,
            -887_220,
            887_220,
            0,
            &BigDecimal::one(),
            18,
            18,
        )
        .unwrap();

        // Reference values computed at 90 significant digits.
        let expected = dec("9.99999999999999999945646725778635145199457055540564884E-13");
        assert!(result.amount0.is_positive());
        assert!(result.amount1.is_positive());
        assert_close(&result.amount0, &expected, "1e-9");
        assert_close(&result.amount1, &expected, "1e-9");
    }

    #[test]
    fn test_negative_liquidity_is_surfaced() {
        let liquidity = BigInt::from(-1_000);
        for tick in [-200, 0, 200] {
            let err = current_amounts(&liquidity, -100, 100, tick, &sqrt_at(tick), 18, 18)
                .unwrap_err();
            assert!(
                matches!(err, ValuationError::NegativeAmount { .. }),
                "tick {tick}: {err:?}"
            );
        }
    }

    #[test]
    fn test_sqrt_price_disagreeing_with_tick_is_surfaced() {
        // Tick says in range, sqrt price is above the upper bound.
        let err = current_amounts(&BigInt::from(1_000), -100, 100, 0, &sqrt_at(200), 18, 18)
            .unwrap_err();
        assert!(matches!(
            err,
            ValuationError::NegativeAmount {
                side: TokenSide::Token0,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_liquidity_yields_zero_amounts() {
        let result =
            current_amounts(&BigInt::zero(), -100, 100, 0, &BigDecimal::one(), 6, 18).unwrap();
        assert!(result.amount0.is_zero());
        assert!(result.amount1.is_zero());
    }

    #[test]
    fn test_decimals_are_applied_per_token() {
        let liquidity = BigInt::from(10u64.pow(18));
        let result = current_amounts(&liquidity, -100, 100, 0, &BigDecimal::one(), 6, 18).unwrap();
        assert_close(
            &(&result.amount0 / BigDecimal::from(10u64.pow(12))),
            &result.amount1,
            "1e-40",
        );
    }
}
