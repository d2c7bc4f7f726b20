//! Tick and sqrt-price conversions.
//!
//! Prices follow the concentrated-liquidity convention `P = 1.0001 ^ tick`.
//! Everything is computed in `BigDecimal` so the extremes of the tick range
//! (prices around 1e-39 and 1e38) keep full relative precision.

use crate::error::ValuationError;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use std::sync::LazyLock;

/// Lowest tick supported by the protocol.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick supported by the protocol.
pub const MAX_TICK: i32 = 887_272;

/// Significant digits kept after every multiplication.
pub const PRICE_PRECISION: u64 = 64;

const SQRT_BASE_SCALE: u32 = 80;

/// sqrt(1.0001), exact to `SQRT_BASE_SCALE` decimal places.
static SQRT_BASE: LazyLock<BigDecimal> = LazyLock::new(|| {
    let scaled = (BigInt::from(10_001u32) * BigInt::from(10u32).pow(2 * SQRT_BASE_SCALE - 4)).sqrt();
    BigDecimal::new(scaled, i64::from(SQRT_BASE_SCALE))
});

/// 2^96, the Q64.96 scaling factor used by on-chain sqrt prices.
static Q96: LazyLock<BigDecimal> = LazyLock::new(|| BigDecimal::from(BigInt::from(2u32).pow(96)));

/// Returns the price corresponding to a given tick.
/// P = 1.0001 ^ tick
///
/// `tick` may be an integer or a half-integer (tick bounds are halved to
/// obtain sqrt prices). Any other fraction, or a tick beyond
/// [`MIN_TICK`, `MAX_TICK`], is rejected.
pub fn tick_to_price(tick: &BigDecimal) -> Result<BigDecimal, ValuationError> {
    let doubled = tick * BigDecimal::from(2);
    if !doubled.is_integer() {
        return Err(ValuationError::InvalidTick(tick.to_string()));
    }
    let half_ticks = doubled
        .to_i64()
        .filter(|n| n.unsigned_abs() <= 2 * MAX_TICK.unsigned_abs() as u64)
        .ok_or_else(|| ValuationError::InvalidTick(tick.to_string()))?;

    Ok(sqrt_base_pow(half_ticks))
}

/// Returns the sqrt price at a tick: 1.0001 ^ (tick / 2).
pub fn tick_to_sqrt_price(tick: i32) -> Result<BigDecimal, ValuationError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(ValuationError::InvalidTick(tick.to_string()));
    }
    Ok(sqrt_base_pow(i64::from(tick)))
}

/// Converts an on-chain Q64.96 sqrt price into a plain sqrt price.
///
/// The result is sqrt(token1 / token0) in raw token units, the form consumed
/// by the amount formulas.
pub fn sqrt_price_from_x96(sqrt_price_x96: &BigDecimal) -> BigDecimal {
    sqrt_price_x96 / &*Q96
}

/// Computes sqrt(1.0001) ^ exponent by repeated squaring, rounding every
/// intermediate product to [`PRICE_PRECISION`] significant digits.
fn sqrt_base_pow(exponent: i64) -> BigDecimal {
    let mut remaining = exponent.unsigned_abs();
    let mut factor = SQRT_BASE.clone();
    let mut result = BigDecimal::one();

    while remaining > 0 {
        if remaining & 1 == 1 {
            result = (&result * &factor).with_prec(PRICE_PRECISION);
        }
        remaining >>= 1;
        if remaining > 0 {
            factor = (&factor * &factor).with_prec(PRICE_PRECISION);
        }
    }

    if exponent < 0 {
        result.inverse().with_prec(PRICE_PRECISION)
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Signed;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn assert_close(actual: &BigDecimal, expected: &BigDecimal, tolerance: &str) {
        let rel = ((actual - expected) / expected).abs();
        assert!(
            rel < dec(tolerance),
            "{actual} differs from {expected} by {rel}"
        );
    }

    #[test]
    fn test_tick_to_price() {
        // Tick 0 -> Price 1, exactly
        let p = tick_to_price(&BigDecimal::from(0)).unwrap();
        assert_eq!(p, BigDecimal::one());

        // Tick 100 -> 1.0001^100
        let p100 = tick_to_price(&BigDecimal::from(100)).unwrap();
        assert_close(
            &p100,
            &dec("1.01004966209287656885501886290725669482298347957981718"),
            "1e-40",
        );

        let p_neg100 = tick_to_price(&BigDecimal::from(-100)).unwrap();
        assert_close(
            &p_neg100,
            &dec("0.990050328741209481710348809431530130029748217891561951"),
            "1e-40",
        );
    }

    #[test]
    fn test_half_tick_is_sqrt_of_tick() {
        let half = tick_to_price(&dec("50.5")).unwrap();
        let full = tick_to_price(&BigDecimal::from(101)).unwrap();
        assert_close(&(&half * &half), &full, "1e-40");

        assert_eq!(tick_to_sqrt_price(202).unwrap(), full);
    }

    #[test]
    fn test_tick_addition_is_price_multiplication() {
        let pairs = [(1, 2), (-443_610, 443_610), (250_000, -12_345), (-3, -7)];
        for (a, b) in pairs {
            let pa = tick_to_price(&BigDecimal::from(a)).unwrap();
            let pb = tick_to_price(&BigDecimal::from(b)).unwrap();
            let pab = tick_to_price(&BigDecimal::from(a + b)).unwrap();
            assert_close(&(&pa * &pb), &pab, "1e-12");
        }
    }

    #[test]
    fn test_extreme_ticks_do_not_saturate() {
        let max = tick_to_price(&BigDecimal::from(MAX_TICK)).unwrap();
        assert_close(
            &max,
            &dec("340256786836388094050805785052946541066.751507546701582"),
            "1e-30",
        );

        let min = tick_to_price(&BigDecimal::from(MIN_TICK)).unwrap();
        assert!(min.is_positive());
        assert_close(
            &min,
            &dec("2.93895680758558483887475486496883410884307817009650743E-39"),
            "1e-30",
        );
    }

    #[test]
    fn test_invalid_ticks_rejected() {
        assert!(matches!(
            tick_to_price(&dec("0.25")),
            Err(ValuationError::InvalidTick(_))
        ));
        assert!(matches!(
            tick_to_price(&BigDecimal::from(MAX_TICK + 1)),
            Err(ValuationError::InvalidTick(_))
        ));
        assert!(matches!(
            tick_to_sqrt_price(MIN_TICK - 1),
            Err(ValuationError::InvalidTick(_))
        ));
    }

    #[test]
    fn test_sqrt_price_from_x96() {
        let q96 = dec("79228162514264337593543950336");
        assert_eq!(sqrt_price_from_x96(&q96), BigDecimal::one());

        let half = sqrt_price_from_x96(&dec("39614081257132168796771975168"));
        assert_eq!(half, dec("0.5"));
    }
}
