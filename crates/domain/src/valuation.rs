//! Position valuation: token amounts, USD value, fees and PnL.
//!
//! All arithmetic stays in `BigDecimal`; nothing is rounded here. Rounding is
//! a presentation concern of whoever renders a [`PositionReport`].

use crate::entities::{Pool, Position, PositionId};
use crate::error::ValuationError;
use crate::math::concentrated_liquidity::{ValuationResult, current_amounts};
use crate::value_objects::{AccruedFees, Amount, UsdPrices};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Valuation of one position at the pool's current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub position_id: PositionId,
    pub owner: String,
    pub tick_lower: i32,
    pub tick_upper: i32,

    /// Token amounts currently held.
    pub holdings: ValuationResult,
    pub price0_usd: BigDecimal,
    pub price1_usd: BigDecimal,

    /// Accrued fees in token units (decimal-adjusted).
    pub unclaimed_fees0: BigDecimal,
    pub unclaimed_fees1: BigDecimal,

    pub current_liquidity_usd: BigDecimal,
    pub unclaimed_fees_usd: BigDecimal,
    pub claimed_fees_usd: BigDecimal,
    pub deposited_usd: BigDecimal,
    pub withdrawn_usd: BigDecimal,
    /// current + withdrawn + unclaimed + claimed - deposited
    pub pnl: BigDecimal,

    pub opened_at: Option<i64>,
    pub closed_at: Option<i64>,
}

/// Values `position` against the current state of `pool`.
///
/// `accrued_fees` is the fee oracle's answer in raw token units. Passing
/// `None` is an error: callers that know a position has no reachable fees
/// must pass [`AccruedFees::zero`] explicitly.
///
/// # Errors
/// * [`ValuationError::PoolMismatch`] if the position belongs to another pool
/// * [`ValuationError::MissingDependency`] for a missing price or fee value
/// * any error of [`current_amounts`]
pub fn value_position(
    position: &Position,
    pool: &Pool,
    prices: &UsdPrices,
    accrued_fees: Option<&AccruedFees>,
) -> Result<PositionReport, ValuationError> {
    if !pool.is(&position.pool_id) {
        return Err(ValuationError::PoolMismatch {
            position_pool: position.pool_id.clone(),
            pool: pool.id.clone(),
        });
    }

    let (price0, price1) = prices.require()?;
    let accrued_fees = accrued_fees.ok_or(ValuationError::MissingDependency("accrued fees"))?;

    let holdings = current_amounts(
        &position.liquidity,
        position.tick_lower,
        position.tick_upper,
        pool.current_tick,
        &pool.sqrt_price,
        pool.token0.decimals,
        pool.token1.decimals,
    )?;

    let usd = |amount0: &BigDecimal, amount1: &BigDecimal| amount0 * price0 + amount1 * price1;

    let unclaimed_fees0 = Amount::new(accrued_fees.token0.clone(), pool.token0.decimals).to_decimal();
    let unclaimed_fees1 = Amount::new(accrued_fees.token1.clone(), pool.token1.decimals).to_decimal();

    let current_liquidity_usd = usd(&holdings.amount0, &holdings.amount1);
    let unclaimed_fees_usd = usd(&unclaimed_fees0, &unclaimed_fees1);
    let claimed_fees_usd = usd(
        &position.collected_fees_token0,
        &position.collected_fees_token1,
    );
    let deposited_usd = usd(&position.deposited_token0, &position.deposited_token1);
    let withdrawn_usd = usd(&position.withdrawn_token0, &position.withdrawn_token1);

    let pnl = &current_liquidity_usd - &deposited_usd
        + &withdrawn_usd
        + &unclaimed_fees_usd
        + &claimed_fees_usd;

    Ok(PositionReport {
        position_id: position.id.clone(),
        owner: position.owner.clone(),
        tick_lower: position.tick_lower,
        tick_upper: position.tick_upper,
        holdings,
        price0_usd: price0.clone(),
        price1_usd: price1.clone(),
        unclaimed_fees0,
        unclaimed_fees1,
        current_liquidity_usd,
        unclaimed_fees_usd,
        claimed_fees_usd,
        deposited_usd,
        withdrawn_usd,
        pnl,
        opened_at: position.opened_at,
        closed_at: position.closed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Token;
    use crate::math::concentrated_liquidity::RangeStatus;
    use crate::math::price_tick::tick_to_sqrt_price;
    use num_bigint::BigInt;
    use num_traits::Zero;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn pool(current_tick: i32) -> Pool {
        Pool {
            id: "0xpool".to_string(),
            token0: Token::new("0xt0", "AAA", 18),
            token1: Token::new("0xt1", "BBB", 6),
            fee_tier: 3000,
            current_tick,
            sqrt_price: tick_to_sqrt_price(current_tick).unwrap(),
        }
    }

    fn position(liquidity: i64) -> Position {
        Position {
            id: PositionId("42".to_string()),
            owner: "0xowner".to_string(),
            pool_id: "0xPOOL".to_string(),
            tick_lower: -1000,
            tick_upper: 1000,
            liquidity: BigInt::from(liquidity),
            deposited_token0: dec("2"),
            deposited_token1: dec("0.000003"),
            withdrawn_token0: BigDecimal::zero(),
            withdrawn_token1: BigDecimal::zero(),
            collected_fees_token0: BigDecimal::zero(),
            collected_fees_token1: BigDecimal::zero(),
            opened_at: Some(1_700_000_000),
            closed_at: None,
        }
    }

    fn prices() -> UsdPrices {
        UsdPrices::new(dec("3000.5"), dec("1"))
    }

    #[test]
    fn test_pnl_without_fees_or_withdrawals() {
        let report = value_position(
            &position(1_000_000_000_000),
            &pool(0),
            &prices(),
            Some(&AccruedFees::zero()),
        )
        .unwrap();

        assert_eq!(report.holdings.status, RangeStatus::InRange);
        assert!(report.unclaimed_fees_usd.is_zero());
        assert!(report.claimed_fees_usd.is_zero());
        assert_eq!(
            report.pnl,
            &report.current_liquidity_usd - &report.deposited_usd
        );
        assert_eq!(report.deposited_usd, dec("6001.000003"));
    }

    #[test]
    fn test_full_pnl_decomposition() {
        let mut pos = position(0);
        pos.withdrawn_token0 = dec("1.5");
        pos.withdrawn_token1 = dec("0.000001");
        pos.collected_fees_token0 = dec("0.01");
        pos.collected_fees_token1 = dec("0.25");
        pos.closed_at = Some(1_710_000_000);

        // 0.001 token0 and 0.5 token1 accrued, in raw units.
        let fees = AccruedFees::new(dec("1000000000000000"), dec("500000"));

        let report = value_position(&pos, &pool(0), &prices(), Some(&fees)).unwrap();

        assert!(report.current_liquidity_usd.is_zero());
        assert_eq!(report.unclaimed_fees0, dec("0.001"));
        assert_eq!(report.unclaimed_fees1, dec("0.5"));
        assert_eq!(report.unclaimed_fees_usd, dec("3.5005"));
        assert_eq!(report.claimed_fees_usd, dec("30.255"));
        assert_eq!(report.withdrawn_usd, dec("4500.750001"));
        // 0 - 6001.000003 + 4500.750001 + 3.5005 + 30.255
        assert_eq!(report.pnl, dec("-1466.494502"));
        assert_eq!(report.closed_at, Some(1_710_000_000));
    }

    #[test]
    fn test_fee_amounts_are_not_rounded_before_pricing() {
        // 0.0000012345 token0: rounding to 5 places first would drop it.
        let fees = AccruedFees::new(dec("1234500000000"), BigDecimal::zero());
        let report =
            value_position(&position(0), &pool(0), &prices(), Some(&fees)).unwrap();

        assert_eq!(report.unclaimed_fees_usd, dec("0.00370411725"));
    }

    #[test]
    fn test_missing_price_is_an_error() {
        let prices = UsdPrices {
            token0: Some(dec("1")),
            token1: None,
        };
        let err = value_position(&position(1), &pool(0), &prices, Some(&AccruedFees::zero()))
            .unwrap_err();
        assert_eq!(err, ValuationError::MissingDependency("token1 USD price"));
    }

    #[test]
    fn test_missing_fees_are_an_error() {
        let err = value_position(&position(1), &pool(0), &prices(), None).unwrap_err();
        assert_eq!(err, ValuationError::MissingDependency("accrued fees"));
    }

    #[test]
    fn test_pool_mismatch_is_an_error() {
        let mut other = pool(0);
        other.id = "0xother".to_string();
        let err = value_position(&position(1), &other, &prices(), Some(&AccruedFees::zero()))
            .unwrap_err();
        assert!(matches!(err, ValuationError::PoolMismatch { .. }));
    }

    #[test]
    fn test_negative_liquidity_never_reaches_report() {
        let err = value_position(
            &position(-5),
            &pool(0),
            &prices(),
            Some(&AccruedFees::zero()),
        )
        .unwrap_err();
        assert!(matches!(err, ValuationError::NegativeAmount { .. }));
    }

    #[test]
    fn test_out_of_range_position_values_single_token() {
        let report = value_position(
            &position(1_000_000_000_000),
            &pool(5000),
            &prices(),
            Some(&AccruedFees::zero()),
        )
        .unwrap();

        assert_eq!(report.holdings.status, RangeStatus::AboveRange);
        assert!(report.holdings.amount0.is_zero());
        assert_eq!(report.current_liquidity_usd, report.holdings.amount1);
    }
}
