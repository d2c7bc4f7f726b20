use crate::error::MetricsError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee tiers are expressed in hundredths of a basis point.
const FEE_TIER_DENOMINATOR: u32 = 1_000_000;

/// One day of pool activity as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDaySnapshot {
    /// Unix seconds at the start of the day.
    pub date: i64,
    pub volume_usd: Decimal,
    pub tvl_usd: Decimal,
    /// Fees reported by the indexer, when it tracks them.
    pub fees_usd: Option<Decimal>,
    pub volume_token0: Decimal,
    pub volume_token1: Decimal,
    /// `token0Price` of the day record.
    pub token0_price: Decimal,
    /// `token1Price` of the day record.
    pub token1_price: Decimal,
}

/// Derived metrics for one pool day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDayMetrics {
    pub date: i64,
    pub volume_usd: Decimal,
    pub tvl_usd: Decimal,
    pub fees_usd: Decimal,
    /// Annualized fee yield in percent.
    pub apr_pct: Decimal,
}

/// Fee tier as a fraction of volume (500 -> 0.0005).
pub fn fee_fraction(fee_tier: u32) -> Decimal {
    Decimal::from(fee_tier) / Decimal::from(FEE_TIER_DENOMINATOR)
}

/// Calculates total fees earned by the pool given volume and fee tier.
pub fn calculate_pool_fees(volume_usd: Decimal, fee_tier: u32) -> Result<Decimal, MetricsError> {
    volume_usd
        .checked_mul(fee_fraction(fee_tier))
        .ok_or(MetricsError::Overflow)
}

/// Annualizes one day of fees against the pool's TVL, in percent.
pub fn calculate_one_day_apr(fees_usd: Decimal, tvl_usd: Decimal) -> Result<Decimal, MetricsError> {
    if tvl_usd.is_zero() {
        return Err(MetricsError::ZeroTvl);
    }
    fees_usd
        .checked_div(tvl_usd)
        .and_then(|share| share.checked_mul(Decimal::from(365)))
        .and_then(|yearly| yearly.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(MetricsError::Overflow)
}

impl PoolDaySnapshot {
    /// USD volume, rebuilt from per-token volumes when the indexer reports zero.
    pub fn effective_volume_usd(&self) -> Result<Decimal, MetricsError> {
        if !self.volume_usd.is_zero() {
            return Ok(self.volume_usd);
        }
        let volume0 = self.volume_token0.checked_mul(self.token0_price);
        let volume1 = self.volume_token1.checked_mul(self.token1_price);
        volume0
            .zip(volume1)
            .and_then(|(v0, v1)| v0.checked_add(v1))
            .ok_or(MetricsError::Overflow)
    }

    pub fn metrics(&self, fee_tier: u32) -> Result<PoolDayMetrics, MetricsError> {
        let volume_usd = self.effective_volume_usd()?;
        let fees_usd = match self.fees_usd {
            Some(fees) if !fees.is_zero() => fees,
            _ => calculate_pool_fees(volume_usd, fee_tier)?,
        };
        let apr_pct = calculate_one_day_apr(fees_usd, self.tvl_usd)?;

        Ok(PoolDayMetrics {
            date: self.date,
            volume_usd,
            tvl_usd: self.tvl_usd,
            fees_usd,
            apr_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot() -> PoolDaySnapshot {
        PoolDaySnapshot {
            date: 1_717_200_000,
            volume_usd: dec!(1_000_000),
            tvl_usd: dec!(10_000_000),
            fees_usd: None,
            volume_token0: Decimal::ZERO,
            volume_token1: Decimal::ZERO,
            token0_price: Decimal::ZERO,
            token1_price: Decimal::ZERO,
        }
    }

    #[test]
    fn test_calculate_pool_fees() {
        // 1M volume at the 0.05% tier
        assert_eq!(calculate_pool_fees(dec!(1_000_000), 500), Ok(dec!(500)));
        assert_eq!(fee_fraction(3000), dec!(0.003));
    }

    #[test]
    fn test_one_day_apr() {
        // 500 / 10M * 365 * 100 = 1.825%
        let metrics = snapshot().metrics(500).unwrap();
        assert_eq!(metrics.fees_usd, dec!(500));
        assert_eq!(metrics.apr_pct, dec!(1.825));
    }

    #[test]
    fn test_reported_fees_take_precedence() {
        let mut day = snapshot();
        day.fees_usd = Some(dec!(1000));
        assert_eq!(day.metrics(500).unwrap().fees_usd, dec!(1000));

        day.fees_usd = Some(Decimal::ZERO);
        assert_eq!(day.metrics(500).unwrap().fees_usd, dec!(500));
    }

    #[test]
    fn test_zero_volume_falls_back_to_token_volumes() {
        let mut day = snapshot();
        day.volume_usd = Decimal::ZERO;
        day.volume_token0 = dec!(400_000);
        day.token0_price = dec!(1.0001);
        day.volume_token1 = dec!(600_000);
        day.token1_price = dec!(0.9999);

        assert_eq!(day.effective_volume_usd(), Ok(dec!(999_980)));
    }

    #[test]
    fn test_zero_tvl() {
        let mut day = snapshot();
        day.tvl_usd = Decimal::ZERO;
        assert_eq!(day.metrics(500), Err(MetricsError::ZeroTvl));
    }

    #[test]
    fn test_dust_tvl_overflows_instead_of_panicking() {
        let mut day = snapshot();
        day.tvl_usd = dec!(0.0000000000000000000000001);
        assert_eq!(day.metrics(500), Err(MetricsError::Overflow));
    }

    #[test]
    fn test_token_volume_overflow() {
        let mut day = snapshot();
        day.volume_usd = Decimal::ZERO;
        day.volume_token0 = Decimal::MAX;
        day.token0_price = dec!(2);
        assert_eq!(day.effective_volume_usd(), Err(MetricsError::Overflow));
        assert_eq!(day.metrics(500), Err(MetricsError::Overflow));
    }

    #[test]
    fn test_fee_overflow() {
        assert_eq!(
            calculate_pool_fees(Decimal::MAX, 2_000_000),
            Err(MetricsError::Overflow)
        );
    }
}
