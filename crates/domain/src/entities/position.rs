use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionId(pub String);

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A liquidity position as indexed from the position-manager NFT.
///
/// Cumulative flow totals are human-readable token amounts (already divided
/// by the token decimals).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub owner: String,
    pub pool_id: String,

    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: BigInt,

    pub deposited_token0: BigDecimal,
    pub deposited_token1: BigDecimal,
    pub withdrawn_token0: BigDecimal,
    pub withdrawn_token1: BigDecimal,
    pub collected_fees_token0: BigDecimal,
    pub collected_fees_token1: BigDecimal,

    /// Unix seconds.
    pub opened_at: Option<i64>,
    /// Unix seconds; `None` while the position is open.
    pub closed_at: Option<i64>,
}

impl Position {
    /// A position whose liquidity has been fully withdrawn.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.liquidity.is_zero()
    }

    #[must_use]
    pub fn with_timestamps(mut self, opened_at: Option<i64>, closed_at: Option<i64>) -> Self {
        self.opened_at = opened_at;
        self.closed_at = closed_at;
        self
    }
}
