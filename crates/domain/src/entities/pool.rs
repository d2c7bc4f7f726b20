use crate::entities::token::Token;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Snapshot of a concentrated-liquidity pool as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub token0: Token,
    pub token1: Token,
    /// Fee in hundredths of a basis point (500 = 0.05%).
    pub fee_tier: u32,
    pub current_tick: i32,
    /// Plain sqrt of the raw token1/token0 price (already divided by 2^96).
    pub sqrt_price: BigDecimal,
}

impl Pool {
    /// Fee tier in basis points.
    #[must_use]
    pub fn fee_bps(&self) -> BigDecimal {
        BigDecimal::new(BigInt::from(self.fee_tier), 2)
    }

    /// Pair label such as `WETH_USDC`.
    #[must_use]
    pub fn pair_name(&self) -> String {
        format!("{}_{}", self.token0.symbol, self.token1.symbol)
    }

    /// Whether `id` names this pool. Addresses are compared case-insensitively.
    #[must_use]
    pub fn is(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }
}
