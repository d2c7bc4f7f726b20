use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Fees accrued by a position and not yet collected, in raw token units,
/// as reported by the fee oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccruedFees {
    pub token0: BigDecimal,
    pub token1: BigDecimal,
}

impl AccruedFees {
    pub fn new(token0: BigDecimal, token1: BigDecimal) -> Self {
        Self { token0, token1 }
    }

    /// Explicit zero, for positions the oracle cannot report on.
    pub fn zero() -> Self {
        Self {
            token0: BigDecimal::zero(),
            token1: BigDecimal::zero(),
        }
    }
}
