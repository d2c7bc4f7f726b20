use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};

/// A token amount in raw on-chain units together with the token's decimals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: BigDecimal,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: BigDecimal, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Human-readable value: `raw / 10^decimals`.
    pub fn to_decimal(&self) -> BigDecimal {
        &self.raw / scale_factor(self.decimals)
    }
}

/// 10^decimals as an exact `BigDecimal`.
pub fn scale_factor(decimals: u8) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -i64::from(decimals))
}
