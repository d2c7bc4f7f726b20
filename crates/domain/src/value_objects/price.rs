use crate::error::ValuationError;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// USD unit prices of a pool's two tokens.
///
/// Either side may be unknown to the price source; the valuation refuses to
/// run rather than treating an unknown price as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsdPrices {
    pub token0: Option<BigDecimal>,
    pub token1: Option<BigDecimal>,
}

impl UsdPrices {
    pub fn new(token0: BigDecimal, token1: BigDecimal) -> Self {
        Self {
            token0: Some(token0),
            token1: Some(token1),
        }
    }

    /// Returns both prices or the first missing one as an error.
    pub fn require(&self) -> Result<(&BigDecimal, &BigDecimal), ValuationError> {
        let token0 = self
            .token0
            .as_ref()
            .ok_or(ValuationError::MissingDependency("token0 USD price"))?;
        let token1 = self
            .token1
            .as_ref()
            .ok_or(ValuationError::MissingDependency("token1 USD price"))?;
        Ok((token0, token1))
    }
}
