//! Error types for position valuation and pool metrics.

use bigdecimal::BigDecimal;
use std::fmt;

/// Identifies one side of a token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSide {
    /// The pool's token0.
    Token0,
    /// The pool's token1.
    Token1,
}

impl fmt::Display for TokenSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token0 => write!(f, "token0"),
            Self::Token1 => write!(f, "token1"),
        }
    }
}

/// Errors raised while valuing a single position.
///
/// Every variant aborts the valuation it pertains to; the caller decides
/// whether to skip the position or abort the batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    /// Lower tick bound is above the upper one.
    #[error("Invalid tick range: lower {lower} > upper {upper}")]
    InvalidRange {
        /// Lower tick bound.
        lower: i32,
        /// Upper tick bound.
        upper: i32,
    },
    /// A computed token amount came out negative.
    #[error("Negative {side} amount {amount}")]
    NegativeAmount {
        /// Which token the amount belongs to.
        side: TokenSide,
        /// The offending amount.
        amount: BigDecimal,
    },
    /// A required input (USD price, accrued fees) was not supplied.
    #[error("Missing dependency: {0}")]
    MissingDependency(&'static str),
    /// Tick is outside the protocol range or not a multiple of one half.
    #[error("Invalid tick {0}")]
    InvalidTick(String),
    /// Sqrt price must be strictly positive.
    #[error("Invalid sqrt price {0}")]
    InvalidSqrtPrice(BigDecimal),
    /// The position references a different pool than the one supplied.
    #[error("Position pool {position_pool} does not match pool {pool}")]
    PoolMismatch {
        /// Pool id recorded on the position.
        position_pool: String,
        /// Pool id passed to the valuation.
        pool: String,
    },
}

/// Errors raised by pool-level metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    /// APR is undefined for a pool without locked value.
    #[error("TVL is zero")]
    ZeroTvl,
    /// A day's figures do not fit the decimal range.
    #[error("Arithmetic overflow")]
    Overflow,
}
