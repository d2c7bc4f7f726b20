//! Domain model and valuation math for concentrated-liquidity LP positions.
//!
//! This crate is pure: no I/O, no logging, no global state.
//! - Tick / sqrt-price conversions in arbitrary precision
//! - Token amounts held by a position at the current pool price
//! - USD valuation, fee and PnL decomposition of a position
//! - Pool day metrics (fees, APR)

/// Prelude module for convenient imports.
pub mod prelude;

/// Pool, position and token entities.
pub mod entities;
/// Valuation and metrics errors.
pub mod error;
/// Tick and liquidity math.
pub mod math;
/// Pool-level metrics.
pub mod metrics;
/// Position valuation.
pub mod valuation;
/// Amounts, prices and fees.
pub mod value_objects;
