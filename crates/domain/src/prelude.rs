//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use lp_pnl_domain::prelude::*;
//! ```

// Entities
pub use crate::entities::{Pool, Position, PositionId, Token};

// Errors
pub use crate::error::{MetricsError, TokenSide, ValuationError};

// Math
pub use crate::math::concentrated_liquidity::{RangeStatus, ValuationResult, current_amounts};
pub use crate::math::price_tick::{sqrt_price_from_x96, tick_to_price, tick_to_sqrt_price};

// Metrics
pub use crate::metrics::{PoolDayMetrics, PoolDaySnapshot};

// Valuation
pub use crate::valuation::{PositionReport, value_position};

// Value objects
pub use crate::value_objects::{AccruedFees, Amount, UsdPrices};
