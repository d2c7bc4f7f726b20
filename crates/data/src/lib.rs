//! # LP PnL Data
//!
//! Data access for position valuation: subgraph queries, the on-chain fee
//! oracle, the report pipeline and CSV export.

/// Network tables and environment configuration.
pub mod config;
/// CSV writers for position and pool reports.
pub mod export;
/// Uncollected-fee lookups through the position manager.
pub mod fee_oracle;
/// Position report pipeline.
pub mod report;
/// GraphQL subgraph access.
pub mod subgraph;

use anyhow::Result;
use async_trait::async_trait;
use lp_pnl_domain::entities::{Pool, Position};
use lp_pnl_domain::value_objects::UsdPrices;

/// Source of pool state, prices and positions.
#[async_trait]
pub trait PositionDataSource: Send + Sync {
    /// Current state of a pool.
    async fn fetch_pool(&self, pool_id: &str) -> Result<Pool>;

    /// USD prices of the pool's tokens; unknown prices are `None`.
    async fn fetch_usd_prices(&self, pool: &Pool) -> Result<UsdPrices>;

    /// Ids of positions in a pool created at or after `since`, oldest first,
    /// at most `limit` of them.
    async fn fetch_position_ids(
        &self,
        pool_id: &str,
        since: i64,
        limit: Option<usize>,
    ) -> Result<Vec<String>>;

    /// Full record of one position, without timestamps.
    async fn fetch_position(&self, id: &str) -> Result<Position>;

    /// `(opened, closed)` unix timestamps of a position, when known.
    async fn fetch_position_timestamps(
        &self,
        position: &Position,
    ) -> Result<(Option<i64>, Option<i64>)>;
}
