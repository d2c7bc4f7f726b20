//! Values every position of a pool.
//!
//! Positions are processed one at a time. A position that cannot be valued
//! is either skipped with its reason recorded or aborts the run, depending
//! on [`ReportOptions::fail_fast`].

use crate::PositionDataSource;
use crate::fee_oracle::FeeOracle;
use anyhow::{Context, Result};
use lp_pnl_domain::entities::{Pool, Position};
use lp_pnl_domain::valuation::{PositionReport, value_position};
use lp_pnl_domain::value_objects::{AccruedFees, UsdPrices};
use tracing::{debug, info, warn};

/// Knobs of a report run.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Only positions created at or after this unix timestamp.
    pub since: i64,
    /// Upper bound on the number of positions valued.
    pub max_positions: Option<usize>,
    /// Abort on the first position that fails instead of skipping it.
    pub fail_fast: bool,
}

/// A position left out of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPosition {
    pub position_id: String,
    pub reason: String,
}

/// Valuation of a pool's positions at one point in time.
#[derive(Debug, Clone)]
pub struct PoolReport {
    pub pool: Pool,
    pub prices: UsdPrices,
    /// Unix seconds.
    pub generated_at: i64,
    pub positions: Vec<PositionReport>,
    pub skipped: Vec<SkippedPosition>,
}

impl PoolReport {
    /// Number of positions whose ids were collected.
    #[must_use]
    pub fn total(&self) -> usize {
        self.positions.len() + self.skipped.len()
    }
}

/// Drives a [`PositionDataSource`] and a [`FeeOracle`] to build a [`PoolReport`].
pub struct PositionReporter<S, F> {
    source: S,
    oracle: F,
    options: ReportOptions,
}

impl<S, F> PositionReporter<S, F>
where
    S: PositionDataSource,
    F: FeeOracle,
{
    #[must_use]
    pub fn new(source: S, oracle: F, options: ReportOptions) -> Self {
        Self {
            source,
            oracle,
            options,
        }
    }

    /// Values every position of `pool_id`.
    ///
    /// # Errors
    /// Returns an error if the pool, its prices or the position ids cannot
    /// be fetched, or, with `fail_fast`, if any single position fails.
    pub async fn build(&self, pool_id: &str) -> Result<PoolReport> {
        let pool = self
            .source
            .fetch_pool(pool_id)
            .await
            .with_context(|| format!("loading pool {pool_id}"))?;
        let prices = self
            .source
            .fetch_usd_prices(&pool)
            .await
            .with_context(|| format!("loading USD prices for {}", pool.pair_name()))?;
        let ids = self
            .source
            .fetch_position_ids(&pool.id, self.options.since, self.options.max_positions)
            .await
            .with_context(|| format!("listing positions of {}", pool.id))?;

        info!(
            pool = %pool.id,
            pair = %pool.pair_name(),
            positions = ids.len(),
            "Valuing positions"
        );

        let mut positions = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();

        for (index, id) in ids.iter().enumerate() {
            match self.value_one(&pool, &prices, id).await {
                Ok(report) => {
                    debug!(
                        position = %id,
                        progress = index + 1,
                        total = ids.len(),
                        pnl = %report.pnl,
                        "Valued position"
                    );
                    positions.push(report);
                }
                Err(err) if self.options.fail_fast => {
                    return Err(err.context(format!("valuing position {id}")));
                }
                Err(err) => {
                    warn!(position = %id, error = %format!("{err:#}"), "Skipping position");
                    skipped.push(SkippedPosition {
                        position_id: id.clone(),
                        reason: format!("{err:#}"),
                    });
                }
            }
        }

        info!(
            pool = %pool.id,
            valued = positions.len(),
            skipped = skipped.len(),
            "Report complete"
        );

        Ok(PoolReport {
            pool,
            prices,
            generated_at: chrono::Utc::now().timestamp(),
            positions,
            skipped,
        })
    }

    async fn value_one(&self, pool: &Pool, prices: &UsdPrices, id: &str) -> Result<PositionReport> {
        let position = self.source.fetch_position(id).await?;

        let (opened, closed) = match self.source.fetch_position_timestamps(&position).await {
            Ok(timestamps) => timestamps,
            Err(err) => {
                warn!(position = %id, error = %format!("{err:#}"), "No position timestamps");
                (None, None)
            }
        };
        let position = position.with_timestamps(opened, closed);

        let fees = self.accrued_fees(&position).await?;
        Ok(value_position(&position, pool, prices, Some(&fees))?)
    }

    async fn accrued_fees(&self, position: &Position) -> Result<AccruedFees> {
        match self
            .oracle
            .accrued_fees(&position.id, &position.owner)
            .await
        {
            Ok(fees) => Ok(fees),
            Err(err) if position.is_closed() => {
                info!(
                    position = %position.id,
                    error = %format!("{err:#}"),
                    "Fee oracle unavailable for closed position, using zero fees"
                );
                Ok(AccruedFees::zero())
            }
            Err(err) => Err(err.context("reading accrued fees")),
        }
    }
}
