//! CSV export of position and pool-day reports.
//!
//! Values are rounded only here: USD columns to [`USD_SCALE`] places, token
//! amounts to the token's decimals, APR to [`APR_SCALE`] places.

use crate::config::Network;
use crate::report::PoolReport;
use anyhow::{Context, Result};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};
use csv::{Writer, WriterBuilder};
use lp_pnl_domain::entities::Pool;
use lp_pnl_domain::metrics::PoolDayMetrics;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Decimal places of USD columns.
pub const USD_SCALE: i64 = 5;
/// Decimal places of the APR column.
pub const APR_SCALE: u32 = 2;

const POSITION_COLUMNS: [&str; 15] = [
    "NFT id",
    "owner",
    "tick lower",
    "tick upper",
    "range",
    "amount0",
    "amount1",
    "current liquidity ($)",
    "deposited ($)",
    "withdrawn ($)",
    "fees claimed ($)",
    "fees unclaimed ($)",
    "PnL ($)",
    "opened",
    "closed",
];

const POOL_DAY_COLUMNS: [&str; 5] = ["Day", "Volume ($)", "TVL ($)", "APR (%)", "Fee Earned ($)"];

/// `<out>/<network>/positions/<SYM0>_<SYM1>_<feeTier>_positions.csv`
#[must_use]
pub fn positions_csv_path(out_dir: &Path, network: Network, pool: &Pool) -> PathBuf {
    out_dir
        .join(network.slug())
        .join("positions")
        .join(format!("{}_{}_positions.csv", pool.pair_name(), pool.fee_tier))
}

/// `<out>/<network>_pools/<network>_<SYM0>_<SYM1>_<feeTier>.csv`
#[must_use]
pub fn pool_days_csv_path(out_dir: &Path, network: Network, pool: &Pool) -> PathBuf {
    let slug = network.slug();
    out_dir
        .join(format!("{slug}_pools"))
        .join(format!("{slug}_{}_{}.csv", pool.pair_name(), pool.fee_tier))
}

/// Writes a pool header block followed by one row per valued position.
///
/// Skipped positions, if any, are listed in a trailing block.
///
/// # Errors
/// Returns an error if the file or its parent directories cannot be written.
pub fn write_positions_csv(path: &Path, report: &PoolReport) -> Result<()> {
    let mut wtr = open_writer(path)?;
    let pool = &report.pool;

    wtr.write_record(["pool", pool.id.as_str()])?;
    wtr.write_record(["pair", format!("{}_{}", pool.pair_name(), pool.fee_tier).as_str()])?;
    wtr.write_record(["token0", pool.token0.address.as_str(), pool.token0.symbol.as_str()])?;
    wtr.write_record(["token1", pool.token1.address.as_str(), pool.token1.symbol.as_str()])?;
    wtr.write_record(["token0 price ($)", optional_usd(report.prices.token0.as_ref()).as_str()])?;
    wtr.write_record(["token1 price ($)", optional_usd(report.prices.token1.as_ref()).as_str()])?;
    wtr.write_record(["generated at", timestamp(Some(report.generated_at)).as_str()])?;
    wtr.write_record([""])?;

    wtr.write_record(POSITION_COLUMNS)?;
    for p in &report.positions {
        wtr.write_record([
            p.position_id.0.clone(),
            p.owner.clone(),
            p.tick_lower.to_string(),
            p.tick_upper.to_string(),
            p.holdings.status.as_str().to_string(),
            token_amount(&p.holdings.amount0, pool.token0.decimals),
            token_amount(&p.holdings.amount1, pool.token1.decimals),
            usd(&p.current_liquidity_usd),
            usd(&p.deposited_usd),
            usd(&p.withdrawn_usd),
            usd(&p.claimed_fees_usd),
            usd(&p.unclaimed_fees_usd),
            usd(&p.pnl),
            timestamp(p.opened_at),
            timestamp(p.closed_at),
        ])?;
    }

    if !report.skipped.is_empty() {
        wtr.write_record([""])?;
        wtr.write_record(["skipped position", "reason"])?;
        for skipped in &report.skipped {
            wtr.write_record([skipped.position_id.as_str(), skipped.reason.as_str()])?;
        }
    }

    wtr.flush()?;
    info!(path = %path.display(), rows = report.positions.len(), "Wrote positions CSV");
    Ok(())
}

/// Writes pool-level header rows followed by one row per day, oldest first.
///
/// # Errors
/// Returns an error if the file or its parent directories cannot be written.
pub fn write_pool_days_csv(path: &Path, pool: &Pool, days: &[PoolDayMetrics]) -> Result<()> {
    let mut wtr = open_writer(path)?;

    let latest_tvl = days
        .last()
        .map(|d| d.tvl_usd.round().to_string())
        .unwrap_or_default();

    wtr.write_record(["name", pool.pair_name().as_str()])?;
    wtr.write_record(["totalValueLocked ($)", latest_tvl.as_str()])?;
    wtr.write_record(["fees", pool.fee_tier.to_string().as_str()])?;
    wtr.write_record(POOL_DAY_COLUMNS)?;

    for day in days {
        wtr.write_record([
            day_label(day.date),
            day.volume_usd.round_dp(USD_SCALE as u32).to_string(),
            day.tvl_usd.round_dp(USD_SCALE as u32).to_string(),
            day.apr_pct.round_dp(APR_SCALE).to_string(),
            day.fees_usd.round_dp(USD_SCALE as u32).to_string(),
        ])?;
    }

    wtr.flush()?;
    info!(path = %path.display(), days = days.len(), "Wrote pool day CSV");
    Ok(())
}

fn open_writer(path: &Path) -> Result<Writer<File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))
}

fn usd(value: &BigDecimal) -> String {
    value
        .with_scale_round(USD_SCALE, RoundingMode::HalfUp)
        .to_plain_string()
}

fn optional_usd(value: Option<&BigDecimal>) -> String {
    value.map(usd).unwrap_or_default()
}

fn token_amount(value: &BigDecimal, decimals: u8) -> String {
    value
        .with_scale_round(i64::from(decimals), RoundingMode::HalfUp)
        .to_plain_string()
}

fn timestamp(secs: Option<i64>) -> String {
    secs.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn day_label(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| secs.to_string())
}
