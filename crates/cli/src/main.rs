//! Command Line Interface for concentrated-liquidity position PnL reports.
use anyhow::{Context, Result};
use bigdecimal::{BigDecimal, RoundingMode};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use lp_pnl_data::PositionDataSource;
use lp_pnl_data::config::{AppConfig, Network};
use lp_pnl_data::export::{
    pool_days_csv_path, positions_csv_path, write_pool_days_csv, write_positions_csv,
};
use lp_pnl_data::fee_oracle::RpcFeeOracle;
use lp_pnl_data::report::{PositionReporter, ReportOptions};
use lp_pnl_data::subgraph::SubgraphProvider;
use lp_pnl_domain::math::concentrated_liquidity::current_amounts;
use lp_pnl_domain::math::price_tick::sqrt_price_from_x96;
use lp_pnl_domain::metrics::PoolDayMetrics;
use num_bigint::BigInt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

#[derive(Parser)]
#[command(name = "lp-pnl")]
#[command(about = "Concentrated-liquidity position valuation and PnL reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value every position of a pool and write the positions CSV
    Positions {
        /// Network (eth, base, arb)
        #[arg(short, long)]
        network: Network,

        /// Pool alias (e.g. WETH_USDC_500) or address
        #[arg(short, long)]
        pool: String,

        /// Only positions created at or after this unix timestamp
        #[arg(long, default_value_t = 0)]
        since: i64,

        /// Maximum number of positions to value
        #[arg(long)]
        max_positions: Option<usize>,

        /// Positions requested per subgraph page
        #[arg(long)]
        page_size: Option<usize>,

        /// Output directory
        #[arg(short, long, default_value = "data")]
        out: PathBuf,

        /// Abort on the first position that cannot be valued
        #[arg(long)]
        fail_fast: bool,
    },
    /// Daily volume, TVL and fee APR of one or all known pools
    Pools {
        /// Network (eth, base, arb)
        #[arg(short, long)]
        network: Network,

        /// Pool alias or address; every known pool of the network if omitted
        #[arg(short, long)]
        pool: Option<String>,

        /// Days of history
        #[arg(short, long, default_value_t = 30)]
        days: usize,

        /// Output directory
        #[arg(short, long, default_value = "data")]
        out: PathBuf,
    },
    /// Token amounts held by a position, from raw on-chain values
    Amounts {
        /// Position liquidity (raw integer)
        #[arg(long)]
        liquidity: String,

        /// Lower tick bound
        #[arg(long, allow_hyphen_values = true)]
        tick_lower: i32,

        /// Upper tick bound
        #[arg(long, allow_hyphen_values = true)]
        tick_upper: i32,

        /// Current pool tick
        #[arg(long, allow_hyphen_values = true)]
        tick: i32,

        /// Current pool sqrtPriceX96
        #[arg(long)]
        sqrt_price_x96: String,

        /// Token0 decimals
        #[arg(long, default_value_t = 18)]
        decimals0: u8,

        /// Token1 decimals
        #[arg(long, default_value_t = 18)]
        decimals1: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Positions {
            network,
            pool,
            since,
            max_positions,
            page_size,
            out,
            fail_fast,
        } => {
            let config = AppConfig::from_env(network)?;
            let pool_id = network.resolve_pool(&pool)?;

            let mut provider = SubgraphProvider::from_config(&config)?;
            if let Some(page_size) = page_size {
                provider = provider.with_page_size(page_size);
            }
            let rpc_url = config
                .rpc_url
                .clone()
                .context("RPC_URL or ALCHEMY_API_KEY must be set in .env or environment")?;
            let oracle = RpcFeeOracle::new(
                rpc_url,
                network.position_manager(),
                config.request_timeout,
            )?;

            println!("📡 Valuing positions of {pool_id} on {network}...");
            let reporter = PositionReporter::new(
                provider,
                oracle,
                ReportOptions {
                    since,
                    max_positions,
                    fail_fast,
                },
            );
            let report = reporter.build(&pool_id).await?;

            let path = positions_csv_path(&out, network, &report.pool);
            write_positions_csv(&path, &report)?;

            println!(
                "\n📊 {}_{} ({} positions)",
                report.pool.pair_name(),
                report.pool.fee_tier,
                report.total()
            );
            println!(
                "{:<12} | {:<9} | {:>16} | {:>16} | {:>14}",
                "NFT id", "Range", "Current ($)", "Deposited ($)", "PnL ($)"
            );
            println!("{}", "-".repeat(79));
            for p in &report.positions {
                println!(
                    "{:<12} | {:<9} | {:>16} | {:>16} | {:>14}",
                    p.position_id.0,
                    p.holdings.status.as_str(),
                    cents(&p.current_liquidity_usd),
                    cents(&p.deposited_usd),
                    cents(&p.pnl)
                );
            }

            let total_pnl: BigDecimal = report.positions.iter().map(|p| &p.pnl).sum();
            println!("════════════════════════════════════");
            println!("Valued:    {}", report.positions.len());
            println!("Skipped:   {}", report.skipped.len());
            println!("Total PnL: ${}", cents(&total_pnl));
            println!("✅ Wrote {}", path.display());
        }
        Commands::Pools {
            network,
            pool,
            days,
            out,
        } => {
            let config = AppConfig::from_env(network)?;
            let provider = SubgraphProvider::from_config(&config)?;

            let pool_ids = match pool {
                Some(pool) => vec![network.resolve_pool(&pool)?],
                None => network
                    .known_pools()
                    .iter()
                    .map(|(_, address)| address.to_lowercase())
                    .collect(),
            };

            for pool_id in pool_ids {
                let pool = provider.fetch_pool(&pool_id).await?;
                let snapshots = provider.fetch_pool_days(&pool_id, days).await?;

                let metrics: Vec<PoolDayMetrics> = snapshots
                    .iter()
                    .filter_map(|day| match day.metrics(pool.fee_tier) {
                        Ok(m) => Some(m),
                        Err(err) => {
                            warn!(pool = %pool.id, date = day.date, error = %err, "Skipping pool day");
                            None
                        }
                    })
                    .collect();

                let path = pool_days_csv_path(&out, network, &pool);
                write_pool_days_csv(&path, &pool, &metrics)?;

                println!("\n📊 {}_{}", pool.pair_name(), pool.fee_tier);
                println!(
                    "{:<10} | {:>16} | {:>18} | {:>8} | {:>12}",
                    "Day", "Volume ($)", "TVL ($)", "APR (%)", "Fees ($)"
                );
                println!("{}", "-".repeat(76));
                for m in &metrics {
                    let day = chrono::DateTime::from_timestamp(m.date, 0).unwrap_or_default();
                    println!(
                        "{:<10} | {:>16.2} | {:>18.2} | {:>8.2} | {:>12.2}",
                        day.format("%Y-%m-%d"),
                        m.volume_usd,
                        m.tvl_usd,
                        m.apr_pct,
                        m.fees_usd
                    );
                }
                println!("✅ Wrote {}", path.display());
            }
        }
        Commands::Amounts {
            liquidity,
            tick_lower,
            tick_upper,
            tick,
            sqrt_price_x96,
            decimals0,
            decimals1,
        } => {
            let liquidity = BigInt::from_str(&liquidity)
                .with_context(|| format!("liquidity '{liquidity}' is not an integer"))?;
            let sqrt_price_x96 = BigDecimal::from_str(&sqrt_price_x96)
                .with_context(|| format!("sqrt price '{sqrt_price_x96}' is not a number"))?;

            let result = current_amounts(
                &liquidity,
                tick_lower,
                tick_upper,
                tick,
                &sqrt_price_from_x96(&sqrt_price_x96),
                decimals0,
                decimals1,
            )?;

            println!("Range:   {}", result.status.as_str());
            println!("Amount0: {}", result.amount0.normalized().to_plain_string());
            println!("Amount1: {}", result.amount1.normalized().to_plain_string());
        }
    }

    Ok(())
}

/// Rounds a USD value to cents for display.
fn cents(value: &BigDecimal) -> String {
    value
        .with_scale_round(2, RoundingMode::HalfUp)
        .to_plain_string()
}
