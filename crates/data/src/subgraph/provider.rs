use super::client::SubgraphClient;
use super::dto::{
    PoolDayDataResponse, PoolResponse, PositionIdDto, PositionResponse,
    PositionTimestampsResponse, PositionsPageResponse, TokenPriceResponse, parse_big_decimal,
};
use super::queries;
use crate::PositionDataSource;
use crate::config::AppConfig;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use lp_pnl_domain::entities::{Pool, Position};
use lp_pnl_domain::metrics::PoolDaySnapshot;
use lp_pnl_domain::value_objects::UsdPrices;
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Reads pools, positions and prices from a DEX subgraph and an analytics
/// subgraph.
#[derive(Debug, Clone)]
pub struct SubgraphProvider {
    dex: SubgraphClient,
    analytics: SubgraphClient,
    page_size: usize,
}

impl SubgraphProvider {
    /// Creates a provider from explicit clients.
    #[must_use]
    pub fn new(dex: SubgraphClient, analytics: SubgraphClient, page_size: usize) -> Self {
        Self {
            dex,
            analytics,
            page_size: page_size.max(1),
        }
    }

    /// Creates a provider for the endpoints in `config`.
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            SubgraphClient::new(&config.dex_subgraph_url, config.request_timeout)?,
            SubgraphClient::new(&config.analytics_subgraph_url, config.request_timeout)?,
            config.page_size,
        ))
    }

    /// Overrides the page size used for position pagination.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Fetches the most recent `days` daily aggregates, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a record does not parse.
    pub async fn fetch_pool_days(&self, pool_id: &str, days: usize) -> Result<Vec<PoolDaySnapshot>> {
        let response: PoolDayDataResponse = self
            .dex
            .query(
                queries::POOL_DAY_DATA,
                json!({ "pool": pool_id.to_lowercase(), "days": days }),
            )
            .await
            .with_context(|| format!("fetching day data of pool {pool_id}"))?;

        let mut snapshots = response
            .pool_day_datas
            .into_iter()
            .map(|day| day.into_domain())
            .collect::<Result<Vec<_>>>()?;
        snapshots.sort_by_key(|s| s.date);
        Ok(snapshots)
    }

    async fn fetch_token_price(&self, address: &str) -> Result<Option<BigDecimal>> {
        let response: TokenPriceResponse = self
            .analytics
            .query(queries::TOKEN_PRICE, json!({ "id": address.to_lowercase() }))
            .await
            .with_context(|| format!("fetching USD price of {address}"))?;

        response
            .token
            .and_then(|t| t.last_price_usd)
            .map(|price| parse_big_decimal("lastPriceUSD", &price))
            .transpose()
    }
}

/// Appends the unseen ids of `page` to `ids`, stopping at `limit`.
///
/// Returns how many ids were added and the creation timestamp of the last
/// record in the page, which is the next `timestamp_gte` cursor.
///
/// # Errors
/// Returns an error if a record carries a malformed timestamp.
pub fn merge_position_page(
    seen: &mut HashSet<String>,
    ids: &mut Vec<String>,
    page: &[PositionIdDto],
    limit: usize,
) -> Result<(usize, Option<i64>)> {
    let mut added = 0;
    for record in page {
        if ids.len() >= limit {
            break;
        }
        if seen.insert(record.id.clone()) {
            ids.push(record.id.clone());
            added += 1;
        }
    }
    let cursor = page.last().map(PositionIdDto::timestamp).transpose()?;
    Ok((added, cursor))
}

/// A full page that adds no new ids: every record shares the cursor
/// timestamp, so `timestamp_gte` cannot advance past them.
pub fn is_stalled_page(added: usize, page_len: usize, page_size: usize) -> bool {
    added == 0 && page_len >= page_size
}

#[async_trait]
impl PositionDataSource for SubgraphProvider {
    async fn fetch_pool(&self, pool_id: &str) -> Result<Pool> {
        let response: PoolResponse = self
            .dex
            .query(queries::POOL, json!({ "id": pool_id.to_lowercase() }))
            .await
            .with_context(|| format!("fetching pool {pool_id}"))?;

        let pool = response
            .pool
            .ok_or_else(|| anyhow!("pool {pool_id} not found"))?
            .into_domain()?;

        info!(
            pool = %pool.id,
            pair = %pool.pair_name(),
            fee_tier = pool.fee_tier,
            tick = pool.current_tick,
            "Loaded pool"
        );
        Ok(pool)
    }

    async fn fetch_usd_prices(&self, pool: &Pool) -> Result<UsdPrices> {
        let token0 = self.fetch_token_price(&pool.token0.address).await?;
        let token1 = self.fetch_token_price(&pool.token1.address).await?;

        for (symbol, price) in [(&pool.token0.symbol, &token0), (&pool.token1.symbol, &token1)] {
            match price {
                Some(price) => debug!(token = %symbol, price = %price, "USD price"),
                None => warn!(token = %symbol, "No USD price available"),
            }
        }

        Ok(UsdPrices { token0, token1 })
    }

    async fn fetch_position_ids(
        &self,
        pool_id: &str,
        since: i64,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let limit = limit.unwrap_or(usize::MAX);
        let pool_id = pool_id.to_lowercase();
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut cursor = since;

        while ids.len() < limit {
            let page: PositionsPageResponse = self
                .dex
                .query(
                    queries::POSITIONS_PAGE,
                    json!({
                        "pool": pool_id,
                        "since": cursor.to_string(),
                        "first": self.page_size,
                    }),
                )
                .await
                .with_context(|| format!("fetching positions of pool {pool_id} from {cursor}"))?;

            if page.positions.is_empty() {
                break;
            }

            let (added, last) = merge_position_page(&mut seen, &mut ids, &page.positions, limit)?;
            debug!(
                pool = %pool_id,
                cursor,
                added,
                total = ids.len(),
                "Fetched position page"
            );

            if is_stalled_page(added, page.positions.len(), self.page_size) {
                warn!(
                    pool = %pool_id,
                    cursor,
                    page_size = self.page_size,
                    collected = ids.len(),
                    "Position list truncated: a full page shares one creation timestamp"
                );
                break;
            }
            if added == 0 || page.positions.len() < self.page_size {
                break;
            }
            cursor = last.unwrap_or(cursor);
        }

        info!(pool = %pool_id, count = ids.len(), "Collected position ids");
        Ok(ids)
    }

    async fn fetch_position(&self, id: &str) -> Result<Position> {
        let response: PositionResponse = self
            .dex
            .query(queries::POSITION, json!({ "id": id }))
            .await
            .with_context(|| format!("fetching position {id}"))?;

        response
            .position
            .ok_or_else(|| anyhow!("position {id} not found"))?
            .into_domain()
    }

    async fn fetch_position_timestamps(
        &self,
        position: &Position,
    ) -> Result<(Option<i64>, Option<i64>)> {
        let response: PositionTimestampsResponse = self
            .analytics
            .query(
                queries::POSITION_TIMESTAMPS,
                json!({
                    "account": position.owner,
                    "pool": position.pool_id,
                    "tickLower": position.tick_lower.to_string(),
                    "tickUpper": position.tick_upper.to_string(),
                    "liquidity": position.liquidity.to_string(),
                }),
            )
            .await
            .with_context(|| format!("fetching timestamps of position {}", position.id))?;

        match response.positions.first() {
            Some(record) => record.parse(),
            None => Ok((None, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::dto::TransactionDto;

    fn record(id: &str, timestamp: i64) -> PositionIdDto {
        PositionIdDto {
            id: id.to_string(),
            transaction: TransactionDto {
                timestamp: timestamp.to_string(),
            },
        }
    }

    #[test]
    fn test_merge_skips_ids_seen_on_previous_page() {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        let first = [record("1", 100), record("2", 100), record("3", 200)];
        let (added, cursor) = merge_position_page(&mut seen, &mut ids, &first, usize::MAX).unwrap();
        assert_eq!((added, cursor), (3, Some(200)));

        // Page fetched with timestamp_gte 200 repeats the boundary record.
        let second = [record("3", 200), record("4", 300)];
        let (added, cursor) = merge_position_page(&mut seen, &mut ids, &second, usize::MAX).unwrap();
        assert_eq!((added, cursor), (1, Some(300)));
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_merge_respects_limit() {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let page = [record("1", 1), record("2", 2), record("3", 3)];

        let (added, _) = merge_position_page(&mut seen, &mut ids, &page, 2).unwrap();
        assert_eq!(added, 2);
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_merge_of_a_page_of_known_ids_adds_nothing() {
        let mut seen = HashSet::from(["7".to_string()]);
        let mut ids = vec!["7".to_string()];

        let (added, cursor) =
            merge_position_page(&mut seen, &mut ids, &[record("7", 50)], usize::MAX).unwrap();
        assert_eq!((added, cursor), (0, Some(50)));
    }

    #[test]
    fn test_merge_rejects_bad_timestamp() {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let page = [PositionIdDto {
            id: "1".to_string(),
            transaction: TransactionDto {
                timestamp: "yesterday".to_string(),
            },
        }];
        assert!(merge_position_page(&mut seen, &mut ids, &page, usize::MAX).is_err());
    }

    #[test]
    fn test_full_page_of_known_ids_is_stalled() {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let page = [record("1", 100), record("2", 100)];

        let (added, _) = merge_position_page(&mut seen, &mut ids, &page, usize::MAX).unwrap();
        assert!(!is_stalled_page(added, page.len(), 2));

        // Same cursor returns the same records again.
        let (added, cursor) = merge_position_page(&mut seen, &mut ids, &page, usize::MAX).unwrap();
        assert_eq!(cursor, Some(100));
        assert!(is_stalled_page(added, page.len(), 2));
    }

    #[test]
    fn test_short_page_is_not_stalled() {
        assert!(!is_stalled_page(0, 1, 2));
        assert!(!is_stalled_page(0, 0, 2));
    }
}
