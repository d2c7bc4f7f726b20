//! Response shapes of the subgraph queries.
//!
//! Subgraphs serialize `BigInt` and `BigDecimal` scalars as JSON strings, so
//! numeric fields arrive as `String` and are parsed when converting into
//! domain types.

use anyhow::{Context, Result, anyhow};
use bigdecimal::BigDecimal;
use lp_pnl_domain::entities::{Pool, Position, PositionId, Token};
use lp_pnl_domain::math::price_tick::sqrt_price_from_x96;
use lp_pnl_domain::metrics::PoolDaySnapshot;
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct IdDto {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenDto {
    pub id: String,
    pub symbol: String,
    pub decimals: String,
}

impl TokenDto {
    pub fn into_domain(self) -> Result<Token> {
        let decimals = self
            .decimals
            .parse::<u8>()
            .with_context(|| format!("token {} decimals '{}'", self.id, self.decimals))?;
        Ok(Token::new(self.id.to_lowercase(), self.symbol, decimals))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDto {
    pub id: String,
    pub tick: Option<String>,
    pub sqrt_price: Option<String>,
    pub fee_tier: String,
    pub token0: TokenDto,
    pub token1: TokenDto,
}

impl PoolDto {
    /// Converts to a [`Pool`], turning the Q64.96 sqrt price into a plain one.
    ///
    /// # Errors
    /// Returns an error if the pool is uninitialized or a field does not parse.
    pub fn into_domain(self) -> Result<Pool> {
        let tick = self
            .tick
            .as_deref()
            .ok_or_else(|| anyhow!("pool {} has no current tick", self.id))?;
        let current_tick = parse_i32("tick", tick)?;

        let sqrt_price_x96 = self
            .sqrt_price
            .as_deref()
            .ok_or_else(|| anyhow!("pool {} has no sqrt price", self.id))?;
        let sqrt_price = sqrt_price_from_x96(&parse_big_decimal("sqrtPrice", sqrt_price_x96)?);

        let fee_tier = self
            .fee_tier
            .parse::<u32>()
            .with_context(|| format!("feeTier '{}'", self.fee_tier))?;

        Ok(Pool {
            id: self.id.to_lowercase(),
            token0: self.token0.into_domain()?,
            token1: self.token1.into_domain()?,
            fee_tier,
            current_tick,
            sqrt_price,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolResponse {
    pub pool: Option<PoolDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceDto {
    pub id: String,
    #[serde(rename = "lastPriceUSD")]
    pub last_price_usd: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPriceResponse {
    pub token: Option<TokenPriceDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionDto {
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionIdDto {
    pub id: String,
    pub transaction: TransactionDto,
}

impl PositionIdDto {
    pub fn timestamp(&self) -> Result<i64> {
        parse_i64("transaction.timestamp", &self.transaction.timestamp)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionsPageResponse {
    pub positions: Vec<PositionIdDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickDto {
    pub tick_idx: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub id: String,
    pub owner: String,
    pub liquidity: String,
    pub tick_lower: TickDto,
    pub tick_upper: TickDto,
    pub deposited_token0: String,
    pub deposited_token1: String,
    pub withdrawn_token0: String,
    pub withdrawn_token1: String,
    pub collected_fees_token0: String,
    pub collected_fees_token1: String,
    pub pool: IdDto,
    pub token0: TokenDto,
    pub token1: TokenDto,
}

impl PositionDto {
    /// Converts to a [`Position`] without timestamps.
    ///
    /// # Errors
    /// Returns an error if a numeric field does not parse.
    pub fn into_domain(self) -> Result<Position> {
        let id = self.id;
        let parse = |field: &'static str, value: &str| {
            parse_big_decimal(field, value).with_context(|| format!("position {id}"))
        };

        let liquidity = BigInt::from_str(&self.liquidity)
            .with_context(|| format!("position {id} liquidity '{}'", self.liquidity))?;

        Ok(Position {
            owner: self.owner.to_lowercase(),
            pool_id: self.pool.id.to_lowercase(),
            tick_lower: parse_i32("tickLower", &self.tick_lower.tick_idx)?,
            tick_upper: parse_i32("tickUpper", &self.tick_upper.tick_idx)?,
            liquidity,
            deposited_token0: parse("depositedToken0", &self.deposited_token0)?,
            deposited_token1: parse("depositedToken1", &self.deposited_token1)?,
            withdrawn_token0: parse("withdrawnToken0", &self.withdrawn_token0)?,
            withdrawn_token1: parse("withdrawnToken1", &self.withdrawn_token1)?,
            collected_fees_token0: parse("collectedFeesToken0", &self.collected_fees_token0)?,
            collected_fees_token1: parse("collectedFeesToken1", &self.collected_fees_token1)?,
            opened_at: None,
            closed_at: None,
            id: PositionId(id),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionResponse {
    pub position: Option<PositionDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionTimestampsDto {
    pub timestamp_opened: Option<String>,
    pub timestamp_closed: Option<String>,
}

impl PositionTimestampsDto {
    /// `(opened, closed)`; a missing close time means the position is open.
    pub fn parse(&self) -> Result<(Option<i64>, Option<i64>)> {
        let opened = self
            .timestamp_opened
            .as_deref()
            .map(|v| parse_i64("timestampOpened", v))
            .transpose()?;
        let closed = self
            .timestamp_closed
            .as_deref()
            .map(|v| parse_i64("timestampClosed", v))
            .transpose()?;
        Ok((opened, closed))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionTimestampsResponse {
    pub positions: Vec<PositionTimestampsDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDayDataDto {
    pub date: i64,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: String,
    #[serde(rename = "tvlUSD")]
    pub tvl_usd: String,
    #[serde(rename = "feesUSD")]
    pub fees_usd: Option<String>,
    pub volume_token0: String,
    pub volume_token1: String,
    pub token0_price: String,
    pub token1_price: String,
}

impl PoolDayDataDto {
    pub fn into_domain(self) -> Result<PoolDaySnapshot> {
        Ok(PoolDaySnapshot {
            date: self.date,
            volume_usd: parse_decimal("volumeUSD", &self.volume_usd)?,
            tvl_usd: parse_decimal("tvlUSD", &self.tvl_usd)?,
            fees_usd: self
                .fees_usd
                .as_deref()
                .map(|v| parse_decimal("feesUSD", v))
                .transpose()?,
            volume_token0: parse_decimal("volumeToken0", &self.volume_token0)?,
            volume_token1: parse_decimal("volumeToken1", &self.volume_token1)?,
            token0_price: parse_decimal("token0Price", &self.token0_price)?,
            token1_price: parse_decimal("token1Price", &self.token1_price)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolDayDataResponse {
    pub pool_day_datas: Vec<PoolDayDataDto>,
}

pub(crate) fn parse_big_decimal(field: &str, value: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(value).with_context(|| format!("{field} '{value}' is not a number"))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .with_context(|| format!("{field} '{value}' is not a number"))
}

fn parse_i32(field: &str, value: &str) -> Result<i32> {
    value
        .parse::<i32>()
        .with_context(|| format!("{field} '{value}' is not an integer"))
}

fn parse_i64(field: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .with_context(|| format!("{field} '{value}' is not an integer"))
}
