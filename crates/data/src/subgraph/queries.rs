//! GraphQL documents.
//!
//! The DEX subgraph follows the Uniswap v3 schema; the analytics subgraph
//! follows the Messari DEX schema. Entity ids are lowercase hex.

/// Pool state and token metadata.
pub const POOL: &str = r#"
query Pool($id: ID!) {
  pool(id: $id) {
    id
    tick
    sqrtPrice
    feeTier
    token0 { id symbol decimals }
    token1 { id symbol decimals }
  }
}
"#;

/// Latest USD price of a token (analytics subgraph).
pub const TOKEN_PRICE: &str = r#"
query TokenPrice($id: ID!) {
  token(id: $id) {
    id
    lastPriceUSD
  }
}
"#;

/// One page of positions in a pool, ordered by creation time.
pub const POSITIONS_PAGE: &str = r#"
query PositionsPage($pool: String!, $since: BigInt!, $first: Int!) {
  positions(
    first: $first
    orderBy: transaction__timestamp
    orderDirection: asc
    where: { pool: $pool, transaction_: { timestamp_gte: $since } }
  ) {
    id
    transaction { timestamp }
  }
}
"#;

/// Full record of one position.
pub const POSITION: &str = r#"
query Position($id: ID!) {
  position(id: $id) {
    id
    owner
    liquidity
    tickLower { tickIdx }
    tickUpper { tickIdx }
    depositedToken0
    depositedToken1
    withdrawnToken0
    withdrawnToken1
    collectedFeesToken0
    collectedFeesToken1
    pool { id }
    token0 { id symbol decimals }
    token1 { id symbol decimals }
    transaction { timestamp }
  }
}
"#;

/// Open and close timestamps of an account's position (analytics subgraph).
pub const POSITION_TIMESTAMPS: &str = r#"
query PositionTimestamps(
  $account: Bytes!
  $pool: Bytes!
  $tickLower: BigInt!
  $tickUpper: BigInt!
  $liquidity: BigInt!
) {
  positions(
    first: 1
    orderBy: timestampOpened
    orderDirection: desc
    where: {
      account_: { id: $account }
      pool_: { id: $pool }
      tickLower_: { index: $tickLower }
      tickUpper_: { index: $tickUpper }
      liquidity: $liquidity
    }
  ) {
    timestampOpened
    timestampClosed
  }
}
"#;

/// Most recent daily aggregates of a pool.
pub const POOL_DAY_DATA: &str = r#"
query PoolDayData($pool: String!, $days: Int!) {
  poolDayDatas(
    first: $days
    orderBy: date
    orderDirection: desc
    where: { pool: $pool }
  ) {
    date
    volumeUSD
    tvlUSD
    feesUSD
    volumeToken0
    volumeToken1
    token0Price
    token1Price
  }
}
"#;
