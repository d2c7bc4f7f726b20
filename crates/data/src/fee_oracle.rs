//! Uncollected fees read from the position manager contract.
//!
//! The NonfungiblePositionManager exposes no view for owed fees. Simulating
//! `collect` with maximal amounts from the owner's address returns what a
//! real collect would pay out, without sending a transaction.

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use lp_pnl_domain::entities::PositionId;
use lp_pnl_domain::value_objects::AccruedFees;
use primitive_types::U256;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// `collect((uint256,address,uint128,uint128))`
pub const COLLECT_SELECTOR: &str = "fc6f7865";

const WORD_HEX_LEN: usize = 64;

/// Source of fees accrued by a position and not yet collected.
#[async_trait]
pub trait FeeOracle: Send + Sync {
    /// Raw token units owed to `owner` for `position_id`.
    async fn accrued_fees(&self, position_id: &PositionId, owner: &str) -> Result<AccruedFees>;
}

/// [`FeeOracle`] backed by a JSON-RPC `eth_call`.
#[derive(Debug, Clone)]
pub struct RpcFeeOracle {
    http: reqwest::Client,
    rpc_url: String,
    position_manager: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcFeeOracle {
    /// Creates an oracle calling `position_manager` through `rpc_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        rpc_url: impl Into<String>,
        position_manager: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building RPC HTTP client")?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
            position_manager: position_manager.into(),
        })
    }
}

#[async_trait]
impl FeeOracle for RpcFeeOracle {
    async fn accrued_fees(&self, position_id: &PositionId, owner: &str) -> Result<AccruedFees> {
        let data = encode_collect_call(&position_id.0, owner)?;
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "from": owner, "to": self.position_manager, "data": data },
                "latest"
            ],
        });

        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .context("sending eth_call")?
            .error_for_status()
            .context("eth_call failed")?
            .json()
            .await
            .context("decoding eth_call response")?;

        if let Some(err) = response.error {
            bail!("eth_call reverted ({}): {}", err.code, err.message);
        }
        let result = response
            .result
            .ok_or_else(|| anyhow!("eth_call returned no result"))?;

        let fees = decode_collect_result(&result)?;
        debug!(
            position = %position_id,
            fees0 = %fees.token0,
            fees1 = %fees.token1,
            "Accrued fees"
        );
        Ok(fees)
    }
}

/// ABI-encodes `collect((tokenId, owner, 2^128-1, 2^128-1))` as `0x`-prefixed hex.
///
/// # Errors
/// Returns an error if `token_id` is not a decimal integer or `owner` is
/// not a 20-byte hex address.
pub fn encode_collect_call(token_id: &str, owner: &str) -> Result<String> {
    let token_id = U256::from_dec_str(token_id)
        .map_err(|e| anyhow!("position id '{token_id}' is not a uint256: {e:?}"))?;

    let address = owner
        .strip_prefix("0x")
        .filter(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| anyhow!("owner '{owner}' is not an address"))?;

    let amount_max = U256::from(u128::MAX);

    Ok(format!(
        "0x{COLLECT_SELECTOR}{}{:0>64}{}{}",
        abi_word(token_id),
        address.to_lowercase(),
        abi_word(amount_max),
        abi_word(amount_max)
    ))
}

/// Left-padded 32-byte hex word.
fn abi_word(value: U256) -> String {
    format!("{:0>64}", format!("{value:x}"))
}

/// Decodes the `(uint256 amount0, uint256 amount1)` return data of `collect`.
///
/// # Errors
/// Returns an error if the data is shorter than two words or not hex.
pub fn decode_collect_result(data: &str) -> Result<AccruedFees> {
    let hex = data.strip_prefix("0x").unwrap_or(data);
    if !hex.is_ascii() {
        bail!("collect returned non-hex data");
    }
    if hex.len() < 2 * WORD_HEX_LEN {
        bail!("collect returned {} hex chars, expected two words", hex.len());
    }

    let word = |index: usize| -> Result<BigDecimal> {
        let slice = &hex[index * WORD_HEX_LEN..(index + 1) * WORD_HEX_LEN];
        let value = U256::from_str_radix(slice, 16)
            .map_err(|e| anyhow!("invalid ABI word '{slice}': {e:?}"))?;
        BigDecimal::from_str(&value.to_string()).context("converting ABI word")
    };

    Ok(AccruedFees::new(word(0)?, word(1)?))
}
