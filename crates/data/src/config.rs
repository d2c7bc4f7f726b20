//! Network tables and environment-driven configuration.

use anyhow::{Context, Result, anyhow, bail};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Decentralized network gateway serving both the DEX and analytics subgraphs.
pub const GATEWAY_URL: &str = "https://gateway-arbitrum.network.thegraph.com/api";

/// Default number of positions requested per subgraph page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Default HTTP timeout for subgraph and RPC calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chains with a known subgraph deployment and position manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Ethereum,
    Base,
    Arbitrum,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Ethereum, Network::Base, Network::Arbitrum];

    /// Short name used in CLI flags and output paths.
    #[must_use]
    pub fn slug(&self) -> &'static str {
        match self {
            Network::Ethereum => "eth",
            Network::Base => "base",
            Network::Arbitrum => "arb",
        }
    }

    /// Subgraph deployment with pools, positions and day data.
    #[must_use]
    pub fn dex_subgraph_id(&self) -> &'static str {
        match self {
            Network::Ethereum => "9fWsevEC9Yz4WdW9QyUvu2JXsxyXAxc1X4HaEkmyyc75",
            Network::Base => "FUbEPQw1oMghy39fwWBFY5fE6MXPXZQtjncQy2cXdrNS",
            Network::Arbitrum => "FQ6JYszEKApsBpAmiHesRsd9Ygc6mzmpNRANeVQFYoVX",
        }
    }

    /// Subgraph deployment with token USD prices and position timestamps.
    #[must_use]
    pub fn analytics_subgraph_id(&self) -> &'static str {
        match self {
            Network::Ethereum => "4cKy6QQMc5tpfdx8yxfYeb9TLZmgLQe44ddW1G7NwkA6",
            Network::Base => "FUbEPQw1oMghy39fwWBFY5fE6MXPXZQtjncQy2cXdrNS",
            Network::Arbitrum => "FQ6JYszEKApsBpAmiHesRsd9Ygc6mzmpNRANeVQFYoVX",
        }
    }

    /// NonfungiblePositionManager contract address.
    #[must_use]
    pub fn position_manager(&self) -> &'static str {
        match self {
            Network::Ethereum | Network::Arbitrum => "0xC36442b4a4522E871399CD717aBDD847Ab11FE88",
            Network::Base => "0x03a520b32C04BF3bEEf7BEb72E919cf822Ed34f1",
        }
    }

    fn alchemy_host(&self) -> &'static str {
        match self {
            Network::Ethereum => "eth-mainnet",
            Network::Base => "base-mainnet",
            Network::Arbitrum => "arb-mainnet",
        }
    }

    /// Hosted RPC endpoint for an Alchemy key.
    #[must_use]
    pub fn alchemy_rpc_url(&self, api_key: &str) -> String {
        format!("https://{}.g.alchemy.com/v2/{}", self.alchemy_host(), api_key)
    }

    /// Pool aliases known for this network, as `(alias, address)`.
    #[must_use]
    pub fn known_pools(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Network::Ethereum => &[
                ("USDC_USDT_100", "0x3416cF6C708Da44DB2624D63ea0AAef7113527C6"),
                ("USDC_USDT_500", "0x7858E59e0C01EA06Df3aF3D20aC7B0003275D4Bf"),
                ("DAI_USDC_500", "0x6c6Bc977E13Df9b0de53b251522280BB72383700"),
                ("USDT_DAI", "0x48DA0965ab2d2cbf1C17C09cFB5Cbe67Ad5B1406"),
                ("DAI_USDC", "0x5777d92f208679DB4b9778590Fa3CAB3aC9e2168"),
                ("WETH_USDC", "0x8ad599c3A0ff1De082011EFDDc58f1908eb6e6D8"),
                ("WETH_USDC_500", "0x88e6A0c2dDD26FEEb64F039a2c41296fcB3f5640"),
                ("WETH_USDT", "0x4e68Ccd3E89f51C3074ca5072bbAC773960dFa36"),
                ("WETH_DAI", "0xC2e9F25Be6257c210d7Adf0D4Cd6E3E881ba25f8"),
            ],
            Network::Base => &[
                ("USDC_USDT", "0xD56da2B74bA826f19015E6B7Dd9Dae1903E85DA1"),
                ("DAI_USDC", "0xC18F50d6A832f12F6DcAaeEe8D0c87A65B96787E"),
                ("WETH_USDC", "0xd0b53D9277642d899DF5C87A3966A349A798F224"),
                ("WETH_USDT", "0xd92E0767473D1E3FF11Ac036f2b1DB90aD0aE55F"),
                ("WETH_DAI", "0x93e8542E6CA0eFFfb9D57a270b76712b968A38f5"),
            ],
            Network::Arbitrum => &[
                ("USDC_USDT", "0xbE3aD6a5669Dc0B8b12FeBC03608860C31E2eef6"),
                ("USDT_DAI", "0x7f580f8A02b759C350E6b8340e7c2d4b8162b6a9"),
                ("DAI_USDC", "0xd37Af656Abf91c7f548FfFC0133175b5e4d3d5e6"),
                ("WETH_USDC", "0xC31E54c7a869B9FcBEcc14363CF510d1c41fa443"),
                ("WETH_USDT", "0x641C00A822e8b671738d32a431a4Fb6074E5c79d"),
                ("WETH_DAI", "0xA961F0473dA4864C5eD28e00FcC53a3AAb056c1b"),
            ],
        }
    }

    /// Resolves a pool alias or a raw address to a lowercase address.
    ///
    /// # Errors
    /// Returns an error if the input is neither a known alias nor a
    /// well-formed 20-byte hex address.
    pub fn resolve_pool(&self, alias_or_address: &str) -> Result<String> {
        if let Some((_, address)) = self
            .known_pools()
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(alias_or_address))
        {
            return Ok(address.to_lowercase());
        }

        let hex = alias_or_address
            .strip_prefix("0x")
            .ok_or_else(|| anyhow!("unknown pool '{alias_or_address}' on {self}"))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("'{alias_or_address}' is not a pool address");
        }
        Ok(alias_or_address.to_lowercase())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "eth" | "ethereum" | "mainnet" => Ok(Network::Ethereum),
            "base" => Ok(Network::Base),
            "arb" | "arbitrum" => Ok(Network::Arbitrum),
            other => bail!("unsupported network '{other}' (expected eth, base or arb)"),
        }
    }
}

/// Builds a gateway query URL for a subgraph deployment.
#[must_use]
pub fn subgraph_url(api_key: &str, subgraph_id: &str) -> String {
    format!("{GATEWAY_URL}/{api_key}/subgraphs/id/{subgraph_id}")
}

/// Endpoints and limits for one network.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub network: Network,
    pub dex_subgraph_url: String,
    pub analytics_subgraph_url: String,
    /// JSON-RPC endpoint for the fee oracle; `None` when no key is configured.
    pub rpc_url: Option<String>,
    pub page_size: usize,
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// Recognized variables:
    /// * `GRAPH_API_KEY` - gateway key, required unless both subgraph URLs are overridden
    /// * `DEX_SUBGRAPH_URL`, `ANALYTICS_SUBGRAPH_URL` - explicit endpoint overrides
    /// * `RPC_URL` or `ALCHEMY_API_KEY` - fee oracle endpoint
    /// * `PAGE_SIZE`, `REQUEST_TIMEOUT_SECS`
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a numeric one
    /// does not parse.
    pub fn from_env(network: Network) -> Result<Self> {
        Self::from_lookup(network, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(network: Network, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let api_key = var("GRAPH_API_KEY");

        let subgraph = |override_key: &str, id: &str| -> Result<String> {
            if let Some(url) = var(override_key) {
                return Ok(url);
            }
            let key = api_key
                .as_deref()
                .with_context(|| format!("GRAPH_API_KEY or {override_key} must be set"))?;
            Ok(subgraph_url(key, id))
        };

        let dex_subgraph_url = subgraph("DEX_SUBGRAPH_URL", network.dex_subgraph_id())?;
        let analytics_subgraph_url =
            subgraph("ANALYTICS_SUBGRAPH_URL", network.analytics_subgraph_id())?;

        let rpc_url = var("RPC_URL").or_else(|| {
            var("ALCHEMY_API_KEY").map(|key| network.alchemy_rpc_url(&key))
        });

        let page_size = match var("PAGE_SIZE") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("PAGE_SIZE '{v}' is not a number"))?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            bail!("PAGE_SIZE must be positive");
        }

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS '{v}' is not a number"))?,
            ),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            network,
            dex_subgraph_url,
            analytics_subgraph_url,
            rpc_url,
            page_size,
            request_timeout,
        })
    }
}
