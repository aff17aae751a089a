use alloy::primitives::utils::parse_units;
use eyre::{eyre, Result, WrapErr};
use std::{env, time::Duration};

/// Default JSON-RPC endpoint
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Default delay between receipt requests, in milliseconds
pub const DEFAULT_RECEIPT_INTERVAL_MS: u64 = 1_000;

/// Transaction sender configuration
///
/// Every transaction sent by this crate uses the same gas price and gas limit,
/// both taken from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ethereum RPC endpoint URL
    pub rpc_url: String,

    /// Delay before each `eth_getTransactionReceipt` request
    pub receipt_poll_interval: Duration,

    /// Gas limit applied to every transaction (needed only for signing)
    pub gas_limit: Option<u64>,

    /// Gas price in wei applied to every transaction (needed only for signing)
    pub gas_price: Option<u128>,

    /// Chain id for EIP-155 replay protection (pre-EIP-155 signing when unset)
    pub chain_id: Option<u64>,

    /// Upper bound on receipt requests (unbounded when unset)
    pub max_receipt_polls: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Environment Variables
    ///
    /// * `RPC_URL` - Ethereum RPC URL (default: "http://localhost:8545")
    /// * `GET_RECEIPT_INTERVAL_IN_MILLISECONDS` - Receipt poll interval (default: 1000)
    /// * `GAS_LIMIT` - Gas limit (required to send, see [`Config::require_gas`])
    /// * `GAS_PRICE` - Gas price in gwei, decimals allowed (required to send)
    /// * `CHAIN_ID` - EIP-155 chain id (optional)
    /// * `MAX_RECEIPT_POLLS` - Maximum number of receipt requests (optional)
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (useful for development)
        let _ = dotenv::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_ms = match lookup("GET_RECEIPT_INTERVAL_IN_MILLISECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .wrap_err("GET_RECEIPT_INTERVAL_IN_MILLISECONDS must be an integer")?,
            None => DEFAULT_RECEIPT_INTERVAL_MS,
        };

        let gas_limit = lookup("GAS_LIMIT")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .wrap_err("GAS_LIMIT must be an integer")?;

        let gas_price = lookup("GAS_PRICE")
            .map(|raw| parse_gwei(&raw))
            .transpose()?;

        let chain_id = lookup("CHAIN_ID")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .wrap_err("CHAIN_ID must be an integer")?;

        let max_receipt_polls = lookup("MAX_RECEIPT_POLLS")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .wrap_err("MAX_RECEIPT_POLLS must be an integer")?;
        if max_receipt_polls == Some(0) {
            return Err(eyre!("MAX_RECEIPT_POLLS must be at least 1"));
        }

        Ok(Config {
            rpc_url: lookup("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            receipt_poll_interval: Duration::from_millis(interval_ms),
            gas_limit,
            gas_price,
            chain_id,
            max_receipt_polls,
        })
    }

    /// Check that the settings needed to sign a transaction are present
    pub fn require_gas(&self) -> Result<()> {
        if self.gas_limit.is_none() {
            return Err(eyre!("GAS_LIMIT is not set"));
        }
        if self.gas_price.is_none() {
            return Err(eyre!("GAS_PRICE is not set"));
        }
        Ok(())
    }
}

/// Convert a decimal gwei amount (e.g. "1.5") to wei.
pub fn parse_gwei(raw: &str) -> Result<u128> {
    let raw = raw.trim();
    if raw.starts_with('-') {
        return Err(eyre!("GAS_PRICE must not be negative: {raw}"));
    }
    let wei = parse_units(raw, "gwei")
        .map_err(|e| eyre!("Invalid GAS_PRICE {raw}: {e}"))?
        .get_absolute();
    u128::try_from(wei).map_err(|_| eyre!("GAS_PRICE {raw} does not fit in u128 wei"))
}
