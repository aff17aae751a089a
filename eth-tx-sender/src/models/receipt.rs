use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use super::hex::{compare_hex, parse_hex_u64};

/// Status value reported by a successful transaction
pub const STATUS_SUCCESS: &str = "0x1";

/// Transaction receipt as returned by `eth_getTransactionReceipt`
///
/// Only the fields this crate acts on are typed. Everything else the node
/// reports is kept in `other` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Hash of the mined transaction
    pub transaction_hash: B256,

    /// Block number (hex quantity)
    #[serde(default)]
    pub block_number: Option<String>,

    /// Block hash
    #[serde(default)]
    pub block_hash: Option<B256>,

    /// Address of the created contract, for deployments
    #[serde(default)]
    pub contract_address: Option<Address>,

    /// Execution status (hex quantity, "0x1" on success)
    #[serde(default)]
    pub status: Option<String>,

    /// Gas used by this transaction (hex quantity)
    #[serde(default)]
    pub gas_used: Option<String>,

    /// Remaining chain-defined fields
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl Receipt {
    /// Whether the receipt reports success. A missing status is not success.
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| compare_hex(status, STATUS_SUCCESS))
    }

    /// Block number as an integer, if present and well-formed
    pub fn block_number_u64(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|raw| parse_hex_u64(raw).ok())
    }
}
