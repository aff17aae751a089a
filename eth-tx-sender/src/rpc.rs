use std::{str::FromStr, sync::Arc};

use alloy::{
    network::AnyNetwork,
    primitives::{Address, Bytes, B256},
    providers::{Provider, ProviderBuilder},
};
use async_trait::async_trait;
use tracing::debug;

use crate::{error::TxError, models::receipt::Receipt};

/// Length of a `0x`-prefixed 32-byte transaction hash
const TX_HASH_HEX_LEN: usize = 66;

/// The subset of the Ethereum JSON-RPC surface used to send transactions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// `eth_sendRawTransaction`: submit a signed, RLP-encoded transaction
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, TxError>;

    /// `eth_getTransactionReceipt`: `None` while the transaction is pending
    async fn get_transaction_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>, TxError>;

    /// `eth_getTransactionCount` against the pending block
    async fn get_transaction_count(&self, address: Address) -> Result<u64, TxError>;

    /// `eth_blockNumber`
    async fn block_number(&self) -> Result<u64, TxError>;
}

/// Ethereum RPC client for blockchain interactions
///
/// Wraps an alloy HTTP provider. `AnyNetwork` keeps receipt fields that only
/// some chains define.
#[derive(Clone)]
pub struct EthereumClient {
    /// Typed provider for the target network
    pub provider: Arc<dyn Provider<AnyNetwork>>,
}

impl EthereumClient {
    /// Create a new Ethereum client with an HTTP provider
    ///
    /// No request is made until the first call.
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - URL of the Ethereum RPC endpoint
    pub fn new(rpc_url: &str) -> Result<Self, TxError> {
        let url = rpc_url
            .parse()
            .map_err(|e| TxError::RpcConnection(format!("Bad URL {rpc_url}: {e}")))?;

        let provider = ProviderBuilder::new()
            .network::<AnyNetwork>()
            .on_http(url);

        Ok(Self {
            provider: Arc::new(provider),
        })
    }
}

#[async_trait]
impl NodeRpc for EthereumClient {
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, TxError> {
        // Raw request so the node's answer can be checked before it is trusted
        let params = serde_json::value::to_raw_value(&(raw,))
            .map_err(|e| TxError::Encoding(e.to_string()))?;
        let result = self
            .provider
            .raw_request_dyn("eth_sendRawTransaction".into(), &params)
            .await?;
        let tx_hash: String = serde_json::from_str(result.get())
            .map_err(|e| TxError::InvalidResponse(format!("Tx wasn't sent: {e}")))?;
        if tx_hash.len() != TX_HASH_HEX_LEN {
            return Err(TxError::InvalidResponse(format!(
                "Tx wasn't sent, node returned {tx_hash}"
            )));
        }
        B256::from_str(&tx_hash)
            .map_err(|e| TxError::InvalidResponse(format!("Invalid tx hash {tx_hash}: {e}")))
    }

    async fn get_transaction_receipt(&self, tx_hash: B256) -> Result<Option<Receipt>, TxError> {
        let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? else {
            return Ok(None);
        };
        debug!(%tx_hash, "decoding receipt");

        let value = serde_json::to_value(&receipt)
            .map_err(|e| TxError::InvalidResponse(format!("Unreadable receipt: {e}")))?;
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| TxError::InvalidResponse(format!("Unreadable receipt: {e}")))
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, TxError> {
        Ok(self.provider.get_transaction_count(address).pending().await?)
    }

    async fn block_number(&self) -> Result<u64, TxError> {
        Ok(self.provider.get_block_number().await?)
    }
}
