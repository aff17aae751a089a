use crate::{config::Config, error::TxError, models::receipt::Receipt, rpc::NodeRpc};
use alloy::{
    consensus::{SignableTransaction, TxEnvelope, TxLegacy},
    eips::eip2718::Encodable2718,
    network::TxSignerSync,
    primitives::{Address, Bytes, TxKind, B256, U256},
    signers::local::PrivateKeySigner,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, instrument, warn};

/// Transaction fields chosen by the caller
///
/// Gas price, gas limit and chain id come from [`Config`]; value is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    /// Sender account nonce
    pub nonce: u64,
    /// Destination, `None` for contract creation
    pub to: Option<Address>,
    /// Call data or creation code
    pub data: Bytes,
}

/// A signed transaction ready for `eth_sendRawTransaction`
#[derive(Debug, Clone)]
pub struct SignedRawTransaction {
    /// RLP encoding of the signed transaction
    pub raw: Bytes,
    /// Hash of the signed transaction
    pub hash: B256,
}

/// Signs transactions, submits them and waits for their receipts
#[derive(Clone)]
pub struct TransactionSender {
    /// Node the transactions are sent to
    pub client: Arc<dyn NodeRpc>,
    gas_price: Option<u128>,
    gas_limit: Option<u64>,
    chain_id: Option<u64>,
    receipt_poll_interval: Duration,
    max_receipt_polls: Option<u64>,
}

impl TransactionSender {
    /// Creates a sender using the gas and polling settings from `config`
    pub fn new(client: Arc<dyn NodeRpc>, config: &Config) -> Self {
        Self {
            client,
            gas_price: config.gas_price,
            gas_limit: config.gas_limit,
            chain_id: config.chain_id,
            receipt_poll_interval: config.receipt_poll_interval,
            max_receipt_polls: config.max_receipt_polls,
        }
    }

    /// Build and sign a legacy transaction
    ///
    /// Without a configured chain id the signature is pre-EIP-155.
    pub fn sign_raw_tx(
        &self,
        tx: &RawTransaction,
        signer: &PrivateKeySigner,
    ) -> Result<SignedRawTransaction, TxError> {
        let gas_price = self.gas_price.ok_or(TxError::MissingConfig("GAS_PRICE"))?;
        let gas_limit = self.gas_limit.ok_or(TxError::MissingConfig("GAS_LIMIT"))?;

        let mut legacy = TxLegacy {
            chain_id: self.chain_id,
            nonce: tx.nonce,
            gas_price,
            gas_limit,
            to: tx.to.map_or(TxKind::Create, TxKind::Call),
            value: U256::ZERO,
            input: tx.data.clone(),
        };

        let signature = signer
            .sign_transaction_sync(&mut legacy)
            .map_err(|e| TxError::Signing(e.to_string()))?;
        let signed = legacy.into_signed(signature);
        let hash = *signed.hash();
        let envelope = TxEnvelope::from(signed);

        Ok(SignedRawTransaction {
            raw: envelope.encoded_2718().into(),
            hash,
        })
    }

    /// Sign, submit and wait for the receipt, propagating any error
    ///
    /// # Arguments
    ///
    /// * `tx` - Nonce, destination and data of the transaction
    /// * `signer` - Key the transaction is signed with
    ///
    /// # Returns
    ///
    /// * `Result<Receipt, TxError>` - The receipt once the transaction is mined
    #[instrument(skip(self, tx, signer), fields(nonce = tx.nonce, to = ?tx.to), err)]
    pub async fn try_send_raw_tx(
        &self,
        tx: &RawTransaction,
        signer: &PrivateKeySigner,
    ) -> Result<Receipt, TxError> {
        let signed = self.sign_raw_tx(tx, signer)?;
        debug!(raw = %signed.raw, "signed transaction");

        let tx_hash = self.client.send_raw_transaction(signed.raw).await?;
        if tx_hash != signed.hash {
            warn!(%tx_hash, expected = %signed.hash, "node reported an unexpected transaction hash");
        }
        info!(%tx_hash, "pending txHash");

        self.get_receipt(tx_hash).await
    }

    /// Sign, submit and wait for the receipt
    ///
    /// Any error is logged and swallowed: `None` means the transaction could
    /// not be signed, sent or tracked.
    pub async fn send_raw_tx(
        &self,
        tx: &RawTransaction,
        signer: &PrivateKeySigner,
    ) -> Option<Receipt> {
        match self.try_send_raw_tx(tx, signer).await {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                error!("Sending transaction failed: {}", e);
                None
            }
        }
    }

    /// Poll `eth_getTransactionReceipt` until the node returns a receipt
    ///
    /// Each request is preceded by the configured delay. Polling never stops
    /// on its own unless a maximum number of polls is configured.
    pub async fn get_receipt(&self, tx_hash: B256) -> Result<Receipt, TxError> {
        let mut attempts: u64 = 0;
        loop {
            tokio::time::sleep(self.receipt_poll_interval).await;
            attempts += 1;

            if let Some(receipt) = self.client.get_transaction_receipt(tx_hash).await? {
                debug!(%tx_hash, attempts, "receipt available");
                return Ok(receipt);
            }
            debug!(%tx_hash, attempts, "receipt not available yet");

            if self.max_receipt_polls.is_some_and(|max| attempts >= max) {
                return Err(TxError::ReceiptTimeout { tx_hash, attempts });
            }
        }
    }

    /// Next nonce for `address`, counting pending transactions
    pub async fn next_nonce(&self, address: Address) -> Result<u64, TxError> {
        self.client.get_transaction_count(address).await
    }
}
