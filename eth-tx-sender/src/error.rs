use alloy::{
    primitives::B256,
    rpc::json_rpc::RpcError,
    transports::TransportError,
};
use thiserror::Error;

/// Errors raised while encoding, signing, sending or tracking a transaction
///
/// This enum defines all possible errors that can occur between building a
/// transaction and reading back its receipt. Each variant carries the details
/// reported by the failing layer.
#[derive(Error, Debug)]
pub enum TxError {
    /// Error reaching the Ethereum RPC node (transport or HTTP status)
    #[error("RPC connection error: {0}")]
    RpcConnection(String),

    /// The node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message reported by the node
        message: String,
    },

    /// The node answered with something we could not interpret
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// Error signing the transaction
    #[error("Transaction signing failed: {0}")]
    Signing(String),

    /// A setting needed to build the transaction is not configured
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    /// Error ABI-encoding constructor arguments
    #[error("ABI encoding failed: {0}")]
    Encoding(String),

    /// The transaction was never submitted, so there is no receipt
    #[error("Transaction was not sent")]
    NotSent,

    /// The transaction was mined but reverted
    #[error("Transaction {tx_hash} failed with status {status}")]
    Failed {
        /// Hash of the failed transaction
        tx_hash: B256,
        /// Status reported in the receipt
        status: String,
    },

    /// Receipt polling hit the configured ceiling
    #[error("No receipt for {tx_hash} after {attempts} polls")]
    ReceiptTimeout {
        /// Hash of the pending transaction
        tx_hash: B256,
        /// Number of receipt requests made
        attempts: u64,
    },
}

impl From<TransportError> for TxError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => TxError::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            RpcError::Transport(kind) => TxError::RpcConnection(kind.to_string()),
            other => TxError::InvalidResponse(other.to_string()),
        }
    }
}
