//! Deploy contracts and send signed legacy transactions to an Ethereum
//! JSON-RPC node, then poll for their receipts.

pub mod config;
pub mod deploy;
pub mod error;
pub mod models;
pub mod rpc;
pub mod sender;

pub use config::Config;
pub use deploy::{deploy_contract, encode_deploy_data, DeployOptions, DeployedContract};
pub use error::TxError;
pub use models::{artifact::ContractArtifact, hex::compare_hex, receipt::Receipt};
pub use rpc::{EthereumClient, NodeRpc};
pub use sender::{RawTransaction, TransactionSender};
