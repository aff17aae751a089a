use crate::{
    error::TxError,
    models::artifact::ContractArtifact,
    sender::{RawTransaction, TransactionSender},
};
use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::{Address, Bytes, B256},
    signers::local::PrivateKeySigner,
};
use serde::Serialize;
use tracing::{info, warn};

/// Sender and nonce of a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployOptions {
    /// Account expected to sign the deployment
    pub from: Address,
    /// Nonce of the deployment transaction
    pub nonce: u64,
}

/// Handle to a contract deployed by [`deploy_contract`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    /// Contract ABI
    pub abi: JsonAbi,
    /// Address the contract was created at
    pub address: Address,
    /// Block the deployment was mined in
    pub deployed_block_number: Option<u64>,
    /// Hash of the deployment transaction
    pub transaction_hash: B256,
}

/// Encode creation code followed by the ABI-encoded constructor arguments
pub fn encode_deploy_data(
    artifact: &ContractArtifact,
    args: &[DynSolValue],
) -> Result<Bytes, TxError> {
    let encoded_args = match &artifact.abi.constructor {
        Some(constructor) => constructor
            .abi_encode_input(args)
            .map_err(|e| TxError::Encoding(e.to_string()))?,
        None if args.is_empty() => Vec::new(),
        None => {
            return Err(TxError::Encoding(format!(
                "contract has no constructor but {} arguments were given",
                args.len()
            )))
        }
    };

    let mut data = artifact.bytecode.to_vec();
    data.extend_from_slice(&encoded_args);
    Ok(data.into())
}

/// Coerce textual arguments to the constructor's parameter types
///
/// Values use the usual Solidity literal forms: `42`, `0x...`, `true`,
/// `[1,2]`, `(a,b)`.
pub fn parse_constructor_args(abi: &JsonAbi, raw: &[String]) -> Result<Vec<DynSolValue>, TxError> {
    let inputs = abi
        .constructor
        .as_ref()
        .map(|constructor| constructor.inputs.as_slice())
        .unwrap_or_default();

    if inputs.len() != raw.len() {
        return Err(TxError::Encoding(format!(
            "constructor takes {} arguments, {} given",
            inputs.len(),
            raw.len()
        )));
    }

    inputs
        .iter()
        .zip(raw)
        .map(|(param, value)| {
            let ty: DynSolType = param
                .resolve()
                .map_err(|e| TxError::Encoding(format!("{}: {e}", param.name)))?;
            ty.coerce_str(value)
                .map_err(|e| TxError::Encoding(format!("{} ({ty}): {e}", param.name)))
        })
        .collect()
}

/// Deploy a contract and wait for it to be mined
///
/// The creation transaction is sent through [`TransactionSender::send_raw_tx`],
/// so send failures are logged there and surface here as [`TxError::NotSent`].
///
/// # Arguments
///
/// * `sender` - Transaction sender bound to the target node
/// * `artifact` - Compiled contract
/// * `args` - Constructor arguments
/// * `options` - Deployer address and nonce
/// * `signer` - Deployer key
///
/// # Returns
///
/// * `Result<DeployedContract, TxError>` - Handle bound to the new address
pub async fn deploy_contract(
    sender: &TransactionSender,
    artifact: &ContractArtifact,
    args: &[DynSolValue],
    options: DeployOptions,
    signer: &PrivateKeySigner,
) -> Result<DeployedContract, TxError> {
    if signer.address() != options.from {
        warn!(
            from = %options.from,
            signer = %signer.address(),
            "deployer address does not match the signing key"
        );
    }

    let tx = RawTransaction {
        nonce: options.nonce,
        to: None,
        data: encode_deploy_data(artifact, args)?,
    };

    let receipt = sender.send_raw_tx(&tx, signer).await.ok_or(TxError::NotSent)?;

    if !receipt.is_success() {
        return Err(TxError::Failed {
            tx_hash: receipt.transaction_hash,
            status: receipt.status.clone().unwrap_or_else(|| "missing".to_string()),
        });
    }

    let address = receipt.contract_address.ok_or_else(|| {
        TxError::InvalidResponse(format!(
            "receipt for {} has no contract address",
            receipt.transaction_hash
        ))
    })?;

    info!(%address, tx_hash = %receipt.transaction_hash, "contract deployed");

    Ok(DeployedContract {
        abi: artifact.abi.clone(),
        address,
        deployed_block_number: receipt.block_number_u64(),
        transaction_hash: receipt.transaction_hash,
    })
}
