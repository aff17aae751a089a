use alloy::{
    primitives::{Address, Bytes, B256},
    signers::local::PrivateKeySigner,
};
use clap::{Parser, Subcommand};
use eth_tx_sender::{
    deploy::{deploy_contract, parse_constructor_args, DeployOptions},
    Config, ContractArtifact, EthereumClient, NodeRpc, RawTransaction, TransactionSender, TxError,
};
use eyre::{eyre, Result};
use std::{path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Deploy contracts and send signed transactions to an Ethereum JSON-RPC node
///
/// Gas price, gas limit, poll interval and endpoint come from the environment
/// (or a `.env` file): GAS_PRICE, GAS_LIMIT, GET_RECEIPT_INTERVAL_IN_MILLISECONDS,
/// RPC_URL, CHAIN_ID, MAX_RECEIPT_POLLS. `receipt` needs no gas settings.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy a compiled contract artifact
    Deploy {
        /// Artifact JSON containing `abi` and `bytecode`
        #[arg(long)]
        artifact: PathBuf,

        /// Constructor argument, repeated in declaration order
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Deployer address (defaults to the key's address)
        #[arg(long)]
        from: Option<Address>,

        /// Transaction nonce (defaults to the pending transaction count)
        #[arg(long)]
        nonce: Option<u64>,

        /// Deployer private key
        #[arg(long, env = "DEPLOYMENT_PRIVATE_KEY", hide_env_values = true)]
        private_key: PrivateKeySigner,
    },

    /// Send a transaction to an existing address
    Send {
        /// Destination address
        #[arg(long)]
        to: Address,

        /// Call data
        #[arg(long, default_value = "0x")]
        data: Bytes,

        /// Transaction nonce (defaults to the pending transaction count)
        #[arg(long)]
        nonce: Option<u64>,

        /// Sender private key
        #[arg(long, env = "DEPLOYMENT_PRIVATE_KEY", hide_env_values = true)]
        private_key: PrivateKeySigner,
    },

    /// Wait for the receipt of an already submitted transaction
    Receipt {
        /// Transaction hash
        #[arg(long)]
        tx_hash: B256,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("eth_tx_sender=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    // Logs go to stderr so stdout only carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    if matches!(cli.command, Command::Deploy { .. } | Command::Send { .. }) {
        config.require_gas()?;
    }

    let client = EthereumClient::new(&config.rpc_url)?;
    let block_number = client.block_number().await?;
    info!(rpc_url = %config.rpc_url, block_number, "connected");

    let sender = TransactionSender::new(Arc::new(client), &config);

    let output = match cli.command {
        Command::Deploy {
            artifact,
            args,
            from,
            nonce,
            private_key,
        } => {
            let artifact = ContractArtifact::from_file(&artifact)?;
            let args = parse_constructor_args(&artifact.abi, &args)?;
            let nonce = resolve_nonce(&sender, nonce, &private_key).await?;
            let options = DeployOptions {
                from: from.unwrap_or_else(|| private_key.address()),
                nonce,
            };
            let deployed = deploy_contract(&sender, &artifact, &args, options, &private_key).await?;
            serde_json::to_string_pretty(&deployed)?
        }
        Command::Send {
            to,
            data,
            nonce,
            private_key,
        } => {
            let tx = RawTransaction {
                nonce: resolve_nonce(&sender, nonce, &private_key).await?,
                to: Some(to),
                data,
            };
            let receipt = sender
                .send_raw_tx(&tx, &private_key)
                .await
                .ok_or_else(|| eyre!("transaction was not sent, see log for details"))?;
            serde_json::to_string_pretty(&receipt)?
        }
        Command::Receipt { tx_hash } => {
            serde_json::to_string_pretty(&sender.get_receipt(tx_hash).await?)?
        }
    };

    println!("{output}");
    Ok(())
}

async fn resolve_nonce(
    sender: &TransactionSender,
    nonce: Option<u64>,
    signer: &PrivateKeySigner,
) -> Result<u64, TxError> {
    match nonce {
        Some(nonce) => Ok(nonce),
        None => sender.next_nonce(signer.address()).await,
    }
}
