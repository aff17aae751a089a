//! Integration tests for the JSON-RPC client and the send/poll flow

use alloy::{
    consensus::TxEnvelope,
    eips::eip2718::Decodable2718,
    primitives::{Address, Bytes, B256},
    signers::local::PrivateKeySigner,
};
use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

use eth_tx_sender::{EthereumClient, NodeRpc, RawTransaction, TxError};

use helpers::{
    init_logger, on_rpc, receipt_json, rpc_error, rpc_missing_result, rpc_result, sender_for,
    DEV_ADDRESS, DEV_KEY, TX_HASH,
};

fn transfer() -> RawTransaction {
    RawTransaction {
        nonce: 7,
        to: Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap()),
        data: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
    }
}

/// Pull the JSON bodies the mock node received for `rpc_method`.
async fn received_calls(server: &MockServer, rpc_method: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("Request recording is disabled")
        .iter()
        .map(|request| request.body_json::<Value>().expect("Request body is not JSON"))
        .filter(|body| body["method"] == rpc_method)
        .collect()
}

#[tokio::test]
async fn test_send_raw_tx_returns_receipt() {
    init_logger();
    let server = MockServer::start().await;

    on_rpc("eth_sendRawTransaction")
        .respond_with(rpc_result(json!(TX_HASH)))
        .expect(1)
        .mount(&server)
        .await;
    on_rpc("eth_getTransactionReceipt")
        .respond_with(rpc_result(receipt_json("0x1", None)))
        .mount(&server)
        .await;

    let sender = sender_for(&server);
    let signer: PrivateKeySigner = DEV_KEY.parse().unwrap();
    let receipt = sender
        .send_raw_tx(&transfer(), &signer)
        .await
        .expect("Expected a receipt");

    assert_eq!(receipt.transaction_hash, TX_HASH.parse::<B256>().unwrap());
    assert!(receipt.is_success());
    assert_eq!(receipt.other["logsBloom"].as_str().unwrap().len(), 514);

    // The submitted payload is a signed legacy transaction carrying our settings.
    let sends = received_calls(&server, "eth_sendRawTransaction").await;
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0]["jsonrpc"], "2.0");
    let raw: Bytes = serde_json::from_value(sends[0]["params"][0].clone()).unwrap();
    let TxEnvelope::Legacy(tx) = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap() else {
        panic!("expected a legacy transaction");
    };
    assert_eq!(tx.tx().nonce, 7);
    assert_eq!(tx.tx().gas_limit, 6_000_000);
    assert_eq!(tx.tx().gas_price, 1_000_000_000);
    assert_eq!(tx.tx().input.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);

    // The receipt was requested for the hash the node returned.
    let polls = received_calls(&server, "eth_getTransactionReceipt").await;
    assert_eq!(polls[0]["params"][0], TX_HASH);
}

#[tokio::test]
async fn test_receipt_polling_retries_on_null() {
    init_logger();
    let server = MockServer::start().await;

    on_rpc("eth_getTransactionReceipt")
        .respond_with(rpc_result(Value::Null))
        .up_to_n_times(3)
        .mount(&server)
        .await;
    on_rpc("eth_getTransactionReceipt")
        .respond_with(rpc_result(receipt_json("0x1", None)))
        .mount(&server)
        .await;

    let sender = sender_for(&server);
    let receipt = sender
        .get_receipt(TX_HASH.parse().unwrap())
        .await
        .expect("Expected a receipt");

    assert_eq!(receipt.block_number_u64(), Some(0x10));
    assert_eq!(received_calls(&server, "eth_getTransactionReceipt").await.len(), 4);
}

#[tokio::test]
async fn test_receipt_polling_gives_up_at_ceiling() {
    let server = MockServer::start().await;

    on_rpc("eth_getTransactionReceipt")
        .respond_with(rpc_result(Value::Null))
        .mount(&server)
        .await;

    let sender = sender_for(&server);
    let err = sender
        .get_receipt(TX_HASH.parse().unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, TxError::ReceiptTimeout { attempts: 20, .. }));
}

#[tokio::test]
async fn test_receipt_without_result_field_is_an_error() {
    init_logger();
    let server = MockServer::start().await;

    // Neither `result` nor `error`: not the same as a pending `"result": null`
    on_rpc("eth_getTransactionReceipt")
        .respond_with(rpc_missing_result())
        .mount(&server)
        .await;

    let sender = sender_for(&server);
    let err = sender
        .get_receipt(TX_HASH.parse().unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, TxError::InvalidResponse(_)), "got {err:?}");
    assert_eq!(received_calls(&server, "eth_getTransactionReceipt").await.len(), 1);
}

#[tokio::test]
async fn test_rpc_error_is_reported() {
    let server = MockServer::start().await;

    on_rpc("eth_sendRawTransaction")
        .respond_with(rpc_error(-32000, "nonce too low"))
        .mount(&server)
        .await;

    let sender = sender_for(&server);
    let signer: PrivateKeySigner = DEV_KEY.parse().unwrap();

    let err = sender.try_send_raw_tx(&transfer(), &signer).await.unwrap_err();
    match err {
        TxError::Rpc { code, message } => {
            assert_eq!(code, -32000);
            assert_eq!(message, "nonce too low");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The swallowing variant hides the error behind `None`.
    assert!(sender.send_raw_tx(&transfer(), &signer).await.is_none());
    assert!(received_calls(&server, "eth_getTransactionReceipt").await.is_empty());
}

#[tokio::test]
async fn test_malformed_tx_hash_is_rejected() {
    let server = MockServer::start().await;

    on_rpc("eth_sendRawTransaction")
        .respond_with(rpc_result(json!("0x1234")))
        .mount(&server)
        .await;

    let client = EthereumClient::new(&server.uri()).unwrap();
    let err = client
        .send_raw_transaction(Bytes::from_static(&[0x01]))
        .await
        .unwrap_err();

    assert!(matches!(err, TxError::InvalidResponse(ref msg) if msg.contains("wasn't sent")));
}

#[tokio::test]
async fn test_http_failure_is_a_connection_error() {
    let server = MockServer::start().await;

    on_rpc("eth_blockNumber")
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = EthereumClient::new(&server.uri()).unwrap();
    assert!(matches!(
        client.block_number().await,
        Err(TxError::RpcConnection(_))
    ));
}

#[tokio::test]
async fn test_quantity_methods() {
    let server = MockServer::start().await;

    on_rpc("eth_blockNumber")
        .respond_with(rpc_result(json!("0x1b4")))
        .mount(&server)
        .await;
    on_rpc("eth_getTransactionCount")
        .respond_with(rpc_result(json!("0x5")))
        .mount(&server)
        .await;

    let client = EthereumClient::new(&server.uri()).unwrap();
    assert_eq!(client.block_number().await.unwrap(), 436);

    let address: Address = DEV_ADDRESS.parse().unwrap();
    assert_eq!(client.get_transaction_count(address).await.unwrap(), 5);

    let calls = received_calls(&server, "eth_getTransactionCount").await;
    assert_eq!(calls[0]["params"][1], "pending");
}
