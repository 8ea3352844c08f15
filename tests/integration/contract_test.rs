//! Contract client integration tests.
//!
//! Runs the game calls against a canned JSON-RPC transport.

use alloy_primitives::{address, b256, hex, Address, B256};
use alloy_sol_types::SolEvent;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wordleish::contract::{is_solved, GameStarted, LetterMatch, Wordleish};
use wordleish::error::WordleishError;
use wordleish::network::Network;
use wordleish::provider::Provider;
use wordleish::rpc::MockTransport;

const CONTRACT: Address = address!("dE5DAB93f9008D4A2A746EB4e3903bF835D8c7D4");
const ACCOUNT: Address = address!("1111111111111111111111111111111111111111");
const TX_HASH: B256 = b256!("00000000000000000000000000000000000000000000000000000000000abc12");

fn word(prefix: &str) -> String {
    format!("0x{:0<64}", prefix)
}

fn uint(value: u64) -> String {
    format!("0x{:064x}", value)
}

fn address_of(value: &Value) -> Address {
    serde_json::from_value(value.clone()).unwrap()
}

fn provider(transport: MockTransport) -> (Provider, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let provider = Provider::new(transport.clone()).on_network(Network::SapphireMainnet);
    (provider, transport)
}

#[tokio::test]
async fn test_next_game_id() {
    let (provider, transport) =
        provider(MockTransport::new().with_response("eth_call", json!(uint(12))));
    let contract = Wordleish::new(CONTRACT);

    assert_eq!(contract.next_game_id(&provider).await.unwrap(), 12);

    let calls = transport.calls_to("eth_call");
    assert_eq!(address_of(&calls[0][0]["to"]), CONTRACT);
    assert_eq!(calls[0][0]["input"], json!("0xb135bbb0"));
    assert_eq!(calls[0][1], json!("latest"));
}

#[tokio::test]
async fn test_check_guess_encodes_and_decodes() {
    let (provider, transport) =
        provider(MockTransport::new().with_response("eth_call", json!(word("0201000002"))));
    let contract = Wordleish::new(CONTRACT);

    let matches = contract.check_guess(&provider, 3, "OPALS").await.unwrap();
    assert_eq!(
        matches,
        [
            LetterMatch::Correct,
            LetterMatch::Present,
            LetterMatch::Missing,
            LetterMatch::Missing,
            LetterMatch::Correct,
        ]
    );
    assert!(!is_solved(&matches));

    let data = transport.calls_to("eth_call")[0][0]["input"]
        .as_str()
        .unwrap()
        .to_string();
    let expected = format!(
        "0x5391ba7e{}{}",
        &uint(3)[2..],
        &word(&hex::encode("opals"))[2..]
    );
    assert_eq!(data, expected);
}

#[tokio::test]
async fn test_solved_guess() {
    let (provider, _) =
        provider(MockTransport::new().with_response("eth_call", json!(word("0202020202"))));
    let matches = Wordleish::new(CONTRACT)
        .check_guess(&provider, 0, "oasis")
        .await
        .unwrap();
    assert!(is_solved(&matches));
}

#[tokio::test]
async fn test_revert_reason_becomes_contract_error() {
    let (provider, _) = provider(MockTransport::new().with_error(
        "eth_call",
        3,
        "execution reverted: found invalid letter",
    ));
    let err = Wordleish::new(CONTRACT)
        .check_guess(&provider, 0, "zzzzz")
        .await
        .unwrap_err();
    assert!(matches!(err, WordleishError::Contract(ref msg) if msg == "found invalid letter"));
}

#[tokio::test]
async fn test_other_rpc_errors_pass_through() {
    let (provider, _) =
        provider(MockTransport::new().with_error("eth_call", -32000, "header not found"));
    let err = Wordleish::new(CONTRACT)
        .next_game_id(&provider)
        .await
        .unwrap_err();
    assert_eq!(err.rpc_code(), Some(-32000));
}

#[tokio::test]
async fn test_start_game_sends_transaction() {
    let (provider, transport) =
        provider(MockTransport::new().with_response("eth_sendTransaction", json!(TX_HASH)));
    let signer = provider.get_signer().with_address(ACCOUNT);

    let hash = Wordleish::new(CONTRACT)
        .start_game(&signer, "Oasis")
        .await
        .unwrap();
    assert_eq!(hash, TX_HASH);

    let tx = &transport.calls_to("eth_sendTransaction")[0][0];
    assert_eq!(address_of(&tx["from"]), ACCOUNT);
    assert_eq!(address_of(&tx["to"]), CONTRACT);
    assert_eq!(
        tx["input"],
        json!(format!("0xe5ed1d59{}", &word(&hex::encode("oasis"))[2..]))
    );
}

#[tokio::test]
async fn test_submit_guess_fetches_sender_when_unknown() {
    let (provider, transport) = provider(
        MockTransport::new()
            .with_response("eth_accounts", json!([ACCOUNT]))
            .with_response("eth_sendTransaction", json!(TX_HASH)),
    );
    let signer = provider.get_signer();

    let hash = Wordleish::new(CONTRACT)
        .submit_guess(&signer, 5, "oasis")
        .await
        .unwrap();
    assert_eq!(hash, TX_HASH);
    assert_eq!(transport.calls_to("eth_accounts").len(), 1);

    let tx = &transport.calls_to("eth_sendTransaction")[0][0];
    assert_eq!(address_of(&tx["from"]), ACCOUNT);
}

#[tokio::test]
async fn test_started_game_id_from_receipt() {
    let receipt = json!({
        "status": "0x1",
        "logs": [
            { "topics": ["0xdeadbeef"], "data": "0x" },
            { "topics": [GameStarted::SIGNATURE_HASH, uint(7)], "data": "0x" },
        ],
    });
    let (provider, transport) =
        provider(MockTransport::new().with_response("eth_getTransactionReceipt", receipt));

    let id = Wordleish::new(CONTRACT)
        .started_game_id(&provider, TX_HASH, 3, Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(id, Some(7));

    let params = &transport.calls_to("eth_getTransactionReceipt")[0];
    let hash: B256 = serde_json::from_value(params[0].clone()).unwrap();
    assert_eq!(hash, TX_HASH);
}

#[tokio::test]
async fn test_started_game_id_from_unindexed_event() {
    let receipt = json!({
        "logs": [{ "topics": [GameStarted::SIGNATURE_HASH], "data": uint(4) }],
    });
    let (provider, _) =
        provider(MockTransport::new().with_response("eth_getTransactionReceipt", receipt));

    let id = Wordleish::new(CONTRACT)
        .started_game_id(&provider, TX_HASH, 1, Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(id, Some(4));
}

#[tokio::test]
async fn test_receipt_without_game_started_is_an_error() {
    let (provider, _) = provider(
        MockTransport::new().with_response("eth_getTransactionReceipt", json!({ "logs": [] })),
    );

    let err = Wordleish::new(CONTRACT)
        .started_game_id(&provider, TX_HASH, 1, Duration::from_millis(1))
        .await
        .unwrap_err();
    assert!(matches!(err, WordleishError::Contract(_)));
}

#[tokio::test]
async fn test_started_game_id_while_pending() {
    let (provider, transport) =
        provider(MockTransport::new().with_response("eth_getTransactionReceipt", Value::Null));

    let id = Wordleish::new(CONTRACT)
        .started_game_id(&provider, TX_HASH, 2, Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(id, None);
    assert_eq!(transport.calls_to("eth_getTransactionReceipt").len(), 2);
}
