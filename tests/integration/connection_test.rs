//! Connection lifecycle integration tests.
//!
//! Tests connecting, event replay and state consistency.

use alloy_primitives::Address;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wordleish::network::{ConnectionStatus, Network};
use wordleish::wallet::{events, MockWallet, MOCK_ACCOUNT};

use super::manager_for;

#[tokio::test]
async fn test_connect_twice_requests_accounts_once() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);

    manager.connect().await.unwrap();
    manager.connect().await.unwrap();

    assert_eq!(wallet.call_count("eth_requestAccounts"), 1);
    assert_eq!(manager.address(), Some(MOCK_ACCOUNT));
}

#[tokio::test]
async fn test_concurrent_connects_request_accounts_once() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);

    let (first, second) = tokio::join!(manager.connect(), manager.connect());
    first.unwrap();
    second.unwrap();

    assert_eq!(wallet.call_count("eth_requestAccounts"), 1);
    for event in events::ALL {
        assert_eq!(wallet.handler_count(event), 1, "handlers for {event}");
    }
}

#[tokio::test]
async fn test_concurrent_connects_share_a_rejection() {
    let wallet = Arc::new(
        MockWallet::new()
            .with_prompt_delay(Duration::from_millis(20))
            .with_failure("eth_requestAccounts", 4001, "User rejected the request."),
    );
    let manager = manager_for(&wallet);

    let (first, second) = tokio::join!(manager.connect(), manager.connect());
    assert!(first.unwrap_err().is_user_rejected());
    assert!(second.unwrap_err().is_user_rejected());

    assert_eq!(wallet.call_count("eth_requestAccounts"), 1);
    assert!(manager.signer().is_none());
    assert_eq!(wallet.handler_count(events::ACCOUNTS_CHANGED), 0);
}

#[tokio::test]
async fn test_concurrent_connects_behind_a_slow_prompt() {
    let wallet = Arc::new(MockWallet::new().with_prompt_delay(Duration::from_millis(20)));
    let manager = manager_for(&wallet);

    let (first, second) = tokio::join!(manager.connect(), manager.connect());
    first.unwrap();
    second.unwrap();

    assert_eq!(wallet.call_count("eth_requestAccounts"), 1);
    assert_eq!(manager.address(), Some(MOCK_ACCOUNT));
}

#[tokio::test]
async fn test_connect_on_confidential_network_wraps_both_handles() {
    let wallet = Arc::new(MockWallet::new().with_network(Network::SapphireTestnet));
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let state = manager.state();
    assert_eq!(state.network, Network::SapphireTestnet);
    assert!(state.provider.is_confidential());
    assert!(state.signer.as_ref().unwrap().is_confidential());
    assert!(state.is_consistent());
}

#[tokio::test]
async fn test_connect_on_public_network_leaves_handles_plain() {
    let wallet = Arc::new(MockWallet::new().with_network(Network::EmeraldMainnet));
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let state = manager.state();
    assert_eq!(state.network, Network::EmeraldMainnet);
    assert!(!state.provider.is_confidential());
    assert!(!state.signer.as_ref().unwrap().is_confidential());
}

#[tokio::test]
async fn test_no_torn_state_on_any_network() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    for network in Network::KNOWN {
        wallet.change_chain(network.chain_id());
        let state = manager.state();
        assert_eq!(state.network, network);
        assert!(state.is_consistent(), "inconsistent state on {network}");
        let signer = state.signer.as_ref().unwrap();
        assert_eq!(signer.network(), network);
        assert_eq!(state.provider.is_confidential(), network.is_confidential());
        assert_eq!(signer.is_confidential(), network.is_confidential());
    }
}

#[tokio::test]
async fn test_chain_changed_to_testnet_rewraps_and_keeps_address() {
    let wallet = Arc::new(MockWallet::new().with_network(Network::EmeraldTestnet));
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();
    assert!(!manager.provider().is_confidential());

    wallet.emit(events::CHAIN_CHANGED, json!("0x5aff"));

    let state = manager.state();
    assert_eq!(state.network, Network::SapphireTestnet);
    assert_eq!(state.address, Some(MOCK_ACCOUNT));
    assert!(state.provider.is_confidential());
    assert!(state.signer.as_ref().unwrap().is_confidential());
}

#[tokio::test]
async fn test_chain_changed_to_unrecognized_chain() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    wallet.change_chain(1);

    let state = manager.state();
    assert_eq!(state.network, Network::Unknown);
    assert!(!state.provider.is_confidential());
    assert!(state.is_consistent());
}

#[tokio::test]
async fn test_empty_accounts_clear_signer() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    wallet.change_accounts(&[]);

    let state = manager.state();
    assert_eq!(state.address, None);
    assert!(state.signer.is_none());
    assert_eq!(state.network, Network::SapphireMainnet);
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_new_account_restores_signer() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let other = Address::repeat_byte(0x22);
    wallet.change_accounts(&[]);
    wallet.change_accounts(&[other]);

    let state = manager.state();
    assert_eq!(state.address, Some(other));
    assert!(state.signer.as_ref().unwrap().is_confidential());
    assert!(state.is_consistent());
}

#[tokio::test]
async fn test_connect_and_disconnect_events_update_status() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    wallet.emit(events::CONNECT, json!({ "chainId": "0x5afe" }));
    assert_eq!(manager.status(), ConnectionStatus::Connected);

    wallet.emit(events::DISCONNECT, json!({ "code": 1013, "message": "disconnected" }));
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
    assert_eq!(manager.address(), Some(MOCK_ACCOUNT));
}

#[tokio::test]
async fn test_subscribers_observe_updates() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    let mut rx = manager.subscribe();

    manager.connect().await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().address, Some(MOCK_ACCOUNT));

    wallet.change_chain(Network::SapphireTestnet.chain_id());
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().network, Network::SapphireTestnet);
}

#[tokio::test]
async fn test_user_rejection_propagates() {
    let wallet = Arc::new(MockWallet::new().with_failure(
        "eth_requestAccounts",
        4001,
        "User rejected the request.",
    ));
    let manager = manager_for(&wallet);

    let err = manager.connect().await.unwrap_err();
    assert!(err.is_user_rejected());
    assert!(manager.signer().is_none());
    assert_eq!(wallet.handler_count(events::CHAIN_CHANGED), 0);
}
