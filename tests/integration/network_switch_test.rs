//! Network switching integration tests.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wordleish::connection::Registration;
use wordleish::network::Network;
use wordleish::wallet::MockWallet;

use super::manager_for;

#[tokio::test]
async fn test_switch_to_unknown_testnet_registers_chain_then_fails() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let err = manager
        .switch_network(Network::SapphireTestnet)
        .await
        .unwrap_err();
    assert!(err.is_chain_not_added());

    let adds = wallet.calls_to("wallet_addEthereumChain");
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0][0]["chainId"], json!("0x5aff"));
    assert_eq!(adds[0][0]["chainName"], json!("Sapphire Testnet"));
    assert_eq!(
        adds[0][0]["rpcUrls"],
        json!(["https://testnet.sapphire.oasis.dev"])
    );

    // The switch result arrives only through chainChanged.
    assert_eq!(manager.network(), Network::SapphireMainnet);
}

#[tokio::test]
async fn test_retry_after_registration_switches() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    assert!(manager.switch_network(Network::SapphireTestnet).await.is_err());
    manager
        .switch_network(Network::SapphireTestnet)
        .await
        .unwrap();

    let state = manager.state();
    assert_eq!(state.network, Network::SapphireTestnet);
    assert!(state.provider.is_confidential());
    assert!(state.is_consistent());
    assert_eq!(wallet.call_count("wallet_addEthereumChain"), 1);
}

#[tokio::test]
async fn test_switch_to_unknown_public_network_does_not_register() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let err = manager
        .switch_network(Network::EmeraldTestnet)
        .await
        .unwrap_err();
    assert!(err.is_chain_not_added());
    assert_eq!(wallet.call_count("wallet_addEthereumChain"), 0);
}

#[tokio::test]
async fn test_switch_to_known_network_replays_chain_changed() {
    let wallet = Arc::new(MockWallet::new().with_known_network(Network::EmeraldMainnet));
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    manager
        .switch_network(Network::EmeraldMainnet)
        .await
        .unwrap();

    let switches = wallet.calls_to("wallet_switchEthereumChain");
    assert_eq!(switches, vec![json!([{ "chainId": "0xa516" }])]);
    assert_eq!(manager.network(), Network::EmeraldMainnet);
    assert!(!manager.provider().is_confidential());
}

#[tokio::test]
async fn test_user_rejected_switch_does_not_register() {
    let wallet = Arc::new(MockWallet::new().with_failure(
        "wallet_switchEthereumChain",
        4001,
        "User rejected the request.",
    ));
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let err = manager
        .switch_network(Network::SapphireTestnet)
        .await
        .unwrap_err();
    assert!(err.is_user_rejected());
    assert_eq!(wallet.call_count("wallet_addEthereumChain"), 0);
}

#[tokio::test]
async fn test_registration_uses_configured_rpc_url() {
    let wallet = Arc::new(MockWallet::new());
    let manager = manager_for(&wallet)
        .with_rpc_url(Network::SapphireTestnet, "https://sapphire.example.test");
    manager.connect().await.unwrap();

    let _ = manager.switch_network(Network::SapphireTestnet).await;

    let adds = wallet.calls_to("wallet_addEthereumChain");
    assert_eq!(adds[0][0]["rpcUrls"], json!(["https://sapphire.example.test"]));
}

#[tokio::test]
async fn test_failed_registration_still_returns_original_error() {
    let wallet = Arc::new(MockWallet::new().with_failure(
        "wallet_addEthereumChain",
        -32603,
        "Internal JSON-RPC error.",
    ));
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let err = manager
        .switch_network(Network::SapphireTestnet)
        .await
        .unwrap_err();
    assert!(err.is_chain_not_added());
    assert_eq!(err.rpc_code(), Some(4902));
    assert_eq!(wallet.call_count("wallet_addEthereumChain"), 1);
    assert_eq!(manager.network(), Network::SapphireMainnet);

    let failure = manager
        .try_switch_network(Network::SapphireTestnet)
        .await
        .unwrap_err();
    assert_eq!(failure.registration, Registration::Failed);
}

#[tokio::test]
async fn test_switch_to_unknown_mainnet_registers_chain() {
    let wallet = Arc::new(MockWallet::new().with_network(Network::EmeraldMainnet));
    let manager = manager_for(&wallet);
    manager.connect().await.unwrap();

    let failure = manager
        .try_switch_network(Network::SapphireMainnet)
        .await
        .unwrap_err();
    assert!(failure.error.is_chain_not_added());
    assert_eq!(failure.registration, Registration::Registered);

    let adds = wallet.calls_to("wallet_addEthereumChain");
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0][0]["chainId"], json!("0x5afe"));
    assert_eq!(adds[0][0]["chainName"], json!("Sapphire Mainnet"));
    assert_eq!(adds[0][0]["rpcUrls"], json!(["https://sapphire.oasis.io"]));
    assert_eq!(manager.network(), Network::EmeraldMainnet);

    manager
        .switch_network(Network::SapphireMainnet)
        .await
        .unwrap();
    assert_eq!(manager.network(), Network::SapphireMainnet);
    assert!(manager.provider().is_confidential());
}
