//! Integration tests for Wordleish.

pub mod connection_test;
pub mod contract_test;
pub mod network_switch_test;

use std::sync::Arc;
use wordleish::confidential::SapphireWrapper;
use wordleish::connection::ConnectionManager;
use wordleish::network::Network;
use wordleish::rpc::MockTransport;
use wordleish::wallet::{MockWallet, StaticDetector};

/// Builds a manager that will discover `wallet`, reading from Sapphire mainnet until connected.
pub fn manager_for(wallet: &Arc<MockWallet>) -> ConnectionManager {
    ConnectionManager::new(
        Arc::new(StaticDetector::new(wallet.clone())),
        Arc::new(SapphireWrapper),
        Network::SapphireMainnet,
        Arc::new(MockTransport::new()),
    )
}
