//! Injected wallet abstraction.
//!
//! Models the EIP-1193 surface a browser wallet exposes: a request method,
//! event subscriptions and a self-identification marker. Wallet discovery
//! sits behind [`WalletDetector`] so the connection manager can be driven
//! by a node-backed wallet, a mock, or a real injected object.

mod http;
mod local;
mod mock;

pub use http::HttpWallet;
pub use local::LocalKeyWallet;
pub use mock::{MockWallet, MOCK_ACCOUNT};

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::network::Network;
use crate::rpc::RpcTransport;

/// Callback registered with [`InjectedWallet::on`]; receives the raw event payload.
pub type EventHandler = Box<dyn Fn(Value) + Send + Sync>;

/// Names of the wallet events the connection manager listens to.
pub mod events {
    pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
    pub const CHAIN_CHANGED: &str = "chainChanged";
    pub const CONNECT: &str = "connect";
    pub const DISCONNECT: &str = "disconnect";

    pub const ALL: [&str; 4] = [ACCOUNTS_CHANGED, CHAIN_CHANGED, CONNECT, DISCONNECT];
}

/// Trait defining the interface of an injected wallet.
#[async_trait]
pub trait InjectedWallet: Send + Sync {
    /// Sends an RPC request to the wallet (may prompt the user).
    async fn request(&self, method: &str, params: Value) -> Result<Value>;

    /// Registers a handler for a wallet-emitted event.
    ///
    /// Handlers are invoked serially, in emission order.
    fn on(&self, event: &str, handler: EventHandler);

    /// True if the wallet identifies as the MetaMask browser extension.
    fn is_metamask(&self) -> bool;
}

/// Finds the wallet injected into the host environment.
#[async_trait]
pub trait WalletDetector: Send + Sync {
    async fn detect(&self) -> Option<Arc<dyn InjectedWallet>>;
}

/// Detector that always returns the same wallet (or none).
#[derive(Clone, Default)]
pub struct StaticDetector {
    wallet: Option<Arc<dyn InjectedWallet>>,
}

impl StaticDetector {
    /// A detector that finds `wallet`.
    pub fn new(wallet: Arc<dyn InjectedWallet>) -> Self {
        Self {
            wallet: Some(wallet),
        }
    }

    /// A detector that never finds a wallet.
    pub fn none() -> Self {
        Self { wallet: None }
    }
}

#[async_trait]
impl WalletDetector for StaticDetector {
    async fn detect(&self) -> Option<Arc<dyn InjectedWallet>> {
        self.wallet.clone()
    }
}

/// Adapts an injected wallet into a request-capable transport.
pub struct WalletTransport {
    wallet: Arc<dyn InjectedWallet>,
}

impl WalletTransport {
    pub fn new(wallet: Arc<dyn InjectedWallet>) -> Self {
        Self { wallet }
    }
}

#[async_trait]
impl RpcTransport for WalletTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.wallet.request(method, params).await
    }
}

/// A decoded wallet event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(Network),
    Connect,
    Disconnect,
}

impl WalletEvent {
    /// Decodes a raw event payload.
    ///
    /// Never fails on malformed payloads: unparseable chain ids become
    /// [`Network::Unknown`] and entries that are not addresses are dropped.
    /// Returns `None` only for event names the manager does not handle.
    pub fn from_payload(event: &str, payload: &Value) -> Option<Self> {
        match event {
            events::ACCOUNTS_CHANGED => {
                let accounts = payload
                    .as_array()
                    .map(|list| {
                        list.iter()
                            .filter_map(Value::as_str)
                            .filter_map(|a| a.parse::<Address>().ok())
                            .collect()
                    })
                    .unwrap_or_default();
                Some(Self::AccountsChanged(accounts))
            }
            events::CHAIN_CHANGED => {
                Some(Self::ChainChanged(Network::from_chain_id_value(payload)))
            }
            events::CONNECT => Some(Self::Connect),
            events::DISCONNECT => Some(Self::Disconnect),
            _ => None,
        }
    }
}
