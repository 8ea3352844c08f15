//! Node-backed wallet.
//!
//! Serves the injected-wallet surface from a JSON-RPC node that manages
//! its own unlocked accounts (a local Hardhat node, for instance). It
//! never identifies as MetaMask and never emits events.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{EventHandler, InjectedWallet};
use crate::error::Result;
use crate::rpc::{HttpTransport, RpcTransport};

/// Wallet backed by a node's JSON-RPC endpoint.
pub struct HttpWallet {
    transport: HttpTransport,
    account: Option<Address>,
}

impl HttpWallet {
    /// Creates a wallet over the given transport.
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            account: None,
        }
    }

    /// Pins the wallet to a single account instead of the node's first.
    pub fn with_account(mut self, account: Address) -> Self {
        self.account = Some(account);
        self
    }
}

#[async_trait]
impl InjectedWallet for HttpWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => match &self.account {
                Some(account) => Ok(json!([account])),
                None => self.transport.request("eth_accounts", json!([])).await,
            },
            _ => self.transport.request(method, params).await,
        }
    }

    fn on(&self, event: &str, _handler: EventHandler) {
        debug!(event, url = %self.transport.url(), "Node-backed wallet does not emit events");
    }

    fn is_metamask(&self) -> bool {
        false
    }
}
