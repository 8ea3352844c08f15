//! Provider and signer handles.
//!
//! A [`Provider`] makes read-only calls against a network; a [`Signer`]
//! authorizes and submits transactions on behalf of one account. Both are
//! cheap to clone and carry the network they were derived for, plus a
//! [`Wrapping`] marker recording whether confidentiality middleware has been
//! applied.

use alloy_primitives::{Address, Bytes, TxKind, B256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, WordleishError};
use crate::network::Network;
use crate::rpc::RpcTransport;

/// Whether a handle goes through confidentiality middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrapping {
    #[default]
    Plain,
    Confidential,
}

/// Builds a transaction request that calls `to` with `data`.
pub fn contract_call(to: Address, data: impl Into<Bytes>) -> TransactionRequest {
    TransactionRequest {
        to: Some(TxKind::Call(to)),
        input: TransactionInput::new(data.into()),
        ..Default::default()
    }
}

/// Decodes an RPC result into a typed value.
pub(crate) fn decode_result<T: DeserializeOwned>(method: &str, result: Value) -> Result<T> {
    serde_json::from_value(result.clone())
        .map_err(|e| WordleishError::transport(format!("{method} returned {result}: {e}")))
}

/// Read-only RPC handle.
#[derive(Clone)]
pub struct Provider {
    transport: Arc<dyn RpcTransport>,
    network: Network,
    wrapping: Wrapping,
}

impl Provider {
    /// Creates an unwrapped provider that has not been bound to a network yet.
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            network: Network::Unknown,
            wrapping: Wrapping::Plain,
        }
    }

    /// Returns an unwrapped copy bound to `network`.
    pub fn on_network(&self, network: Network) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            network,
            wrapping: Wrapping::Plain,
        }
    }

    /// Sets the wrapping marker.
    pub fn with_wrapping(mut self, wrapping: Wrapping) -> Self {
        self.wrapping = wrapping;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn wrapping(&self) -> Wrapping {
        self.wrapping
    }

    pub fn is_confidential(&self) -> bool {
        self.wrapping == Wrapping::Confidential
    }

    /// Returns a signer sharing this provider's transport.
    pub fn get_signer(&self) -> Signer {
        Signer {
            transport: Arc::clone(&self.transport),
            network: self.network,
            wrapping: self.wrapping,
            address: None,
        }
    }

    /// Sends a raw JSON-RPC request.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.transport.request(method, params).await
    }

    /// Asks the endpoint which network it serves.
    pub async fn fetch_network(&self) -> Result<Network> {
        let value = self.request("eth_chainId", json!([])).await?;
        Ok(Network::from_chain_id_value(&value))
    }

    /// Executes a read-only `eth_call` and returns the raw return data.
    pub async fn call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        let result = self.request("eth_call", json!([tx, "latest"])).await?;
        decode_result("eth_call", result)
    }

    /// Fetches a transaction receipt, `None` while the transaction is pending.
    pub async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<Value>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        Ok((!result.is_null()).then_some(result))
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("network", &self.network)
            .field("wrapping", &self.wrapping)
            .finish_non_exhaustive()
    }
}

/// Transaction-authorizing handle.
#[derive(Clone)]
pub struct Signer {
    transport: Arc<dyn RpcTransport>,
    network: Network,
    wrapping: Wrapping,
    address: Option<Address>,
}

impl Signer {
    /// Returns an unwrapped copy bound to `network`.
    pub fn on_network(&self, network: Network) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            network,
            wrapping: Wrapping::Plain,
            address: self.address,
        }
    }

    /// Returns a copy that signs as `address`.
    pub fn with_address(&self, address: Address) -> Self {
        Self {
            address: Some(address),
            ..self.clone()
        }
    }

    /// Sets the wrapping marker.
    pub fn with_wrapping(mut self, wrapping: Wrapping) -> Self {
        self.wrapping = wrapping;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn wrapping(&self) -> Wrapping {
        self.wrapping
    }

    pub fn is_confidential(&self) -> bool {
        self.wrapping == Wrapping::Confidential
    }

    /// The account this signer is bound to, if known.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Asks the wallet for the active account.
    pub async fn fetch_address(&self) -> Result<Address> {
        let result = self.transport.request("eth_accounts", json!([])).await?;
        let accounts: Vec<Address> = decode_result("eth_accounts", result)?;
        accounts
            .first()
            .copied()
            .ok_or_else(|| WordleishError::rpc(4100, "wallet returned no accounts"))
    }

    /// Asks the wallet which network it is on.
    pub async fn fetch_network(&self) -> Result<Network> {
        let value = self.transport.request("eth_chainId", json!([])).await?;
        Ok(Network::from_chain_id_value(&value))
    }

    /// Submits a transaction and returns its hash.
    pub async fn send_transaction(&self, mut tx: TransactionRequest) -> Result<B256> {
        if tx.from.is_none() {
            tx.from = match self.address {
                Some(address) => Some(address),
                None => Some(self.fetch_address().await?),
            };
        }
        debug!(network = %self.network, to = ?tx.to, "Submitting transaction");

        let result = self
            .transport
            .request("eth_sendTransaction", json!([tx]))
            .await?;
        decode_result("eth_sendTransaction", result)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("network", &self.network)
            .field("wrapping", &self.wrapping)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
