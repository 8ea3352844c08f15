//! Local-key wallet.
//!
//! Holds a private key in process, signs transactions itself and submits
//! them with `eth_sendRawTransaction`. This lets the CLI play against a
//! public gateway that has no unlocked accounts. Like the node-backed
//! wallet it never identifies as MetaMask and never emits events.

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, TxKind, U128, U64};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::{EventHandler, InjectedWallet};
use crate::error::{Result, WordleishError};
use crate::network::parse_chain_id;
use crate::provider::decode_result;
use crate::rpc::RpcTransport;

/// Wallet that signs with a private key and relays through a JSON-RPC endpoint.
pub struct LocalKeyWallet {
    transport: Arc<dyn RpcTransport>,
    signer: PrivateKeySigner,
}

impl LocalKeyWallet {
    pub fn new(transport: Arc<dyn RpcTransport>, signer: PrivateKeySigner) -> Self {
        Self { transport, signer }
    }

    /// Parses a hex private key, with or without the `0x` prefix.
    pub fn from_private_key(transport: Arc<dyn RpcTransport>, key: &str) -> Result<Self> {
        let signer = key
            .trim()
            .trim_start_matches("0x")
            .parse::<PrivateKeySigner>()
            .map_err(|e| WordleishError::signer(format!("Invalid private key: {e}")))?;
        Ok(Self::new(transport, signer))
    }

    /// The account the key controls.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    async fn chain_id(&self) -> Result<u64> {
        let value = self.transport.request("eth_chainId", json!([])).await?;
        parse_chain_id(&value)
            .ok_or_else(|| WordleishError::transport(format!("eth_chainId returned {value}")))
    }

    async fn quantity(&self, method: &str, params: Value) -> Result<u64> {
        let value = self.transport.request(method, params).await?;
        let quantity: U64 = decode_result(method, value)?;
        Ok(quantity.to::<u64>())
    }

    async fn gas_price(&self) -> Result<u128> {
        let value = self.transport.request("eth_gasPrice", json!([])).await?;
        let price: U128 = decode_result("eth_gasPrice", value)?;
        Ok(price.to::<u128>())
    }

    /// Fills in the missing fields, signs, and relays the transaction.
    async fn send_transaction(&self, params: &Value) -> Result<Value> {
        let request = params
            .get(0)
            .cloned()
            .ok_or_else(|| WordleishError::rpc(-32602, "missing transaction"))?;
        let mut request: TransactionRequest = serde_json::from_value(request)
            .map_err(|e| WordleishError::rpc(-32602, format!("Invalid transaction: {e}")))?;

        let from = self.address();
        match request.from {
            Some(requested) if requested != from => {
                return Err(WordleishError::rpc(
                    4100,
                    format!("{requested} is not the local account"),
                ));
            }
            _ => request.from = Some(from),
        }

        let chain_id = match request.chain_id {
            Some(id) => id,
            None => self.chain_id().await?,
        };
        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => {
                self.quantity("eth_getTransactionCount", json!([from, "pending"]))
                    .await?
            }
        };
        let gas_price = match request.gas_price {
            Some(price) => price,
            None => self.gas_price().await?,
        };
        let gas_limit = match request.gas {
            Some(gas) => gas,
            None => self.quantity("eth_estimateGas", json!([&request])).await?,
        };

        let tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit,
            to: request.to.unwrap_or(TxKind::Create),
            value: request.value.unwrap_or_default(),
            input: request.input.input().cloned().unwrap_or_default(),
        };
        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| WordleishError::signer(format!("Failed to sign transaction: {e}")))?;
        let raw = Bytes::from(TxEnvelope::Legacy(tx.into_signed(signature)).encoded_2718());

        info!(%from, chain_id, nonce, gas_limit, "Relaying locally signed transaction");
        self.transport
            .request("eth_sendRawTransaction", json!([raw]))
            .await
    }
}

#[async_trait]
impl InjectedWallet for LocalKeyWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!([self.address()])),
            "eth_sendTransaction" => self.send_transaction(&params).await,
            _ => self.transport.request(method, params).await,
        }
    }

    fn on(&self, event: &str, _handler: EventHandler) {
        debug!(event, "Local-key wallet does not emit events");
    }

    fn is_metamask(&self) -> bool {
        false
    }
}
