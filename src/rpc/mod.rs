//! JSON-RPC plumbing for Wordleish.
//!
//! Provides a trait-based transport so that node endpoints, injected
//! wallets and test doubles can be used interchangeably behind providers
//! and signers. Envelopes are the `alloy-json-rpc` types.

mod http;
mod mock;

pub use http::{HttpTransport, HttpTransportConfig, DEFAULT_TIMEOUT_SECS};
pub use mock::MockTransport;

use alloy_json_rpc::{ErrorPayload, Id, Request, Response, ResponsePayload};
use alloy_primitives::Bytes;
use alloy_sol_types::{Revert, SolError};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, WordleishError};

/// Trait for anything that can answer JSON-RPC requests.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Sends a single request and returns its `result` value.
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Builds a JSON-RPC 2.0 request.
pub fn build_request(id: u64, method: &str, params: Value) -> Request<Value> {
    Request::new(method.to_string(), Id::Number(id), params)
}

/// Extracts the result of a response, turning an error object into `WordleishError::Rpc`.
pub fn into_result(response: Response<Value, Value>) -> Result<Value> {
    match response.payload {
        ResponsePayload::Success(result) => Ok(result),
        ResponsePayload::Failure(error) => Err(rpc_error(error)),
    }
}

/// Converts an error object into the crate error.
///
/// Revert data, either a plain reason or an ABI-encoded `Error(string)`,
/// is folded into the message.
pub fn rpc_error(error: ErrorPayload<Value>) -> WordleishError {
    let message = error.message.to_string();
    let reason = match &error.data {
        Some(Value::String(data)) => Some(revert_reason(data)),
        _ => None,
    };
    match reason {
        Some(reason) if !message.contains(&reason) => {
            WordleishError::rpc(error.code, format!("{message} ({reason})"))
        }
        _ => WordleishError::rpc(error.code, message),
    }
}

fn revert_reason(data: &str) -> String {
    data.parse::<Bytes>()
        .ok()
        .and_then(|bytes| Revert::abi_decode(&bytes, true).ok())
        .map(|revert| revert.reason)
        .unwrap_or_else(|| data.to_string())
}
