//! HTTP JSON-RPC transport.
//!
//! Implements the RpcTransport trait over a plain JSON-RPC 2.0 endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

use alloy_json_rpc::Response;

use super::{build_request, into_result, RpcTransport};
use crate::error::{Result, WordleishError};

/// Default timeout for RPC requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Endpoint URL.
    pub url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpTransportConfig {
    /// Creates a config for the given endpoint.
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| WordleishError::config(format!("Invalid RPC URL '{url}': {e}")))?;
        Ok(Self {
            url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// JSON-RPC client for a single HTTP endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Creates a new transport with the given configuration.
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                WordleishError::transport(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &Url {
        &self.config.url
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = build_request(id, method, params);
        debug!(url = %self.config.url, method, id, "Sending RPC request");

        let response = self
            .client
            .post(self.config.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                WordleishError::transport(format!("Request to {} failed: {}", self.config.url, e))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WordleishError::transport(format!("Failed to read response: {}", e)))?;

        // Nodes report JSON-RPC errors with 200 and sometimes with 4xx/5xx; try the body first.
        match serde_json::from_str::<Response<Value, Value>>(&text) {
            Ok(parsed) => into_result(parsed),
            Err(_) if !status.is_success() => Err(WordleishError::transport(format!(
                "RPC endpoint returned {}: {}",
                status, text
            ))),
            Err(e) => Err(WordleishError::transport(format!(
                "Failed to parse RPC response: {}",
                e
            ))),
        }
    }
}
