//! Mock RPC transport for testing.
//!
//! Answers requests from a table of canned results keyed by method name.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::RpcTransport;
use crate::error::{Result, WordleishError};

#[derive(Debug, Clone)]
enum Canned {
    Result(Value),
    Error(i64, String),
}

/// Mock transport that returns predefined results and records every call.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: HashMap<String, Canned>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    /// Creates a mock with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `method` with `result`.
    pub fn with_response(mut self, method: impl Into<String>, result: Value) -> Self {
        self.responses.insert(method.into(), Canned::Result(result));
        self
    }

    /// Answers `method` with a JSON-RPC error.
    pub fn with_error(
        mut self,
        method: impl Into<String>,
        code: i64,
        message: impl Into<String>,
    ) -> Self {
        self.responses
            .insert(method.into(), Canned::Error(code, message.into()));
        self
    }

    /// Returns every recorded call in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the params of calls made with `method`.
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((method.to_string(), params));

        match self.responses.get(method) {
            Some(Canned::Result(value)) => Ok(value.clone()),
            Some(Canned::Error(code, message)) => Err(WordleishError::rpc(*code, message.clone())),
            None => Err(WordleishError::rpc(
                -32601,
                format!("the method {} does not exist/is not available", method),
            )),
        }
    }
}
