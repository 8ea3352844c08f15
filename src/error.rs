//! Error types for Wordleish.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// EIP-1193 / MetaMask code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// MetaMask code for "unrecognized chain id" on `wallet_switchEthereumChain`.
pub const CHAIN_NOT_ADDED_CODE: i64 = 4902;

/// Main error type for Wordleish operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordleishError {
    /// No injected wallet could be discovered.
    #[error("no provider detected")]
    NoProviderDetected,

    /// A JSON-RPC error object returned by a wallet or node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Transport-level failures (connection refused, malformed response, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Contract reverts and malformed contract return data.
    #[error("Contract error: {0}")]
    Contract(String),

    /// Local key parsing and transaction signing failures.
    #[error("Signer error: {0}")]
    Signer(String),

    /// Configuration errors (invalid config file, bad network name, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WordleishError {
    /// Creates an RPC error from a JSON-RPC error code and message.
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a contract error with the given message.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    /// Creates a signer error with the given message.
    pub fn signer(msg: impl Into<String>) -> Self {
        Self::Signer(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the RPC error code, if this is an RPC error.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the wallet does not know the requested chain.
    pub fn is_chain_not_added(&self) -> bool {
        self.rpc_code() == Some(CHAIN_NOT_ADDED_CODE)
    }

    /// True when the user declined the wallet prompt.
    pub fn is_user_rejected(&self) -> bool {
        self.rpc_code() == Some(USER_REJECTED_CODE)
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NoProviderDetected => "Wallet Error",
            Self::Rpc { .. } => "RPC Error",
            Self::Transport(_) => "Transport Error",
            Self::Contract(_) => "Contract Error",
            Self::Signer(_) => "Signer Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using WordleishError.
pub type Result<T> = std::result::Result<T, WordleishError>;
