//! Network identifiers and connection status.
//!
//! Maps numeric chain ids onto the closed set of networks the game is
//! deployed to, and carries the per-network metadata needed to ask a
//! wallet to switch to (or register) a chain.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Networks the game knows about.
///
/// Any chain id outside this set normalizes to [`Network::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    Unknown,
    EmeraldTestnet,
    EmeraldMainnet,
    SapphireTestnet,
    SapphireMainnet,
    Local,
}

impl Network {
    /// All networks with a real chain id.
    pub const KNOWN: [Network; 5] = [
        Network::EmeraldTestnet,
        Network::EmeraldMainnet,
        Network::SapphireTestnet,
        Network::SapphireMainnet,
        Network::Local,
    ];

    /// Returns the numeric chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Unknown => 0,
            Self::EmeraldTestnet => 0xa515,
            Self::EmeraldMainnet => 0xa516,
            Self::SapphireTestnet => 0x5aff,
            Self::SapphireMainnet => 0x5afe,
            Self::Local => 1337,
        }
    }

    /// Returns the chain id in the minimal hex form wallets expect (`0x5aff`).
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id())
    }

    /// Normalizes a numeric chain id.
    pub fn from_chain_id(chain_id: u64) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|n| n.chain_id() == chain_id)
            .unwrap_or(Self::Unknown)
    }

    /// Normalizes a chain id as delivered by a wallet.
    ///
    /// Numbers are taken as-is. Strings are hexadecimal, with or without the
    /// `0x` prefix. Anything else is `Unknown`.
    pub fn from_chain_id_value(value: &Value) -> Self {
        parse_chain_id(value)
            .map(Self::from_chain_id)
            .unwrap_or(Self::Unknown)
    }

    /// Human-readable network name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown Network",
            Self::EmeraldTestnet => "Emerald Testnet",
            Self::EmeraldMainnet => "Emerald Mainnet",
            Self::SapphireTestnet => "Sapphire Testnet",
            Self::SapphireMainnet => "Sapphire Mainnet",
            Self::Local => "Local Network",
        }
    }

    /// Returns the network slug used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::EmeraldTestnet => "emerald-testnet",
            Self::EmeraldMainnet => "emerald-mainnet",
            Self::SapphireTestnet => "sapphire-testnet",
            Self::SapphireMainnet => "sapphire-mainnet",
            Self::Local => "local",
        }
    }

    /// True for the Sapphire family, which needs confidential request/response middleware.
    pub fn is_confidential(&self) -> bool {
        matches!(self, Self::SapphireTestnet | Self::SapphireMainnet)
    }

    /// Public JSON-RPC endpoint for the network.
    pub fn default_rpc_url(&self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::EmeraldTestnet => Some("https://testnet.emerald.oasis.dev"),
            Self::EmeraldMainnet => Some("https://emerald.oasis.dev"),
            Self::SapphireTestnet => Some("https://testnet.sapphire.oasis.dev"),
            Self::SapphireMainnet => Some("https://sapphire.oasis.io"),
            Self::Local => Some("http://127.0.0.1:8545"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.to_lowercase().replace('_', "-");
        if let Some(network) = Self::KNOWN.into_iter().find(|n| n.as_str() == lower) {
            return Ok(network);
        }
        match lower.as_str() {
            "localhost" | "hardhat" => Ok(Self::Local),
            _ => match parse_chain_id_str(&lower).map(Self::from_chain_id) {
                Some(network) if network != Self::Unknown => Ok(network),
                _ => Err(format!("Unknown network: {}", s)),
            },
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parses a wallet-delivered chain id (number or hex string).
pub fn parse_chain_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_chain_id_str(s),
        _ => None,
    }
}

fn parse_chain_id_str(s: &str) -> Option<u64> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16).ok()
}

/// Connection status as reported by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Disconnected,
    Connected,
}

impl ConnectionStatus {
    /// Returns the status as a display string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters for `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
}

impl AddChainParams {
    /// Builds registration parameters for a network and RPC endpoint.
    pub fn new(network: Network, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id: network.chain_id_hex(),
            chain_name: network.name().to_string(),
            rpc_urls: vec![rpc_url.into()],
        }
    }
}
