//! Configuration management for Wordleish.
//!
//! Handles loading configuration from TOML files and environment variables:
//! the default network, per-network RPC and contract overrides, and the
//! node-backed wallet used by the command line.

use crate::error::{Result, WordleishError};
use crate::network::Network;
use crate::rpc::DEFAULT_TIMEOUT_SECS;
use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Contract address on every network except Sapphire testnet.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("dE5DAB93f9008D4A2A746EB4e3903bF835D8c7D4");

/// Contract address on Sapphire testnet.
pub const SAPPHIRE_TESTNET_CONTRACT_ADDRESS: Address =
    address!("40b81e081b1aF09875a07376bdAD27507774e9a3");

/// Main configuration structure for Wordleish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network the read-only provider points at before a wallet connects.
    #[serde(default = "default_network")]
    pub default_network: Network,

    /// RPC URL overrides, keyed by network slug.
    #[serde(default)]
    pub rpc: HashMap<String, String>,

    /// Contract address overrides, keyed by network slug.
    #[serde(default)]
    pub contracts: HashMap<String, String>,

    /// Node-backed wallet settings.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Path to a JSON word list.
    #[serde(default)]
    pub dictionary: Option<PathBuf>,

    /// Timeout for HTTP RPC requests.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

/// Wallet configuration for the command line.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint with unlocked accounts, or the gateway a local key relays through.
    pub url: Option<String>,

    /// Account to use instead of the node's first account.
    pub account: Option<String>,

    /// Hex private key; when set, transactions are signed locally.
    #[serde(default, skip_serializing)]
    pub private_key: Option<String>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("url", &self.url)
            .field("account", &self.account)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_network() -> Network {
    Network::SapphireMainnet
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_network: default_network(),
            rpc: HashMap::new(),
            contracts: HashMap::new(),
            wallet: WalletConfig::default(),
            dictionary: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordleish")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| WordleishError::config(format!("Failed to read config file: {e}")))?;

        let config = Self::parse_toml(&content, path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            WordleishError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Checks that override keys name known networks and URLs parse.
    pub fn validate(&self) -> Result<()> {
        for (key, url) in &self.rpc {
            parse_network_key(key)?;
            Url::parse(url)
                .map_err(|e| WordleishError::config(format!("Invalid RPC URL for {key}: {e}")))?;
        }
        for (key, address) in &self.contracts {
            parse_network_key(key)?;
            parse_address(address, &format!("contract address for {key}"))?;
        }
        if let Some(url) = &self.wallet.url {
            Url::parse(url)
                .map_err(|e| WordleishError::config(format!("Invalid wallet URL: {e}")))?;
        }
        self.account()?;
        Ok(())
    }

    /// Applies `WORDLEISH_*` environment variables over file values.
    pub fn apply_env_defaults(&mut self) -> Result<()> {
        if let Ok(network) = std::env::var("WORDLEISH_NETWORK") {
            self.default_network = network.parse().map_err(WordleishError::config)?;
        }
        if let Ok(url) = std::env::var("WORDLEISH_WALLET_URL") {
            self.wallet.url = Some(url);
        }
        if let Ok(account) = std::env::var("WORDLEISH_ACCOUNT") {
            self.wallet.account = Some(account);
        }
        if let Ok(key) = std::env::var("WORDLEISH_PRIVATE_KEY") {
            self.wallet.private_key = Some(key);
        }
        Ok(())
    }

    /// RPC URL for `network`: the configured override, else the public endpoint.
    pub fn rpc_url(&self, network: Network) -> Option<String> {
        self.lookup(&self.rpc, network)
            .or_else(|| network.default_rpc_url().map(String::from))
    }

    /// Wordleish contract address on `network`.
    pub fn contract_address(&self, network: Network) -> Result<Address> {
        match self.lookup(&self.contracts, network) {
            Some(address) => parse_address(&address, &format!("contract address for {network}")),
            None if network == Network::SapphireTestnet => Ok(SAPPHIRE_TESTNET_CONTRACT_ADDRESS),
            None => Ok(DEFAULT_CONTRACT_ADDRESS),
        }
    }

    /// Account override for the node-backed wallet.
    pub fn account(&self) -> Result<Option<Address>> {
        self.wallet
            .account
            .as_deref()
            .map(|account| parse_address(account, "wallet account"))
            .transpose()
    }

    /// Endpoint of the node-backed wallet: explicit setting, else the default network's RPC.
    pub fn wallet_url(&self) -> Option<String> {
        self.wallet
            .url
            .clone()
            .or_else(|| self.rpc_url(self.default_network))
    }

    fn lookup(&self, table: &HashMap<String, String>, network: Network) -> Option<String> {
        table
            .iter()
            .find(|(key, _)| key.parse::<Network>().ok() == Some(network))
            .map(|(_, value)| value.clone())
    }
}

fn parse_address(value: &str, what: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| WordleishError::config(format!("Invalid {what} {value:?}: {e}")))
}

fn parse_network_key(key: &str) -> Result<Network> {
    key.parse::<Network>()
        .map_err(|e| WordleishError::config(format!("{e} in config table key")))
}
