//! Command-line argument parsing for Wordleish.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wordleish::config::Config;
use wordleish::network::Network;

/// Play Wordleish from the terminal.
#[derive(Parser, Debug)]
#[command(name = "wordleish")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Network to read from before the wallet connects (e.g. sapphire-testnet)
    #[arg(short = 'n', long, value_name = "NETWORK")]
    pub network: Option<Network>,

    /// JSON-RPC endpoint of the node-backed wallet
    #[arg(short = 'w', long, value_name = "URL")]
    pub wallet_url: Option<String>,

    /// Account to sign with instead of the node's first account
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    pub account: Option<String>,

    /// JSON word list used to validate guesses
    #[arg(long, value_name = "PATH")]
    pub dictionary: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List supported networks
    Networks,
    /// Connect the wallet and show the connection state
    Status,
    /// Ask the wallet to switch networks
    Switch {
        /// Target network
        network: Network,
    },
    /// Start a new game with a secret word
    Start {
        /// Five-letter secret word
        word: String,
    },
    /// Check a guess against a game without submitting it
    Guess {
        /// Game id (zero-based)
        game: u64,
        /// Five-letter guess
        word: String,
    },
    /// Play a game interactively
    Play {
        /// Game id (zero-based); prompts when omitted
        #[arg(short, long)]
        game: Option<u64>,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies command-line overrides (highest precedence) to the loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(network) = self.network {
            config.default_network = network;
        }
        if let Some(url) = &self.wallet_url {
            config.wallet.url = Some(url.clone());
        }
        if let Some(account) = &self.account {
            config.wallet.account = Some(account.clone());
        }
        if let Some(path) = &self.dictionary {
            config.dictionary = Some(path.clone());
        }
    }
}
