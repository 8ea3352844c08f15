//! Wordleish contract client.
//!
//! The contract is a black box reached over RPC: `startGame(word)` allocates
//! a game, `guess(gameId, word)` returns a letter mask. Words travel packed
//! into the high bytes of a `uint256`.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolEvent};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, WordleishError};
use crate::network::Network;
use crate::provider::{contract_call, Provider, Signer};

sol! {
    function startGame(uint256 word);
    function guess(uint256 gameId, uint256 word) returns (uint256 mask);
    function nextGameId() returns (uint256);

    event GameStarted(uint256 gameId);
    event GameSolved(uint256 gameId);
}

/// Same events for deployments that index the game id.
pub mod indexed {
    alloy_sol_types::sol! {
        event GameStarted(uint256 indexed gameId);
        event GameSolved(uint256 indexed gameId);
    }
}

/// Letters per word.
pub const WORD_LENGTH: usize = 5;

/// Revert reasons the contract emits for malformed words.
const REVERT_REASONS: [&str; 2] = ["wrong word length", "found invalid letter"];

/// How one guessed letter relates to the secret word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LetterMatch {
    Missing = 0,
    Present = 1,
    Correct = 2,
}

impl TryFrom<u8> for LetterMatch {
    type Error = WordleishError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Missing),
            1 => Ok(Self::Present),
            2 => Ok(Self::Correct),
            other => Err(WordleishError::contract(format!(
                "invalid letter match value {other}"
            ))),
        }
    }
}

impl fmt::Display for LetterMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::Present => "present",
            Self::Correct => "correct",
        };
        write!(f, "{s}")
    }
}

/// Packs a word into the high bytes of a `uint256`.
///
/// The word is lower-cased; anything past 32 bytes is dropped.
pub fn pack_word(word: &str) -> U256 {
    let mut packed = [0u8; 32];
    let lower = word.to_lowercase();
    let bytes = lower.as_bytes();
    let len = bytes.len().min(packed.len());
    packed[..len].copy_from_slice(&bytes[..len]);
    U256::from_be_bytes(packed)
}

/// Reads the five letter matches from the high bytes of a mask.
pub fn unpack_mask(mask: U256) -> Result<[LetterMatch; WORD_LENGTH]> {
    let bytes = mask.to_be_bytes::<32>();
    let mut matches = [LetterMatch::Missing; WORD_LENGTH];
    for (slot, byte) in matches.iter_mut().zip(bytes) {
        *slot = LetterMatch::try_from(byte)?;
    }
    Ok(matches)
}

/// True when every letter is in the correct position.
pub fn is_solved(matches: &[LetterMatch]) -> bool {
    !matches.is_empty() && matches.iter().all(|m| *m == LetterMatch::Correct)
}

fn to_game_id(value: U256) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| WordleishError::contract(format!("game id {value} does not fit in 64 bits")))
}

#[derive(Deserialize)]
struct ReceiptLogs {
    #[serde(default)]
    logs: Vec<Value>,
}

#[derive(Deserialize)]
struct RawLog {
    topics: Vec<B256>,
    #[serde(default)]
    data: Bytes,
}

impl RawLog {
    fn started_game_id(&self) -> Option<U256> {
        if self.topics.first() != Some(&GameStarted::SIGNATURE_HASH) {
            return None;
        }
        let topics = self.topics.iter().copied();
        if self.topics.len() > 1 {
            indexed::GameStarted::decode_raw_log(topics, &self.data, true)
                .ok()
                .map(|event| event.gameId)
        } else {
            GameStarted::decode_raw_log(topics, &self.data, true)
                .ok()
                .map(|event| event.gameId)
        }
    }
}

/// Extracts the game id from the first `GameStarted` log in a receipt.
///
/// Logs that do not decode are skipped.
pub fn game_id_from_receipt(receipt: &Value) -> Option<u64> {
    let receipt: ReceiptLogs = serde_json::from_value(receipt.clone()).ok()?;
    receipt.logs.into_iter().find_map(|log| {
        let log: RawLog = serde_json::from_value(log).ok()?;
        to_game_id(log.started_game_id()?).ok()
    })
}

/// Turns a wrapped revert reason into a contract error.
fn map_revert(err: WordleishError) -> WordleishError {
    if let WordleishError::Rpc { message, .. } = &err {
        if let Some(reason) = REVERT_REASONS.iter().find(|r| message.contains(*r)) {
            return WordleishError::contract(*reason);
        }
    }
    err
}

/// Client for one deployment of the Wordleish contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wordleish {
    address: Address,
}

impl Wordleish {
    /// Client for the contract at `address`.
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Client for the deployment configured for `network`.
    pub fn for_network(config: &Config, network: Network) -> Result<Self> {
        Ok(Self::new(config.contract_address(network)?))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, provider: &Provider, call: &C) -> Result<C::Return> {
        let tx = contract_call(self.address, call.abi_encode());
        let data = provider.call(&tx).await.map_err(map_revert)?;
        C::abi_decode_returns(&data, true).map_err(|e| {
            WordleishError::contract(format!("Failed to decode {} result: {e}", C::SIGNATURE))
        })
    }

    async fn write<C: SolCall>(&self, signer: &Signer, call: &C) -> Result<B256> {
        let tx = contract_call(self.address, call.abi_encode());
        signer.send_transaction(tx).await.map_err(map_revert)
    }

    /// Number of games started so far.
    pub async fn next_game_id(&self, provider: &Provider) -> Result<u64> {
        let next = self.read(provider, &nextGameIdCall {}).await?;
        to_game_id(next._0)
    }

    /// Evaluates a guess without submitting it.
    pub async fn check_guess(
        &self,
        provider: &Provider,
        game_id: u64,
        word: &str,
    ) -> Result<[LetterMatch; WORD_LENGTH]> {
        let call = guessCall {
            gameId: U256::from(game_id),
            word: pack_word(word),
        };
        let result = self.read(provider, &call).await?;
        let matches = unpack_mask(result.mask)?;
        debug!(game_id, word, ?matches, "Checked guess");
        Ok(matches)
    }

    /// Starts a new game with `word` as the secret; returns the transaction hash.
    pub async fn start_game(&self, signer: &Signer, word: &str) -> Result<B256> {
        let call = startGameCall {
            word: pack_word(word),
        };
        let hash = self.write(signer, &call).await?;
        info!(tx = %hash, "Submitted startGame");
        Ok(hash)
    }

    /// Submits a guess as a transaction; returns the transaction hash.
    pub async fn submit_guess(&self, signer: &Signer, game_id: u64, word: &str) -> Result<B256> {
        let call = guessCall {
            gameId: U256::from(game_id),
            word: pack_word(word),
        };
        let hash = self.write(signer, &call).await?;
        info!(tx = %hash, game_id, "Submitted guess");
        Ok(hash)
    }

    /// Polls for the receipt of a `startGame` transaction and returns the new game id.
    ///
    /// Returns `None` if the receipt has not appeared after `attempts` polls.
    pub async fn started_game_id(
        &self,
        provider: &Provider,
        tx_hash: B256,
        attempts: u32,
        interval: Duration,
    ) -> Result<Option<u64>> {
        for attempt in 0..attempts {
            if let Some(receipt) = provider.transaction_receipt(tx_hash).await? {
                return match game_id_from_receipt(&receipt) {
                    Some(id) => Ok(Some(id)),
                    None => Err(WordleishError::contract(
                        "transaction did not emit GameStarted",
                    )),
                };
            }
            if attempt + 1 < attempts {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(None)
    }
}
