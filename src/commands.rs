//! Subcommand handlers.

use crossterm::style::Stylize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::cli::Command;
use wordleish::config::Config;
use wordleish::connection::{ConnectionManager, Registration};
use wordleish::contract::{is_solved, LetterMatch, Wordleish, WORD_LENGTH};
use wordleish::dictionary::Dictionary;
use wordleish::error::{Result, WordleishError};
use wordleish::network::Network;
use wordleish::provider::Signer;
use wordleish::rpc::{HttpTransport, HttpTransportConfig};
use wordleish::wallet::{HttpWallet, LocalKeyWallet, StaticDetector, WalletDetector};

const RECEIPT_ATTEMPTS: u32 = 30;
const RECEIPT_INTERVAL: Duration = Duration::from_secs(2);

type InputLines = Lines<BufReader<Stdin>>;

/// Runs a subcommand against the configured wallet and network.
pub async fn dispatch(command: &Command, config: &Config) -> Result<()> {
    if *command == Command::Networks {
        print_networks(config);
        return Ok(());
    }

    let manager = ConnectionManager::from_config(config, build_detector(config)?)?;
    match command {
        Command::Networks => Ok(()),
        Command::Status => status(&manager).await,
        Command::Switch { network } => switch(&manager, *network).await,
        Command::Start { word } => start(&manager, config, word).await,
        Command::Guess { game, word } => guess(&manager, config, *game, word).await,
        Command::Play { game } => play(&manager, config, *game).await,
    }
}

/// Picks the wallet: a local key first, then an explicitly configured node.
fn build_detector(config: &Config) -> Result<Arc<dyn WalletDetector>> {
    let transport = |url: &str| {
        HttpTransport::new(HttpTransportConfig::new(url)?.with_timeout(config.request_timeout_secs))
    };

    if let Some(key) = &config.wallet.private_key {
        let url = config.wallet_url().ok_or_else(|| {
            WordleishError::config(format!(
                "No RPC URL to relay signed transactions on {}",
                config.default_network
            ))
        })?;
        let wallet = LocalKeyWallet::from_private_key(Arc::new(transport(&url)?), key)?;
        info!(address = %wallet.address(), %url, "Signing with local key");
        return Ok(Arc::new(StaticDetector::new(Arc::new(wallet))));
    }

    let Some(url) = &config.wallet.url else {
        warn!("No wallet configured; set WORDLEISH_PRIVATE_KEY or WORDLEISH_WALLET_URL");
        return Ok(Arc::new(StaticDetector::none()));
    };
    let mut wallet = HttpWallet::new(transport(url)?);
    if let Some(account) = config.account()? {
        wallet = wallet.with_account(account);
    }
    Ok(Arc::new(StaticDetector::new(Arc::new(wallet))))
}

fn print_networks(config: &Config) {
    for network in Network::KNOWN {
        let marker = if network == config.default_network { "*" } else { " " };
        println!(
            "{} {:<18} {:>6}  {:<8} {}",
            marker,
            network.as_str(),
            network.chain_id(),
            if network.is_confidential() { "private" } else { "public" },
            config.rpc_url(network).unwrap_or_default()
        );
    }
}

async fn status(manager: &ConnectionManager) -> Result<()> {
    manager.connect().await?;
    let state = manager.state();
    println!("Network:  {} ({})", state.network, state.network.chain_id_hex());
    println!("Status:   {}", state.status);
    match state.address {
        Some(address) => println!("Address:  {}", address),
        None => println!("Address:  -"),
    }
    println!(
        "Wrapping: {}",
        if state.provider.is_confidential() { "confidential" } else { "plain" }
    );
    Ok(())
}

async fn switch(manager: &ConnectionManager, network: Network) -> Result<()> {
    manager.connect().await?;
    match manager.try_switch_network(network).await {
        Ok(()) => {
            println!("Requested switch to {}", network);
            Ok(())
        }
        Err(failure) => {
            match failure.registration {
                Registration::Registered => {
                    println!("{} was registered with the wallet; run the switch again", network)
                }
                Registration::Failed => {
                    println!("The wallet does not know {} and refused to add it", network)
                }
                Registration::NotAttempted => {}
            }
            Err(failure.error)
        }
    }
}

async fn connected_signer(manager: &ConnectionManager) -> Result<Signer> {
    manager.connect().await?;
    manager
        .signer()
        .ok_or_else(|| WordleishError::internal("wallet connected without an account"))
}

async fn start(manager: &ConnectionManager, config: &Config, word: &str) -> Result<()> {
    check_length(word)?;
    let signer = connected_signer(manager).await?;
    let contract = Wordleish::for_network(config, manager.network())?;

    let hash = contract.start_game(&signer, &word.to_lowercase()).await?;
    println!("Submitted {}", hash);

    match contract
        .started_game_id(&manager.provider(), hash, RECEIPT_ATTEMPTS, RECEIPT_INTERVAL)
        .await?
    {
        Some(id) => println!("Started game {} (puzzle #{})", id, id + 1),
        None => println!("Transaction not mined yet; check the game list later"),
    }
    Ok(())
}

async fn guess(manager: &ConnectionManager, config: &Config, game: u64, word: &str) -> Result<()> {
    check_length(word)?;
    let provider = manager.provider();
    let contract = Wordleish::for_network(config, provider.network())?;
    let word = word.to_lowercase();
    let matches = contract.check_guess(&provider, game, &word).await?;
    println!("{}", render_matches(&word, &matches));
    Ok(())
}

async fn play(manager: &ConnectionManager, config: &Config, game: Option<u64>) -> Result<()> {
    manager.connect().await?;
    let provider = manager.provider();
    let contract = Wordleish::for_network(config, manager.network())?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let game_id = match game {
        Some(id) => id,
        None => {
            let count = contract.next_game_id(&provider).await?;
            if count == 0 {
                println!("No games have been started yet");
                return Ok(());
            }
            match prompt_puzzle(&mut lines, count).await? {
                Some(id) => id,
                None => return Ok(()),
            }
        }
    };

    let dictionary = Dictionary::load_best_effort(config.dictionary.as_deref());
    info!(game_id, words = dictionary.len(), "Starting game");

    loop {
        let Some(line) = prompt(&mut lines, "Guess: ").await? else {
            return Ok(());
        };
        let word = line.trim().to_lowercase();
        if word.chars().count() != WORD_LENGTH {
            println!("Guesses are {} letters long", WORD_LENGTH);
            continue;
        }
        if !dictionary.check_best_effort(&word) {
            println!("{} is not in the word list", word);
            continue;
        }

        let matches = match contract.check_guess(&provider, game_id, &word).await {
            Ok(matches) => matches,
            Err(WordleishError::Contract(msg)) => {
                println!("Rejected: {}", msg);
                continue;
            }
            Err(e) => return Err(e),
        };
        println!("{}", render_matches(&word, &matches));

        if is_solved(&matches) {
            let signer = connected_signer(manager).await?;
            let hash = contract.submit_guess(&signer, game_id, &word).await?;
            println!("Solved! Recorded in {}", hash);
            return Ok(());
        }
    }
}

/// Asks for a puzzle number in `1..=count` and returns its game id.
async fn prompt_puzzle(lines: &mut InputLines, count: u64) -> Result<Option<u64>> {
    loop {
        let question = format!("Puzzle number (1-{}): ", count);
        let Some(line) = prompt(lines, &question).await? else {
            return Ok(None);
        };
        match line.trim().parse::<u64>() {
            Ok(nr) if (1..=count).contains(&nr) => return Ok(Some(nr - 1)),
            _ => println!("Pick a number between 1 and {}", count),
        }
    }
}

async fn prompt(lines: &mut InputLines, question: &str) -> Result<Option<String>> {
    print!("{}", question);
    std::io::stdout()
        .flush()
        .map_err(|e| WordleishError::internal(format!("Failed to flush stdout: {e}")))?;
    lines
        .next_line()
        .await
        .map_err(|e| WordleishError::internal(format!("Failed to read input: {e}")))
}

fn check_length(word: &str) -> Result<()> {
    if word.chars().count() != WORD_LENGTH {
        return Err(WordleishError::contract(format!(
            "words are {} letters long, got {:?}",
            WORD_LENGTH, word
        )));
    }
    Ok(())
}

/// Renders each letter of a guess coloured by its match.
fn render_matches(word: &str, matches: &[LetterMatch]) -> String {
    word.chars()
        .zip(matches)
        .map(|(c, m)| {
            let cell = format!(" {} ", c.to_ascii_uppercase());
            match m {
                LetterMatch::Missing => cell.black().on_white().to_string(),
                LetterMatch::Present => cell.black().on_yellow().to_string(),
                LetterMatch::Correct => cell.black().on_green().to_string(),
            }
        })
        .collect()
}
