//! Mock injected wallet for testing.
//!
//! Behaves like a MetaMask-style extension: it tracks accounts and the
//! active chain, refuses to switch to chains it has not registered
//! (code 4902), and replays `chainChanged` after a successful switch.

use alloy_primitives::{address, Address};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{events, EventHandler, InjectedWallet};
use crate::error::{Result, WordleishError, CHAIN_NOT_ADDED_CODE};
use crate::network::{parse_chain_id, Network};

/// Default account reported by a fresh mock.
pub const MOCK_ACCOUNT: Address = address!("1111111111111111111111111111111111111111");

type SharedHandler = Arc<dyn Fn(Value) + Send + Sync>;

#[derive(Debug)]
struct WalletState {
    accounts: Vec<Address>,
    chain_id: u64,
    known_chains: HashSet<u64>,
    failures: HashMap<String, (i64, String)>,
}

/// A scriptable wallet that records every request.
pub struct MockWallet {
    is_metamask: bool,
    prompt_delay: Option<Duration>,
    state: Mutex<WalletState>,
    handlers: Mutex<Vec<(String, SharedHandler)>>,
    calls: Mutex<Vec<(String, Value)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockWallet {
    /// Creates a MetaMask-like wallet on Sapphire mainnet with one account.
    pub fn new() -> Self {
        let chain_id = Network::SapphireMainnet.chain_id();
        Self {
            is_metamask: true,
            prompt_delay: None,
            state: Mutex::new(WalletState {
                accounts: vec![MOCK_ACCOUNT],
                chain_id,
                known_chains: HashSet::from([chain_id]),
                failures: HashMap::new(),
            }),
            handlers: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a wallet that does not identify as MetaMask.
    pub fn generic() -> Self {
        Self {
            is_metamask: false,
            ..Self::new()
        }
    }

    /// Puts the wallet on `network`, which becomes its only registered chain.
    pub fn with_network(self, network: Network) -> Self {
        self.with_chain_id(network.chain_id())
    }

    /// Puts the wallet on an arbitrary chain id, which becomes its only registered chain.
    pub fn with_chain_id(self, chain_id: u64) -> Self {
        {
            let mut state = lock(&self.state);
            state.chain_id = chain_id;
            state.known_chains = HashSet::from([chain_id]);
        }
        self
    }

    /// Registers additional chains the wallet can switch to.
    pub fn with_known_network(self, network: Network) -> Self {
        lock(&self.state).known_chains.insert(network.chain_id());
        self
    }

    /// Keeps `eth_requestAccounts` pending for `delay`, like a user deciding on a prompt.
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = Some(delay);
        self
    }

    /// Makes every request for `method` fail with the given RPC error.
    pub fn with_failure(self, method: &str, code: i64, message: &str) -> Self {
        lock(&self.state)
            .failures
            .insert(method.to_string(), (code, message.to_string()));
        self
    }

    /// Returns every recorded request in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        lock(&self.calls).clone()
    }

    /// Returns the params of requests made with `method`.
    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }

    /// Counts requests made with `method`.
    pub fn call_count(&self, method: &str) -> usize {
        self.calls_to(method).len()
    }

    /// Counts handlers registered for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        lock(&self.handlers)
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// The chain the wallet is currently on.
    pub fn chain_id(&self) -> u64 {
        lock(&self.state).chain_id
    }

    /// Delivers `payload` to every handler registered for `event`, in registration order.
    pub fn emit(&self, event: &str, payload: Value) {
        let handlers: Vec<SharedHandler> = lock(&self.handlers)
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(payload.clone());
        }
    }

    /// Simulates the user picking different accounts in the extension.
    pub fn change_accounts(&self, accounts: &[Address]) {
        lock(&self.state).accounts = accounts.to_vec();
        self.emit(events::ACCOUNTS_CHANGED, json!(accounts));
    }

    /// Simulates the user switching chains inside the extension.
    pub fn change_chain(&self, chain_id: u64) {
        {
            let mut state = lock(&self.state);
            state.chain_id = chain_id;
            state.known_chains.insert(chain_id);
        }
        self.emit(events::CHAIN_CHANGED, json!(format!("{chain_id:#x}")));
    }

    fn switch_chain(&self, params: &Value) -> Result<Value> {
        let requested = params
            .get(0)
            .and_then(|p| p.get("chainId"))
            .and_then(parse_chain_id)
            .ok_or_else(|| WordleishError::rpc(-32602, "Invalid chainId"))?;

        let known = lock(&self.state).known_chains.contains(&requested);
        if !known {
            return Err(WordleishError::rpc(
                CHAIN_NOT_ADDED_CODE,
                format!("Unrecognized chain ID \"{requested:#x}\"."),
            ));
        }
        self.change_chain(requested);
        Ok(Value::Null)
    }

    fn add_chain(&self, params: &Value) -> Result<Value> {
        let chain_id = params
            .get(0)
            .and_then(|p| p.get("chainId"))
            .and_then(parse_chain_id)
            .ok_or_else(|| WordleishError::rpc(-32602, "Invalid chainId"))?;
        lock(&self.state).known_chains.insert(chain_id);
        Ok(Value::Null)
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InjectedWallet for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        lock(&self.calls).push((method.to_string(), params.clone()));

        if let (Some(delay), "eth_requestAccounts") = (self.prompt_delay, method) {
            tokio::time::sleep(delay).await;
        }

        let failure = lock(&self.state).failures.get(method).cloned();
        if let Some((code, message)) = failure {
            return Err(WordleishError::rpc(code, message));
        }

        match method {
            "eth_requestAccounts" | "eth_accounts" => Ok(json!(lock(&self.state).accounts)),
            "eth_chainId" => Ok(json!(format!("{:#x}", self.chain_id()))),
            "wallet_switchEthereumChain" => self.switch_chain(&params),
            "wallet_addEthereumChain" => self.add_chain(&params),
            _ => Err(WordleishError::rpc(
                -32601,
                format!("The method \"{method}\" does not exist / is not available."),
            )),
        }
    }

    fn on(&self, event: &str, handler: EventHandler) {
        lock(&self.handlers).push((event.to_string(), Arc::from(handler)));
    }

    fn is_metamask(&self) -> bool {
        self.is_metamask
    }
}
