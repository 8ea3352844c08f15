//! Connection manager for wallet lifecycle and network switching.

use alloy_primitives::Address;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::state::{self, ConnectionState, Session};
use crate::config::Config;
use crate::confidential::{Confidentiality, SapphireWrapper};
use crate::error::{Result, WordleishError};
use crate::network::{AddChainParams, ConnectionStatus, Network};
use crate::provider::{Provider, Signer};
use crate::rpc::{HttpTransport, HttpTransportConfig, RpcTransport};
use crate::wallet::{events, InjectedWallet, WalletDetector, WalletEvent, WalletTransport};

/// State shared with the wallet event handlers.
struct Shared {
    state: watch::Sender<ConnectionState>,
    session: Mutex<Option<Session>>,
    wrapper: Arc<dyn Confidentiality>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    /// Publishes `event` as one indivisible update.
    fn handle_event(&self, event: &WalletEvent) {
        let session = lock(&self.session);
        let wrapper = self.wrapper.as_ref();
        match (event, session.as_ref()) {
            (WalletEvent::Connect, _) => self.state.send_modify(|current| {
                *current = state::status_changed(current, ConnectionStatus::Connected)
            }),
            (WalletEvent::Disconnect, _) => self.state.send_modify(|current| {
                *current = state::status_changed(current, ConnectionStatus::Disconnected)
            }),
            (_, Some(session)) => self.state.send_modify(|current| {
                *current = state::apply_event(current, session, wrapper, event)
            }),
            (_, None) => {
                debug!(?event, "Ignoring wallet event before connect");
                return;
            }
        }
        drop(session);

        let current = self.state.borrow();
        let address = current.address.map_or_else(|| "-".to_string(), |a| a.to_string());
        info!(
            network = %current.network,
            %address,
            status = %current.status,
            "Connection state updated"
        );
    }
}

/// What happened to chain registration during a failed switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The error was not 4902, or the target is not a confidential network.
    NotAttempted,
    /// `wallet_addEthereumChain` succeeded; retrying the switch should work.
    Registered,
    /// `wallet_addEthereumChain` itself failed.
    Failed,
}

/// A rejected switch together with the outcome of chain registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchFailure {
    pub error: WordleishError,
    pub registration: Registration,
}

/// Manages the wallet connection and the network it targets.
///
/// Created once at application start and kept for the lifetime of the
/// application. Consumers read the current state synchronously with
/// [`ConnectionManager::state`] or react to changes through
/// [`ConnectionManager::subscribe`].
pub struct ConnectionManager {
    shared: Arc<Shared>,
    detector: Arc<dyn WalletDetector>,
    /// Held across a connect attempt; stores the outcome of the last one.
    connect_lock: tokio::sync::Mutex<Option<Result<()>>>,
    /// Completed connect attempts, bumped while `connect_lock` is held.
    attempts: AtomicU64,
    subscribed: AtomicBool,
    rpc_urls: HashMap<Network, String>,
}

impl ConnectionManager {
    /// Creates a manager whose read-only provider targets `default_network`.
    pub fn new(
        detector: Arc<dyn WalletDetector>,
        wrapper: Arc<dyn Confidentiality>,
        default_network: Network,
        default_transport: Arc<dyn RpcTransport>,
    ) -> Self {
        let initial = ConnectionState::initial(
            wrapper.as_ref(),
            default_network,
            &Provider::new(default_transport),
        );
        let (state, _) = watch::channel(initial);

        Self {
            shared: Arc::new(Shared {
                state,
                session: Mutex::new(None),
                wrapper,
            }),
            detector,
            connect_lock: tokio::sync::Mutex::new(None),
            attempts: AtomicU64::new(0),
            subscribed: AtomicBool::new(false),
            rpc_urls: HashMap::new(),
        }
    }

    /// Creates a manager from configuration, using the Sapphire middleware.
    pub fn from_config(config: &Config, detector: Arc<dyn WalletDetector>) -> Result<Self> {
        let network = config.default_network;
        let url = config.rpc_url(network).ok_or_else(|| {
            WordleishError::config(format!("No RPC URL configured for {}", network))
        })?;
        let transport = HttpTransport::new(
            HttpTransportConfig::new(&url)?.with_timeout(config.request_timeout_secs),
        )?;

        let mut manager =
            Self::new(detector, Arc::new(SapphireWrapper), network, Arc::new(transport));
        for known in Network::KNOWN {
            if let Some(url) = config.rpc_url(known) {
                manager.rpc_urls.insert(known, url);
            }
        }
        Ok(manager)
    }

    /// Overrides the RPC URL registered with the wallet for `network`.
    pub fn with_rpc_url(mut self, network: Network, url: impl Into<String>) -> Self {
        self.rpc_urls.insert(network, url.into());
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified after every state update.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    pub fn network(&self) -> Network {
        self.shared.state.borrow().network
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.state.borrow().status
    }

    pub fn address(&self) -> Option<Address> {
        self.shared.state.borrow().address
    }

    pub fn provider(&self) -> Provider {
        self.shared.state.borrow().provider.clone()
    }

    pub fn signer(&self) -> Option<Signer> {
        self.shared.state.borrow().signer.clone()
    }

    /// Check if a signer is available.
    pub fn is_connected(&self) -> bool {
        self.shared.state.borrow().has_signer()
    }

    /// Connects the injected wallet.
    ///
    /// Returns immediately if a signer already exists. A caller that
    /// arrives while an attempt is in flight waits for it and returns the
    /// same outcome, success or failure, without prompting again.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            debug!("Signer already present, not requesting accounts again");
            return Ok(());
        }
        let seen = self.attempts.load(Ordering::SeqCst);

        let mut last = self.connect_lock.lock().await;
        if self.is_connected() {
            debug!("Signer already present, not requesting accounts again");
            return Ok(());
        }
        if self.attempts.load(Ordering::SeqCst) != seen {
            if let Some(outcome) = last.as_ref() {
                debug!(ok = outcome.is_ok(), "Reusing outcome of the overlapping connect");
                return outcome.clone();
            }
        }

        let outcome = self.attempt_connect().await;
        *last = Some(outcome.clone());
        self.attempts.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn attempt_connect(&self) -> Result<()> {
        let wallet = self.detector.detect().await.ok_or_else(|| {
            warn!("No injected wallet detected");
            WordleishError::NoProviderDetected
        })?;

        let transport = WalletTransport::new(Arc::clone(&wallet));
        let session = Session::new(Provider::new(Arc::new(transport)));
        session
            .provider
            .request("eth_requestAccounts", json!([]))
            .await?;

        let (address, network) =
            futures::try_join!(session.signer.fetch_address(), session.signer.fetch_network())?;
        info!(%network, %address, "Wallet connected");

        {
            let mut slot = lock(&self.shared.session);
            *slot = Some(session.clone());
            let wrapper = self.shared.wrapper.as_ref();
            self.shared.state.send_modify(|current| {
                *current = state::connected(current, &session, wrapper, address, network)
            });
        }

        if !wallet.is_metamask() {
            debug!("Wallet is not interactive, skipping event subscriptions");
            self.shared.state.send_modify(|current| {
                *current = state::status_changed(current, ConnectionStatus::Connected)
            });
            return Ok(());
        }

        if !self.subscribed.swap(true, Ordering::SeqCst) {
            self.subscribe_events(wallet.as_ref());
        }
        Ok(())
    }

    fn subscribe_events(&self, wallet: &dyn InjectedWallet) {
        for name in events::ALL {
            let shared = Arc::clone(&self.shared);
            wallet.on(
                name,
                Box::new(move |payload| {
                    if let Some(event) = WalletEvent::from_payload(name, &payload) {
                        shared.handle_event(&event);
                    }
                }),
            );
        }
        debug!("Subscribed to wallet events");
    }

    /// Applies a wallet event delivered by the host instead of a subscription.
    pub fn handle_event(&self, event: &WalletEvent) {
        self.shared.handle_event(event);
    }

    /// Asks the wallet to switch to `target`.
    ///
    /// The resulting state arrives through the wallet's `chainChanged`
    /// event. If the wallet does not know a confidential target, the chain
    /// is registered and the original error is still returned so the caller
    /// can retry.
    pub async fn switch_network(&self, target: Network) -> Result<()> {
        self.try_switch_network(target)
            .await
            .map_err(|failure| failure.error)
    }

    /// Like [`switch_network`](Self::switch_network), also reporting whether
    /// the chain was registered after a 4902.
    pub async fn try_switch_network(
        &self,
        target: Network,
    ) -> std::result::Result<(), SwitchFailure> {
        let Some(wallet) = self.detector.detect().await else {
            debug!(%target, "No wallet to switch");
            return Ok(());
        };

        let params = json!([{ "chainId": target.chain_id_hex() }]);
        let error = match wallet.request("wallet_switchEthereumChain", params).await {
            Ok(_) => {
                info!(%target, "Wallet accepted network switch");
                return Ok(());
            }
            Err(error) => error,
        };

        let registration = match self.add_chain_params(target) {
            Some(params) if error.is_chain_not_added() => {
                info!(%target, url = %params.rpc_urls[0], "Registering chain with wallet");
                match wallet
                    .request("wallet_addEthereumChain", json!([params]))
                    .await
                {
                    Ok(_) => Registration::Registered,
                    Err(add_err) => {
                        warn!(%target, error = %add_err, "Failed to register chain");
                        Registration::Failed
                    }
                }
            }
            _ => Registration::NotAttempted,
        };
        Err(SwitchFailure {
            error,
            registration,
        })
    }

    fn add_chain_params(&self, target: Network) -> Option<AddChainParams> {
        if !target.is_confidential() {
            return None;
        }
        let url = self
            .rpc_urls
            .get(&target)
            .cloned()
            .or_else(|| target.default_rpc_url().map(String::from))?;
        Some(AddChainParams::new(target, url))
    }
}
