//! Connection state and its transitions.
//!
//! Every transition is a pure function from the current state plus an
//! event payload to the next state. Provider and signer are always
//! re-derived together through [`derive_connection`], so a state produced
//! here never pairs handles for different networks.

use alloy_primitives::Address;

use crate::confidential::{derive_connection, Confidentiality};
use crate::network::{ConnectionStatus, Network};
use crate::provider::{Provider, Signer};
use crate::wallet::WalletEvent;

/// What consumers read: the current network, account and handles.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    pub network: Network,
    pub status: ConnectionStatus,
    pub address: Option<Address>,
    pub provider: Provider,
    pub signer: Option<Signer>,
}

impl ConnectionState {
    /// State before any wallet connects: a read-only provider for `network`.
    pub fn initial(
        wrapper: &dyn Confidentiality,
        network: Network,
        raw_provider: &Provider,
    ) -> Self {
        let derived = derive_connection(wrapper, network, raw_provider, None);
        Self {
            network,
            status: ConnectionStatus::Unknown,
            address: None,
            provider: derived.provider,
            signer: None,
        }
    }

    /// True when a signer is available.
    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Provider and signer (if any) agree with the published network.
    pub fn is_consistent(&self) -> bool {
        self.provider.network() == self.network
            && self.signer.as_ref().map_or(true, |s| {
                s.network() == self.network && s.wrapping() == self.provider.wrapping()
            })
    }
}

/// Raw (unwrapped, unbound) handles obtained from the connected wallet.
#[derive(Debug, Clone)]
pub struct Session {
    pub provider: Provider,
    pub signer: Signer,
}

impl Session {
    /// Obtains the raw signer from a wallet-backed provider.
    pub fn new(provider: Provider) -> Self {
        let signer = provider.get_signer();
        Self { provider, signer }
    }
}

fn rederive(
    current: &ConnectionState,
    session: &Session,
    wrapper: &dyn Confidentiality,
    network: Network,
    address: Option<Address>,
) -> ConnectionState {
    let raw_signer = address.map(|a| session.signer.with_address(a));
    let derived = derive_connection(wrapper, network, &session.provider, raw_signer.as_ref());
    ConnectionState {
        network,
        status: current.status,
        address,
        provider: derived.provider,
        signer: derived.signer,
    }
}

/// `connect` resolved: publish address, network and the derived pair together.
pub fn connected(
    current: &ConnectionState,
    session: &Session,
    wrapper: &dyn Confidentiality,
    address: Address,
    network: Network,
) -> ConnectionState {
    rederive(current, session, wrapper, network, Some(address))
}

/// `accountsChanged`: first address wins; an empty list clears the signer only.
pub fn accounts_changed(
    current: &ConnectionState,
    session: &Session,
    wrapper: &dyn Confidentiality,
    accounts: &[Address],
) -> ConnectionState {
    match accounts.first() {
        Some(&address) => rederive(current, session, wrapper, current.network, Some(address)),
        None => ConnectionState {
            address: None,
            signer: None,
            ..current.clone()
        },
    }
}

/// `chainChanged`: move to `network`, keeping the current address.
pub fn chain_changed(
    current: &ConnectionState,
    session: &Session,
    wrapper: &dyn Confidentiality,
    network: Network,
) -> ConnectionState {
    rederive(current, session, wrapper, network, current.address)
}

/// `connect` / `disconnect` signals.
pub fn status_changed(current: &ConnectionState, status: ConnectionStatus) -> ConnectionState {
    ConnectionState {
        status,
        ..current.clone()
    }
}

/// Applies a decoded wallet event.
pub fn apply_event(
    current: &ConnectionState,
    session: &Session,
    wrapper: &dyn Confidentiality,
    event: &WalletEvent,
) -> ConnectionState {
    match event {
        WalletEvent::AccountsChanged(accounts) => {
            accounts_changed(current, session, wrapper, accounts)
        }
        WalletEvent::ChainChanged(network) => chain_changed(current, session, wrapper, *network),
        WalletEvent::Connect => status_changed(current, ConnectionStatus::Connected),
        WalletEvent::Disconnect => status_changed(current, ConnectionStatus::Disconnected),
    }
}
