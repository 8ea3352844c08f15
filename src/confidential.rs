//! Confidentiality middleware seam.
//!
//! Sapphire networks require request/response encryption for provider and
//! signer traffic. The envelope itself belongs to the middleware behind
//! [`Confidentiality`]; this module decides *when* it is applied.

use tracing::debug;

use crate::network::Network;
use crate::provider::{Provider, Signer, Wrapping};

/// Wraps providers and signers for confidential networks.
pub trait Confidentiality: Send + Sync {
    /// Static mapping from network to "needs wrapping".
    fn is_confidential(&self, network: Network) -> bool {
        network.is_confidential()
    }

    /// Returns the wrapped equivalent of `provider`.
    fn wrap_provider(&self, provider: Provider) -> Provider;

    /// Returns the wrapped equivalent of `signer`.
    fn wrap_signer(&self, signer: Signer) -> Signer;
}

/// Sapphire ParaTime middleware.
///
/// Marks handles as confidential. The envelope encryption itself is the
/// job of a custom [`Confidentiality`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SapphireWrapper;

impl Confidentiality for SapphireWrapper {
    fn wrap_provider(&self, provider: Provider) -> Provider {
        provider.with_wrapping(Wrapping::Confidential)
    }

    fn wrap_signer(&self, signer: Signer) -> Signer {
        signer.with_wrapping(Wrapping::Confidential)
    }
}

/// A provider/signer pair guaranteed to target the same network.
#[derive(Debug, Clone)]
pub struct DerivedConnection {
    pub provider: Provider,
    pub signer: Option<Signer>,
}

/// Re-derives the provider/signer pair for `network`.
///
/// Both handles are rebound from their raw (unwrapped) forms and wrapped
/// together iff the network is confidential.
pub fn derive_connection(
    wrapper: &dyn Confidentiality,
    network: Network,
    raw_provider: &Provider,
    raw_signer: Option<&Signer>,
) -> DerivedConnection {
    let provider = raw_provider.on_network(network);
    let signer = raw_signer.map(|s| s.on_network(network));

    if wrapper.is_confidential(network) {
        debug!(%network, "Wrapping provider and signer for confidential network");
        DerivedConnection {
            provider: wrapper.wrap_provider(provider),
            signer: signer.map(|s| wrapper.wrap_signer(s)),
        }
    } else {
        DerivedConnection { provider, signer }
    }
}
