//! Connection management for Wordleish.
//!
//! Centralizes the wallet connection lifecycle and network switching.

pub mod manager;
pub mod state;

pub use manager::{ConnectionManager, Registration, SwitchFailure};
pub use state::{ConnectionState, Session};
