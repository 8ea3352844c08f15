//! Wordleish - wallet connection management and contract client for an on-chain word game.
//!
//! This library exposes the core modules for use by the CLI and integration tests.

pub mod config;
pub mod confidential;
pub mod connection;
pub mod contract;
pub mod dictionary;
pub mod error;
pub mod logging;
pub mod network;
pub mod provider;
pub mod rpc;
pub mod wallet;
