//! Top-level PokeChain client: composition root and terminal commands.
//!
//! # Architecture
//!
//! ```text
//! Client (Top-level container)
//!   └─→ GameClient (client-core)
//!         ├─→ WalletSession ──→ WalletProvider (HTTP JSON-RPC or injected)
//!         ├─→ GameStateMirror
//!         └─→ EvmGameClient (client-blockchain-evm)
//! ```
//!
//! The binary parses a [`Command`], builds a [`Client`] through
//! [`ClientBuilder`] and hands the command to [`Client::execute`].

mod builder;
pub mod commands;
pub mod logging;
pub mod render;

pub use builder::ClientBuilder;
pub use commands::{AdminCommand, Command, TrainCommand};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use client_blockchain_core::NetworkDescriptor;
use client_core::GameClient;

/// Top-level client container.
pub struct Client {
    game: GameClient,
    network: NetworkDescriptor,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn game(&self) -> &GameClient {
        &self.game
    }

    /// Network the wallet is matched against before every contract call.
    pub fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    /// Restore the previous wallet session and start following the wallet.
    pub async fn start(&mut self) {
        self.game.start().await;
    }

    /// Connected account, prompting the wallet when no session was restored.
    pub async fn ensure_connected(&self) -> Result<Address> {
        if let Some(address) = self.game.session().address() {
            return Ok(address);
        }
        self.game
            .connect()
            .await
            .context("Failed to connect wallet")
    }

    /// Explorer link for a transaction, when the network has an explorer.
    pub fn explorer_link(&self, hash: &impl std::fmt::Display) -> Option<String> {
        self.network
            .block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), hash))
    }
}
