//! Client builder with dependency injection pattern.

use std::sync::Arc;

use anyhow::{Context, Result};
use client_blockchain_core::WalletProvider;
use client_blockchain_evm::{EvmConfig, EvmGameClient};
use client_core::{ClientConfig, GameClient, WalletSession};

use crate::Client;

/// Builder for constructing a Client with proper validation.
///
/// - **Required**: the EVM configuration
/// - **Optional**: the wallet provider; without one every wallet operation
///   reports a missing provider
#[derive(Default)]
pub struct ClientBuilder {
    provider: Option<Arc<dyn WalletProvider>>,
    evm: Option<EvmConfig>,
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wallet provider (optional).
    pub fn provider(mut self, provider: impl WalletProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set an already shared wallet provider (optional).
    pub fn shared_provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the contract and network configuration (required).
    pub fn evm(mut self, config: EvmConfig) -> Self {
        self.evm = Some(config);
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the Client.
    ///
    /// # Errors
    ///
    /// Returns an error if the EVM configuration is missing or invalid.
    pub fn build(self) -> Result<Client> {
        let evm = self
            .evm
            .context("EVM configuration is required. Use .evm() to set it.")?;
        let network = evm.network.clone();

        let chain = EvmGameClient::new(self.provider.clone(), evm)
            .context("Failed to initialize the EVM game client")?;
        let session = WalletSession::new(self.provider);

        Ok(Client {
            game: GameClient::new(session, Arc::new(chain), self.config),
            network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::MockWalletProvider;

    #[test]
    fn evm_config_is_required() {
        let err = ClientBuilder::new().build().err().unwrap();
        assert!(err.to_string().contains("EVM configuration is required"));
    }

    #[test]
    fn invalid_evm_config_is_rejected() {
        let mut evm = EvmConfig::default();
        evm.confirmations.mint = 0;

        let err = ClientBuilder::new()
            .provider(MockWalletProvider::new(59141))
            .evm(evm)
            .build()
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to initialize"));
    }

    #[test]
    fn builds_with_default_network() {
        let client = ClientBuilder::new()
            .provider(MockWalletProvider::new(59141))
            .evm(EvmConfig::default())
            .build()
            .unwrap();
        assert_eq!(client.network().chain_id(), 59141);
        assert_eq!(client.game().chain().name(), "EVM");
    }
}
