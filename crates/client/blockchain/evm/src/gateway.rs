//! Chain gateway: network match and contract handles.
//!
//! Every contract call goes through a [`ContractHandle`] obtained here, so the
//! wallet is always on the target network before anything is read or signed.

use std::sync::Arc;

use alloy_primitives::{Address, B256};
use alloy_sol_types::SolCall;

use client_blockchain_core::{
    ChainError, ProviderError, ProviderExt, TransactionRequest, WalletProvider,
};

use crate::config::EvmConfig;

/// Contracts the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Pokemon,
    Marketplace,
}

/// Entry point for all contract interaction.
pub struct ChainGateway {
    provider: Option<Arc<dyn WalletProvider>>,
    config: EvmConfig,
}

impl ChainGateway {
    /// `provider` is `None` when no wallet is available; every operation then
    /// fails with [`ChainError::MissingProvider`].
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, config: EvmConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    pub fn provider(&self) -> Result<&Arc<dyn WalletProvider>, ChainError> {
        self.provider.as_ref().ok_or(ChainError::MissingProvider)
    }

    /// Switch the wallet to the target chain, registering it first if the
    /// wallet does not know it.
    ///
    /// Registration is attempted only after the wallet reports the chain as
    /// unrecognized, and the switch is retried exactly once afterwards.
    pub async fn ensure_network(&self) -> Result<(), ChainError> {
        let provider = self.provider()?;
        let chain_id = self.config.chain_id();
        let switch_failed = |source: ProviderError| ChainError::NetworkSwitch { chain_id, source };

        match provider.switch_chain(chain_id).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_unrecognized_chain() => {
                tracing::info!(
                    "Chain {:#x} not registered with wallet, adding {}",
                    chain_id,
                    self.config.network.chain_name
                );
                provider
                    .add_chain(&self.config.network)
                    .await
                    .map_err(switch_failed)?;
                provider.switch_chain(chain_id).await.map_err(switch_failed)
            }
            Err(err) => Err(switch_failed(err)),
        }
    }

    fn address_of(&self, kind: ContractKind) -> Result<Address, ChainError> {
        match kind {
            ContractKind::Pokemon => Ok(self.config.pokemon_contract),
            ContractKind::Marketplace => self
                .config
                .marketplace_contract
                .ok_or_else(|| ChainError::Config("marketplace contract is not configured".into())),
        }
    }

    /// Read-only handle. Performs the network match.
    pub async fn read_handle(&self, kind: ContractKind) -> Result<ContractHandle, ChainError> {
        let address = self.address_of(kind)?;
        self.ensure_network().await?;

        Ok(ContractHandle {
            provider: Arc::clone(self.provider()?),
            kind,
            address,
            signer: None,
        })
    }

    /// Signing handle bound to the wallet's first account.
    pub async fn signing_handle(&self, kind: ContractKind) -> Result<ContractHandle, ChainError> {
        let address = self.address_of(kind)?;
        self.ensure_network().await?;

        let provider = self.provider()?;
        let accounts = provider.request_accounts().await.map_err(|err| {
            if err.is_user_rejected() {
                ChainError::UserRejected
            } else {
                ChainError::read("wallet accounts", err)
            }
        })?;
        let signer = accounts.first().copied().ok_or(ChainError::NotConnected)?;
        tracing::debug!("Signing handle for {:?} as {}", kind, signer);

        Ok(ContractHandle {
            provider: Arc::clone(provider),
            kind,
            address,
            signer: Some(signer),
        })
    }
}

/// A contract bound to a fixed address, optionally with a signer.
pub struct ContractHandle {
    provider: Arc<dyn WalletProvider>,
    kind: ContractKind,
    address: Address,
    signer: Option<Address>,
}

impl ContractHandle {
    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> Option<Address> {
        self.signer
    }

    pub fn provider(&self) -> &dyn WalletProvider {
        self.provider.as_ref()
    }

    /// `eth_call` the function and decode its return values.
    pub async fn call<C>(&self, call: &C) -> Result<C::Return, ChainError>
    where
        C: SolCall + Send + Sync,
    {
        let mut request = TransactionRequest::new(self.address, call.abi_encode());
        request.from = self.signer;

        let output = self
            .provider
            .call(&request)
            .await
            .map_err(|err| ChainError::read(C::SIGNATURE, err))?;

        C::abi_decode_returns(&output, true).map_err(|err| ChainError::decode(C::SIGNATURE, err))
    }

    /// Transaction request for `call`, sent from the signer.
    pub fn transaction<C: SolCall>(&self, call: &C) -> TransactionRequest {
        let mut request = TransactionRequest::new(self.address, call.abi_encode());
        request.from = self.signer;
        request
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ProviderError> {
        self.provider.estimate_gas(tx).await
    }

    pub async fn send(&self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        self.provider.send_transaction(tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::IPokemonNFT;
    use alloy_primitives::{U256, address};
    use client_blockchain_core::{ErrorKind, MockWalletProvider};

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

    fn gateway(wallet: &Arc<MockWalletProvider>) -> ChainGateway {
        let provider: Arc<dyn WalletProvider> = wallet.clone();
        ChainGateway::new(Some(provider), EvmConfig::default())
    }

    #[tokio::test]
    async fn missing_provider_fails_every_operation() {
        let gateway = ChainGateway::new(None, EvmConfig::default());

        let err = gateway.ensure_network().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingProvider);
        let err = gateway.read_handle(ContractKind::Pokemon).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingProvider);
    }

    #[tokio::test]
    async fn unregistered_chain_is_added_then_switched() {
        let wallet = Arc::new(MockWalletProvider::new(1));
        gateway(&wallet).ensure_network().await.unwrap();

        assert_eq!(wallet.count("wallet_addEthereumChain"), 1);
        assert_eq!(wallet.count("wallet_switchEthereumChain"), 2);
        assert_eq!(wallet.active_chain(), 59141);
    }

    #[tokio::test]
    async fn registered_chain_never_triggers_registration() {
        let wallet = Arc::new(MockWalletProvider::new(1).with_registered_chain(59141));
        gateway(&wallet).ensure_network().await.unwrap();

        assert_eq!(wallet.count("wallet_addEthereumChain"), 0);
        assert_eq!(wallet.count("wallet_switchEthereumChain"), 1);
        assert_eq!(wallet.active_chain(), 59141);
    }

    #[tokio::test]
    async fn other_switch_failures_are_fatal() {
        let wallet = Arc::new(MockWalletProvider::new(1));
        wallet.fail_switch(ProviderError::user_rejected());

        let err = gateway(&wallet).ensure_network().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkSwitch);
        assert_eq!(wallet.count("wallet_addEthereumChain"), 0);
    }

    #[tokio::test]
    async fn failed_registration_is_a_switch_failure() {
        let wallet = Arc::new(MockWalletProvider::new(1));
        wallet.fail_add_chain(ProviderError::user_rejected());

        let err = gateway(&wallet).ensure_network().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkSwitch);
        assert_eq!(wallet.count("wallet_addEthereumChain"), 1);
        assert_eq!(wallet.count("wallet_switchEthereumChain"), 1);
        assert!(!wallet.is_registered(59141));
        assert_eq!(wallet.active_chain(), 1);
    }

    #[tokio::test]
    async fn unconfigured_marketplace_is_a_config_error() {
        let wallet = Arc::new(MockWalletProvider::new(59141));
        let err = gateway(&wallet)
            .read_handle(ContractKind::Marketplace)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn signing_handle_uses_first_account() {
        let wallet = Arc::new(
            MockWalletProvider::new(59141)
                .with_account(ALICE)
                .with_account(address!("000000000000000000000000000000000000b0b0")),
        );
        let handle = gateway(&wallet)
            .signing_handle(ContractKind::Pokemon)
            .await
            .unwrap();
        assert_eq!(handle.signer(), Some(ALICE));
    }

    #[tokio::test]
    async fn handle_call_decodes_return_values() {
        let wallet = Arc::new(MockWalletProvider::new(59141));
        let contract = EvmConfig::default().pokemon_contract;
        wallet.on_call(contract, IPokemonNFT::balanceOfCall::SELECTOR, |_| {
            Ok(IPokemonNFT::balanceOfCall::abi_encode_returns(&(U256::from(1),)))
        });

        let handle = gateway(&wallet)
            .read_handle(ContractKind::Pokemon)
            .await
            .unwrap();
        let balance = handle
            .call(&IPokemonNFT::balanceOfCall {
                account: ALICE,
                id: U256::from(4),
            })
            .await
            .unwrap();
        assert_eq!(balance._0, U256::from(1));
    }

    #[tokio::test]
    async fn failed_reads_are_read_failures() {
        let wallet = Arc::new(MockWalletProvider::new(59141));
        let handle = gateway(&wallet)
            .read_handle(ContractKind::Pokemon)
            .await
            .unwrap();

        let err = handle
            .call(&IPokemonNFT::hasStarterPokemonCall { owner: ALICE })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReadFailure);
    }
}
