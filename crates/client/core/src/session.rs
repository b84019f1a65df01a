//! Wallet session: connection status, active account and chain.
//!
//! The session is the only component that talks to the wallet about accounts.
//! State is published through a `watch` channel; the game state mirror and any
//! front end subscribe to it.

use std::sync::Arc;

use alloy_primitives::Address;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use client_blockchain_core::{ProviderError, ProviderExt, ProviderNotification, WalletProvider};

/// Snapshot of the wallet session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Active account; `None` while disconnected.
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    /// Bumped on every chain change. Anything derived under an older epoch is
    /// stale and must be discarded.
    pub reload_epoch: u64,
    /// Last user-visible error.
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No wallet provider found. Please install a wallet")]
    MissingProvider,

    #[error("Connection request was rejected")]
    Rejected,

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Wallet request failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Wallet session handle. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    state: Arc<watch::Sender<SessionState>>,
}

impl WalletSession {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            provider,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn address(&self) -> Option<Address> {
        self.state.borrow().address
    }

    /// Silently resume a session the wallet already authorized.
    ///
    /// Uses `eth_accounts`, which never prompts. Failures are logged and leave
    /// the session disconnected.
    pub async fn restore(&self) {
        let Some(provider) = &self.provider else {
            return;
        };

        match provider.accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(&address) => {
                    let chain_id = Self::read_chain_id(provider.as_ref()).await;
                    tracing::info!("Restored wallet session for {}", address);
                    self.state.send_modify(|state| {
                        state.address = Some(address);
                        state.chain_id = chain_id;
                        state.error = None;
                    });
                }
                None => tracing::debug!("No previously authorized account"),
            },
            Err(err) => tracing::warn!("Error checking wallet connection: {}", err),
        }
    }

    /// Ask the wallet to connect and adopt its first account.
    ///
    /// On failure the error is recorded in the session state and the session
    /// stays as it was.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let result = self.request_connection().await;
        match &result {
            Ok((address, chain_id)) => {
                tracing::info!("Wallet connected: {}", address);
                self.state.send_modify(|state| {
                    state.address = Some(*address);
                    state.chain_id = *chain_id;
                    state.error = None;
                });
            }
            Err(err) => {
                tracing::warn!("Wallet connection failed: {}", err);
                let message = err.to_string();
                self.state.send_modify(|state| state.error = Some(message));
            }
        }
        result.map(|(address, _)| address)
    }

    async fn request_connection(&self) -> Result<(Address, Option<u64>), SessionError> {
        let provider = self.provider.as_ref().ok_or(SessionError::MissingProvider)?;

        let accounts = provider.request_accounts().await.map_err(|err| {
            if err.is_user_rejected() {
                SessionError::Rejected
            } else {
                SessionError::Provider(err)
            }
        })?;
        let address = accounts.first().copied().ok_or(SessionError::NoAccounts)?;
        let chain_id = Self::read_chain_id(provider.as_ref()).await;

        Ok((address, chain_id))
    }

    async fn read_chain_id(provider: &dyn WalletProvider) -> Option<u64> {
        provider
            .chain_id()
            .await
            .inspect_err(|err| tracing::warn!("Failed to read chain id: {}", err))
            .ok()
    }

    /// Forget the active account.
    pub fn disconnect(&self) {
        tracing::info!("Wallet disconnected");
        self.state.send_modify(|state| {
            state.address = None;
            state.error = None;
        });
    }

    /// Apply a wallet notification.
    pub fn handle_notification(&self, notification: ProviderNotification) {
        match notification {
            ProviderNotification::AccountsChanged(accounts) => {
                let address = accounts.first().copied();
                tracing::info!("Accounts changed: {:?}", address);
                self.state.send_if_modified(|state| {
                    if state.address == address {
                        return false;
                    }
                    if address.is_some() {
                        state.error = None;
                    }
                    state.address = address;
                    true
                });
            }
            ProviderNotification::ChainChanged(chain_id) => {
                tracing::info!("Chain changed to {:#x}, discarding derived state", chain_id);
                self.state.send_modify(|state| {
                    state.chain_id = Some(chain_id);
                    state.reload_epoch += 1;
                });
            }
        }
    }

    /// Fill in the chain id of a connected session that does not know it yet.
    ///
    /// An account can arrive through a notification without a chain id; this
    /// asks the wallet once and is a no-op otherwise.
    pub async fn resolve_chain_id(&self) {
        let Some(provider) = &self.provider else {
            return;
        };
        let state = self.state();
        if state.address.is_none() || state.chain_id.is_some() {
            return;
        }

        if let Some(chain_id) = Self::read_chain_id(provider.as_ref()).await {
            self.state.send_if_modified(|state| {
                if state.chain_id.is_some() {
                    return false;
                }
                state.chain_id = Some(chain_id);
                true
            });
        }
    }

    /// Follow wallet notifications until the returned listener is dropped.
    ///
    /// Returns `None` without a provider.
    pub fn listen(&self) -> Option<SessionListener> {
        let provider = self.provider.as_ref()?;
        let mut subscription = provider.subscribe();
        let session = self.clone();

        let task = tokio::spawn(async move {
            while let Some(notification) = subscription.next().await {
                session.handle_notification(notification);
                session.resolve_chain_id().await;
            }
            tracing::debug!("Wallet notification stream closed");
        });

        Some(SessionListener { task })
    }
}

/// Owns the notification task; dropping it unsubscribes.
pub struct SessionListener {
    task: JoinHandle<()>,
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
