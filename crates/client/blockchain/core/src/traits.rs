//! Blockchain abstraction traits.
//!
//! This module defines a layered abstraction:
//! - Layer 0: WalletProvider (raw wallet requests and notifications)
//! - Layer 1: GameReader, GameWriter (game domain)
//! - Layer 2: GameChain (composite trait)

use alloy_primitives::{Address, B256, Bytes, U64};
use async_trait::async_trait;
use game_core::{Creature, CreatureId, ItemId, MarketItem};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{ChainError, ProviderError};
use crate::types::{
    ActionReceipt, MintReceipt, NetworkDescriptor, ProviderSubscription, TrainingReceipt,
    TransactionReceipt, TransactionRequest,
};

// ============================================================================
// Layer 0: Wallet Provider
// ============================================================================

/// EIP-1193 style wallet provider.
///
/// Implementations are handed to the gateway and the session explicitly; there
/// is no process-wide provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Perform a raw JSON-RPC style request.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Subscribe to `accountsChanged` / `chainChanged` notifications.
    fn subscribe(&self) -> ProviderSubscription;
}

/// Typed helpers over [`WalletProvider::request`].
#[async_trait]
pub trait ProviderExt: WalletProvider {
    async fn request_as<T>(&self, method: &str, params: Value) -> Result<T, ProviderError>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.request(method, params).await?;
        serde_json::from_value(value).map_err(|e| {
            ProviderError::internal(format!("malformed {method} response: {e}"))
        })
    }

    /// Ask the user to authorize accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request_as("eth_requestAccounts", json!([])).await
    }

    /// Accounts already authorized, without prompting (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.request_as("eth_accounts", json!([])).await
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let id: U64 = self.request_as("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        self.request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": U64::from(chain_id) }]),
        )
        .await
        .map(|_| ())
    }

    async fn add_chain(&self, network: &NetworkDescriptor) -> Result<(), ProviderError> {
        self.request("wallet_addEthereumChain", json!([network]))
            .await
            .map(|_| ())
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError> {
        self.request_as("eth_call", json!([tx, "latest"])).await
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, ProviderError> {
        let gas: U64 = self.request_as("eth_estimateGas", json!([tx])).await?;
        Ok(gas.to::<u64>())
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        self.request_as("eth_sendTransaction", json!([tx])).await
    }

    /// Receipt of a mined transaction, `None` while pending.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        self.request_as("eth_getTransactionReceipt", json!([hash]))
            .await
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        let number: U64 = self.request_as("eth_blockNumber", json!([])).await?;
        Ok(number.to::<u64>())
    }
}

impl<P: WalletProvider + ?Sized> ProviderExt for P {}

// ============================================================================
// Layer 1: Game Domain Traits
// ============================================================================

/// Live reads of game state.
///
/// Nothing is cached: every call goes to the chain.
#[async_trait]
pub trait GameReader: Send + Sync {
    /// Whether `owner` already claimed a starter.
    async fn has_starter(&self, owner: Address) -> Result<bool, ChainError>;

    /// Quantity of creature `id` held by `owner` (0 or 1 in practice).
    async fn creature_balance(&self, owner: Address, id: CreatureId) -> Result<u64, ChainError>;

    /// Full creature record.
    async fn creature(&self, id: CreatureId) -> Result<Creature, ChainError>;

    /// Metadata URI of a creature token.
    async fn token_uri(&self, id: CreatureId) -> Result<String, ChainError>;

    /// XP the creature would hold if training completed at `now` (unix seconds).
    async fn training_xp(&self, id: CreatureId, now: u64) -> Result<u64, ChainError>;

    /// Quantity of item `id` held by `owner`.
    async fn item_balance(&self, owner: Address, id: ItemId) -> Result<u64, ChainError>;

    /// Listed marketplace item.
    async fn market_item(&self, id: ItemId) -> Result<MarketItem, ChainError>;
}

/// Signed game actions.
///
/// Each call runs the full pipeline: network match, preconditions, gas
/// estimation, submission, confirmation and receipt decoding.
#[async_trait]
pub trait GameWriter: Send + Sync {
    async fn mint_starter(&self, id: CreatureId) -> Result<MintReceipt, ChainError>;

    async fn start_training(
        &self,
        id: CreatureId,
        ground_id: u64,
    ) -> Result<ActionReceipt, ChainError>;

    async fn complete_training(&self, id: CreatureId) -> Result<TrainingReceipt, ChainError>;

    async fn purchase_item(&self, id: ItemId, amount: u64) -> Result<ActionReceipt, ChainError>;

    /// Deploy-time linkage: point the game contract at the PokeCoin token.
    async fn link_pokecoin(&self, token: Address) -> Result<ActionReceipt, ChainError>;

    /// Deploy-time linkage: grant minting rights.
    async fn add_minter(&self, minter: Address) -> Result<ActionReceipt, ChainError>;
}

// ============================================================================
// Layer 2: Composite Trait
// ============================================================================

/// Complete game chain interface.
pub trait GameChain: GameReader + GameWriter + Send + Sync {
    /// Backend name (e.g., "EVM").
    fn name(&self) -> &str;

    /// Network name (e.g., "linea-sepolia").
    fn network(&self) -> &str;
}
