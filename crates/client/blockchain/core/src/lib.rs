//! Blockchain abstraction layer for the PokeChain client.
//!
//! This crate provides a layered, chain-agnostic view of the game contract.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: GameChain (composite trait)
//!          ├── GameReader
//!          └── GameWriter
//!
//! Layer 1: Domain Traits (creatures, training, marketplace)
//!
//! Layer 0: WalletProvider (EIP-1193 style request/notification transport)
//! ```
//!
//! # Design Philosophy
//!
//! - **Layer 0 (Provider)**: Raw wallet requests, no game knowledge
//! - **Layer 1 (Domain)**: Game reads and actions in terms of `game-core` types
//! - **Layer 2 (Composite)**: Complete client interface combining both
//!
//! The provider is always passed explicitly. Notification subscriptions are
//! values; dropping a [`ProviderSubscription`] unsubscribes.
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{GameChain, GameReader, GameWriter};
//!
//! async fn claim(chain: &dyn GameChain, owner: Address) -> Result<(), ChainError> {
//!     if !chain.has_starter(owner).await? {
//!         chain.mint_starter(4).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{ChainError, ErrorKind, ProviderError};

pub use traits::{GameChain, GameReader, GameWriter, ProviderExt, WalletProvider};

pub use types::{
    ActionKind, ActionReceipt, BlockchainConfig, Log, MintReceipt, NativeCurrency,
    NetworkDescriptor, ProviderNotification, ProviderSubscription, TrainingReceipt,
    TransactionReceipt, TransactionRequest, short_address,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockWalletProvider;
