//! EVM integration for the PokeChain game contracts.
//!
//! This crate implements the `client-blockchain-core` traits against the
//! PokemonNFT (ERC-1155) and marketplace contracts:
//! - Network match (switch, or register then switch)
//! - Contract handles bound to fixed addresses and ABIs
//! - Action pipeline: gas estimation with padding, submission, confirmation
//!   wait and receipt event decoding
//! - An HTTP JSON-RPC wallet provider for native use
//!
//! # Architecture
//!
//! ```text
//! EvmGameClient (GameReader + GameWriter)
//!   ├─→ ChainGateway ──→ WalletProvider (injected)
//!   │      └─→ ContractHandle (read-only / signing)
//!   └─→ ActionSubmitter (gas padding, confirmations)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_evm::{EvmConfig, EvmGameClient, HttpWalletProvider};
//! use client_blockchain_core::GameReader;
//!
//! let provider = HttpWalletProvider::from_env().await?;
//! let client = EvmGameClient::new(provider.map(|p| Arc::new(p) as _), EvmConfig::from_env()?)?;
//!
//! let is_new = !client.has_starter(owner).await?;
//! ```

pub mod client;
pub mod config;
pub mod contracts;
pub mod gateway;
pub mod http;
pub mod submitter;

pub use client::EvmGameClient;
pub use config::{Confirmations, DEFAULT_POKEMON_CONTRACT, EvmConfig, TrainingCompletionCall};
pub use gateway::{ChainGateway, ContractHandle, ContractKind};
pub use http::HttpWalletProvider;
pub use submitter::{ActionSubmitter, find_event, pad_gas};
