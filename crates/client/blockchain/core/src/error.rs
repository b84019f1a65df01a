//! Error taxonomy surfaced to the user.
//!
//! Provider errors are raw EIP-1193 failures. [`ChainError`] is what every
//! domain operation returns; [`ChainError::kind`] classifies it into the
//! categories a front end renders differently.

use alloy_primitives::B256;
use game_core::PreconditionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ActionKind;

/// EIP-1193 provider error (`{ code, message }`).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL: i64 = -32603;
    /// Generic JSON-RPC server error, used by nodes for reverts.
    pub const SERVER: i64 = -32000;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(Self::USER_REJECTED, "user rejected the request")
    }

    pub fn unrecognized_chain(chain_id: u64) -> Self {
        Self::new(
            Self::UNRECOGNIZED_CHAIN,
            format!("Unrecognized chain ID {chain_id:#x}. Try adding the chain using wallet_addEthereumChain first."),
        )
    }

    pub fn unsupported_method(method: &str) -> Self {
        Self::new(Self::UNSUPPORTED_METHOD, format!("unsupported method: {method}"))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn is_user_rejected(&self) -> bool {
        self.code == Self::USER_REJECTED || self.message.to_lowercase().contains("user rejected")
    }

    pub fn is_insufficient_funds(&self) -> bool {
        self.message.to_lowercase().contains("insufficient funds")
    }

    /// The wallet does not know the chain and it must be added first.
    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == Self::UNRECOGNIZED_CHAIN
            || self.message.to_lowercase().contains("unrecognized chain")
    }
}

/// Category of a [`ChainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingProvider,
    NetworkSwitch,
    UserRejected,
    InsufficientFunds,
    Precondition,
    TransactionFailed,
    ReadFailure,
    ActionInFlight,
    NotConnected,
    Config,
}

/// Errors returned by game reads and actions.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("No wallet provider found. Please install a wallet")]
    MissingProvider,

    #[error("Failed to switch to network {chain_id:#x}: {source}")]
    NetworkSwitch {
        chain_id: u64,
        #[source]
        source: ProviderError,
    },

    #[error("Transaction was rejected")]
    UserRejected,

    #[error("{}", .0.insufficient_funds_message())]
    InsufficientFunds(ActionKind),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("Transaction failed")]
    TransactionFailed { transaction_hash: B256 },

    #[error("{0} event not found in transaction receipt")]
    EventNotFound(&'static str),

    #[error("Failed to {action}: {message}")]
    ActionFailed { action: ActionKind, message: String },

    #[error("Failed to read {what}: {source}")]
    Read {
        what: String,
        #[source]
        source: ProviderError,
    },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("Cannot {action} for #{target}: the same action is already in progress")]
    ActionInFlight { action: ActionKind, target: u64 },

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingProvider => ErrorKind::MissingProvider,
            Self::NetworkSwitch { .. } => ErrorKind::NetworkSwitch,
            Self::UserRejected => ErrorKind::UserRejected,
            Self::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            Self::Precondition(_) => ErrorKind::Precondition,
            Self::TransactionFailed { .. } | Self::EventNotFound(_) | Self::ActionFailed { .. } => {
                ErrorKind::TransactionFailed
            }
            Self::Read { .. } | Self::Decode { .. } => ErrorKind::ReadFailure,
            Self::ActionInFlight { .. } => ErrorKind::ActionInFlight,
            Self::NotConnected => ErrorKind::NotConnected,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Rewords a provider failure raised while performing `action`.
    ///
    /// Rejections and insufficient funds get dedicated messages; anything else
    /// is wrapped as "Failed to <action>: <message>".
    pub fn from_action(action: ActionKind, err: ProviderError) -> Self {
        if err.is_user_rejected() {
            Self::UserRejected
        } else if err.is_insufficient_funds() {
            Self::InsufficientFunds(action)
        } else {
            Self::ActionFailed {
                action,
                message: err.message,
            }
        }
    }

    pub fn read(what: impl Into<String>, source: ProviderError) -> Self {
        Self::Read {
            what: what.into(),
            source,
        }
    }

    pub fn decode(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            what: what.into(),
            message: message.to_string(),
        }
    }
}
