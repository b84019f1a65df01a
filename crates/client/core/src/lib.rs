//! Wallet orchestration for the PokeChain client.
//!
//! Front ends build on this crate rather than on the chain backends directly:
//! - [`WalletSession`]: connection status, active account and chain
//! - [`GameStateMirror`]: new-user flag, owned creatures and items, re-derived
//!   whenever the session changes
//! - [`InFlightGuard`]: one pending submission per account, action and target
//! - [`GameClient`]: facade that runs actions and refreshes the mirror once
//!   they are confirmed
pub mod client;
pub mod config;
pub mod guard;
pub mod mirror;
pub mod session;

#[cfg(test)]
mod testing;

pub use client::GameClient;
pub use config::ClientConfig;
pub use guard::{ActionKey, ActionPermit, InFlightGuard};
pub use mirror::{GameSnapshot, GameStateMirror, MirrorError, MirrorState, MirrorWatcher, load_snapshot};
pub use session::{SessionError, SessionListener, SessionState, WalletSession};
