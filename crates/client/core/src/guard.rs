//! In-flight action guard.
//!
//! Rejects a second submission of the same action for the same account and
//! target while the first one is still pending (e.g. "train" pressed twice).

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::Address;
use client_blockchain_core::{ActionKind, ChainError};

/// Identity of a pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionKey {
    pub account: Address,
    pub action: ActionKind,
    /// Creature or item id; 0 for actions without a target.
    pub target: u64,
}

impl ActionKey {
    pub fn new(account: Address, action: ActionKind, target: u64) -> Self {
        Self {
            account,
            action,
            target,
        }
    }
}

/// Set of actions currently in flight.
#[derive(Clone, Default)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<ActionKey>>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn active(&self) -> MutexGuard<'_, HashSet<ActionKey>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `key`. The claim is released when the permit is dropped.
    pub fn acquire(&self, key: ActionKey) -> Result<ActionPermit, ChainError> {
        if !self.active().insert(key) {
            tracing::warn!("{} for #{} already in flight", key.action, key.target);
            return Err(ChainError::ActionInFlight {
                action: key.action,
                target: key.target,
            });
        }

        Ok(ActionPermit {
            key,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_in_flight(&self, key: &ActionKey) -> bool {
        self.active().contains(key)
    }
}

/// Claim on an [`ActionKey`]; releases it on drop.
pub struct ActionPermit {
    key: ActionKey,
    active: Arc<Mutex<HashSet<ActionKey>>>,
}

impl ActionPermit {
    pub fn key(&self) -> &ActionKey {
        &self.key
    }
}

impl Drop for ActionPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
