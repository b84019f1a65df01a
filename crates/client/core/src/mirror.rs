//! Game state mirror.
//!
//! Derives what the front end shows for the connected account (new-user flag,
//! owned creatures, owned items) by live reads through the game chain. The
//! snapshot is owned here and replaced wholesale on every refresh; nothing is
//! patched in place and nothing is cached between refreshes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::Address;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use client_blockchain_core::{ChainError, ErrorKind, GameChain, GameReader};
use game_core::{Creature, ITEM_IDS, MarketItem, OwnedItem, STARTER_IDS, item_spec};

use crate::session::SessionState;

/// Everything derived for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub owner: Address,
    pub is_new_user: bool,
    /// Owned creatures in starter id order (1, 4, 7).
    pub creatures: Vec<Creature>,
    pub items: Vec<OwnedItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MirrorState {
    /// No connected account.
    #[default]
    Idle,
    Loading,
    Ready(GameSnapshot),
    /// Page-level error from the last refresh.
    Failed(String),
}

impl MirrorState {
    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Failed to load game state: {0}")]
    Chain(#[from] ChainError),

    /// A newer refresh started before this one finished.
    #[error("Refresh superseded by a newer one")]
    Superseded,
}

/// Owner of the derived game state. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct GameStateMirror {
    chain: Arc<dyn GameChain>,
    state: Arc<watch::Sender<MirrorState>>,
    generation: Arc<AtomicU64>,
}

impl GameStateMirror {
    pub fn new(chain: Arc<dyn GameChain>) -> Self {
        let (state, _) = watch::channel(MirrorState::Idle);
        Self {
            chain,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn state(&self) -> MirrorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MirrorState> {
        self.state.subscribe()
    }

    /// Re-derive everything for `owner` and publish it.
    ///
    /// Only the most recent refresh publishes; an older one that finishes
    /// late returns [`MirrorError::Superseded`].
    pub async fn refresh(&self, owner: Address) -> Result<GameSnapshot, MirrorError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(MirrorState::Loading);
        tracing::debug!("Refreshing game state for {} (generation {})", owner, generation);

        let result = load_snapshot(self.chain.as_ref(), owner).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(MirrorError::Superseded);
        }

        match result {
            Ok(snapshot) => {
                tracing::info!(
                    "Loaded {} creatures and {} items for {}",
                    snapshot.creatures.len(),
                    snapshot.items.len(),
                    owner
                );
                self.state.send_replace(MirrorState::Ready(snapshot.clone()));
                Ok(snapshot)
            }
            Err(err) => {
                tracing::error!("Error loading game state: {}", err);
                self.state.send_replace(MirrorState::Failed(err.to_string()));
                Err(err.into())
            }
        }
    }

    /// Drop the snapshot. Any refresh in progress will not publish.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(MirrorState::Idle);
    }

    /// Current marketplace listing. Items that fail to load are omitted.
    pub async fn market_items(&self) -> Vec<MarketItem> {
        let mut items = Vec::new();
        for id in ITEM_IDS {
            match self.chain.market_item(id).await {
                Ok(item) => items.push(item),
                Err(err) if err.kind() == ErrorKind::Config => {
                    tracing::debug!("Marketplace unavailable: {}", err);
                    return Vec::new();
                }
                Err(err) => tracing::warn!("Error loading item {}: {}", id, err),
            }
        }
        items
    }

    /// Re-derive on every session transition that matters: a new account or
    /// a chain change (reload epoch). Disconnecting resets the mirror.
    pub fn follow(&self, mut session: watch::Receiver<SessionState>) -> MirrorWatcher {
        let mirror = self.clone();

        let task = tokio::spawn(async move {
            let mut last = None;
            loop {
                let key = {
                    let state = session.borrow_and_update();
                    (state.address, state.reload_epoch)
                };
                if last != Some(key) {
                    last = Some(key);
                    match key.0 {
                        Some(owner) => {
                            // Failures are published as MirrorState::Failed.
                            let _ = mirror.refresh(owner).await;
                        }
                        None => mirror.reset(),
                    }
                }
                if session.changed().await.is_err() {
                    break;
                }
            }
        });

        MirrorWatcher { task }
    }
}

/// Owns the session-following task; dropping it stops following.
pub struct MirrorWatcher {
    task: JoinHandle<()>,
}

impl Drop for MirrorWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Derive the snapshot for `owner`.
///
/// The starter check is fatal. Per-id reads are best effort: an id whose
/// balance or record cannot be read is logged and left out.
pub async fn load_snapshot(
    chain: &(impl GameReader + ?Sized),
    owner: Address,
) -> Result<GameSnapshot, ChainError> {
    let is_new_user = !chain.has_starter(owner).await?;

    let creatures = if is_new_user {
        Vec::new()
    } else {
        owned_creatures(chain, owner).await
    };
    let items = owned_items(chain, owner).await;

    Ok(GameSnapshot {
        owner,
        is_new_user,
        creatures,
        items,
    })
}

async fn owned_creatures(chain: &(impl GameReader + ?Sized), owner: Address) -> Vec<Creature> {
    let mut creatures = Vec::new();
    for id in STARTER_IDS {
        let balance = match chain.creature_balance(owner, id).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::warn!("Error checking Pokemon {}: {}", id, err);
                continue;
            }
        };
        if balance == 0 {
            continue;
        }
        match chain.creature(id).await {
            Ok(creature) => creatures.push(creature),
            Err(err) => tracing::warn!("Error loading Pokemon {}: {}", id, err),
        }
    }
    creatures
}

async fn owned_items(chain: &(impl GameReader + ?Sized), owner: Address) -> Vec<OwnedItem> {
    let mut items = Vec::new();
    for id in ITEM_IDS {
        match chain.item_balance(owner, id).await {
            Ok(0) => {}
            Ok(amount) => items.push(OwnedItem {
                id,
                name: item_spec(id).map_or_else(|| format!("Item #{id}"), |spec| spec.name.to_string()),
                amount,
            }),
            Err(err) if err.kind() == ErrorKind::Config => return Vec::new(),
            Err(err) => tracing::warn!("Error checking item {}: {}", id, err),
        }
    }
    items
}
