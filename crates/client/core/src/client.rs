//! Game client facade.
//!
//! Composes the wallet session, the game chain, the state mirror and the
//! in-flight guard. Every action runs against the connected account and, once
//! confirmed, re-derives the mirror so callers always render post-action state.

use std::future::Future;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;

use client_blockchain_core::{
    ActionKind, ActionReceipt, ChainError, GameChain, MintReceipt, TrainingReceipt,
};
use game_core::{CreatureId, ItemId, MarketItem};

use crate::config::ClientConfig;
use crate::guard::{ActionKey, InFlightGuard};
use crate::mirror::{GameSnapshot, GameStateMirror, MirrorError, MirrorState, MirrorWatcher};
use crate::session::{SessionError, SessionListener, SessionState, WalletSession};

pub struct GameClient {
    session: WalletSession,
    chain: Arc<dyn GameChain>,
    mirror: GameStateMirror,
    guard: InFlightGuard,
    config: ClientConfig,
    listener: Option<SessionListener>,
    watcher: Option<MirrorWatcher>,
}

impl GameClient {
    pub fn new(session: WalletSession, chain: Arc<dyn GameChain>, config: ClientConfig) -> Self {
        let mirror = GameStateMirror::new(Arc::clone(&chain));
        Self {
            session,
            chain,
            mirror,
            guard: InFlightGuard::new(),
            config,
            listener: None,
            watcher: None,
        }
    }

    /// Restore the previous session and, when configured, start following
    /// wallet notifications.
    pub async fn start(&mut self) {
        if self.config.restore_session {
            self.session.restore().await;
        }

        if self.config.follow_wallet {
            self.listener = self.session.listen();
            self.watcher = Some(self.mirror.follow(self.session.subscribe()));
            tracing::info!("Following wallet notifications on {}", self.chain.network());
        } else if let Some(owner) = self.session.address() {
            let _ = self.mirror.refresh(owner).await;
        }
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn mirror(&self) -> &GameStateMirror {
        &self.mirror
    }

    pub fn mirror_state(&self) -> MirrorState {
        self.mirror.state()
    }

    pub fn chain(&self) -> &dyn GameChain {
        self.chain.as_ref()
    }

    pub fn guard(&self) -> &InFlightGuard {
        &self.guard
    }

    /// Ask the wallet for an account. Without a session follower the mirror
    /// is refreshed here.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let address = self.session.connect().await?;
        if self.watcher.is_none() {
            if let Err(err) = self.mirror.refresh(address).await {
                tracing::warn!("Failed to load game state after connecting: {}", err);
            }
        }
        Ok(address)
    }

    pub fn disconnect(&self) {
        self.session.disconnect();
        if self.watcher.is_none() {
            self.mirror.reset();
        }
    }

    /// Re-derive game state for the connected account.
    pub async fn refresh(&self) -> Result<GameSnapshot, MirrorError> {
        let owner = self.account()?;
        self.session.resolve_chain_id().await;
        self.mirror.refresh(owner).await
    }

    pub async fn market_items(&self) -> Vec<MarketItem> {
        self.mirror.market_items().await
    }

    /// XP creature `id` would hold if its training completed now.
    pub async fn training_xp(&self, id: CreatureId) -> Result<u64, ChainError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        self.chain.training_xp(id, now).await
    }

    pub async fn mint_starter(&self, id: CreatureId) -> Result<MintReceipt, ChainError> {
        self.perform(ActionKind::MintStarter, id, |chain| async move {
            chain.mint_starter(id).await
        })
        .await
    }

    pub async fn start_training(
        &self,
        id: CreatureId,
        ground_id: u64,
    ) -> Result<ActionReceipt, ChainError> {
        self.perform(ActionKind::StartTraining, id, |chain| async move {
            chain.start_training(id, ground_id).await
        })
        .await
    }

    pub async fn complete_training(&self, id: CreatureId) -> Result<TrainingReceipt, ChainError> {
        self.perform(ActionKind::CompleteTraining, id, |chain| async move {
            chain.complete_training(id).await
        })
        .await
    }

    pub async fn purchase_item(&self, id: ItemId, amount: u64) -> Result<ActionReceipt, ChainError> {
        self.perform(ActionKind::PurchaseItem, id, |chain| async move {
            chain.purchase_item(id, amount).await
        })
        .await
    }

    pub async fn link_pokecoin(&self, token: Address) -> Result<ActionReceipt, ChainError> {
        self.perform(ActionKind::LinkPokeCoin, 0, |chain| async move {
            chain.link_pokecoin(token).await
        })
        .await
    }

    pub async fn add_minter(&self, minter: Address) -> Result<ActionReceipt, ChainError> {
        self.perform(ActionKind::AddMinter, 0, |chain| async move {
            chain.add_minter(minter).await
        })
        .await
    }

    fn account(&self) -> Result<Address, ChainError> {
        self.session.address().ok_or(ChainError::NotConnected)
    }

    /// Run one guarded action and refresh the mirror once it is confirmed.
    async fn perform<T, F, Fut>(
        &self,
        action: ActionKind,
        target: u64,
        op: F,
    ) -> Result<T, ChainError>
    where
        F: FnOnce(Arc<dyn GameChain>) -> Fut,
        Fut: Future<Output = Result<T, ChainError>>,
    {
        let account = self.account()?;
        let _permit = self.guard.acquire(ActionKey::new(account, action, target))?;

        tracing::info!("Submitting {} (#{}) for {}", action, target, account);
        let result = op(Arc::clone(&self.chain)).await;

        // A missing event is only detected after the receipt confirmed, so the
        // chain has moved on either way.
        if matches!(result, Ok(_) | Err(ChainError::EventNotFound(_))) {
            // A failed refresh only leaves the mirror stale.
            if let Err(err) = self.mirror.refresh(account).await {
                tracing::warn!("Failed to refresh game state after {}: {}", action, err);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ALICE, FakeChain};
    use client_blockchain_core::{ErrorKind, MockWalletProvider, WalletProvider};

    fn client(chain: &Arc<FakeChain>, authorized: bool) -> GameClient {
        let mut wallet = MockWalletProvider::new(59141).with_account(ALICE);
        if authorized {
            wallet = wallet.authorized();
        }
        let provider: Arc<dyn WalletProvider> = Arc::new(wallet);
        let config = ClientConfig {
            restore_session: true,
            follow_wallet: false,
        };
        GameClient::new(WalletSession::new(Some(provider)), chain.clone(), config)
    }

    #[tokio::test]
    async fn actions_require_a_connected_account() {
        let chain = Arc::new(FakeChain::new());
        let client = client(&chain, false);

        let err = client.mint_starter(4).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConnected);
        assert!(chain.actions().is_empty());
    }

    #[tokio::test]
    async fn start_restores_authorized_session() {
        let chain = Arc::new(FakeChain::new());
        chain.give_creature(ALICE, 1);
        let mut client = client(&chain, true);

        client.start().await;
        assert_eq!(client.session_state().address, Some(ALICE));
        let state = client.mirror_state();
        assert_eq!(state.snapshot().unwrap().creatures.len(), 1);
    }

    #[tokio::test]
    async fn confirmed_mint_refreshes_the_mirror() {
        let chain = Arc::new(FakeChain::new());
        let client = client(&chain, false);
        client.connect().await.unwrap();
        assert!(client.mirror_state().snapshot().unwrap().is_new_user);

        let minted = client.mint_starter(4).await.unwrap();
        assert_eq!(minted.token_id, 4);

        let state = client.mirror_state();
        let snapshot = state.snapshot().unwrap();
        assert!(!snapshot.is_new_user);
        assert_eq!(snapshot.creatures[0].name, "Charmander");
    }

    #[tokio::test]
    async fn confirmed_action_without_event_still_refreshes() {
        let chain = Arc::new(FakeChain::new());
        let client = client(&chain, false);
        client.connect().await.unwrap();
        chain.drop_events();

        let err = client.mint_starter(1).await.unwrap_err();
        assert!(matches!(err, ChainError::EventNotFound("TransferSingle")));

        let state = client.mirror_state();
        let snapshot = state.snapshot().unwrap();
        assert!(!snapshot.is_new_user);
        assert_eq!(snapshot.creatures[0].id, 1);
    }

    #[tokio::test]
    async fn purchase_shows_up_in_owned_items() {
        let chain = Arc::new(FakeChain::new());
        let client = client(&chain, false);
        client.connect().await.unwrap();

        client.purchase_item(1, 5).await.unwrap();
        let state = client.mirror_state();
        let items = &state.snapshot().unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, 5);
    }

    #[tokio::test]
    async fn duplicate_submission_is_rejected_while_pending() {
        let chain = Arc::new(FakeChain::new());
        chain.give_creature(ALICE, 4);
        let client = Arc::new(client(&chain, false));
        client.connect().await.unwrap();
        let release = chain.hold_actions();

        let first = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.start_training(4, 2).await }
        });
        let key = ActionKey::new(ALICE, ActionKind::StartTraining, 4);
        while !client.guard().is_in_flight(&key) {
            tokio::task::yield_now().await;
        }

        let err = client.start_training(4, 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ActionInFlight);

        release.notify_one();
        first.await.unwrap().unwrap();
        assert!(!client.guard().is_in_flight(&key));
        assert_eq!(chain.actions(), vec!["train 4 at 2".to_string()]);
    }

    #[tokio::test]
    async fn training_xp_reads_through_the_chain() {
        let chain = Arc::new(FakeChain::new());
        let client = client(&chain, false);
        assert_eq!(client.training_xp(4).await.unwrap(), 42);
    }
}
