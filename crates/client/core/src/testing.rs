//! In-memory game chain for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{Address, B256, U256, address};
use async_trait::async_trait;
use tokio::sync::Notify;

use client_blockchain_core::{
    ActionReceipt, ChainError, GameChain, GameReader, GameWriter, MintReceipt, ProviderError,
    TrainingReceipt,
};
use game_core::{Creature, CreatureId, ItemId, MarketItem, item_spec, starter};

pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("000000000000000000000000000000000000b0b0");

#[derive(Default)]
struct State {
    creatures: HashSet<(Address, CreatureId)>,
    items: HashMap<(Address, ItemId), u64>,
    failing_creatures: HashSet<CreatureId>,
    creature_types: HashMap<CreatureId, String>,
    drop_events: bool,
    fail_has_starter: bool,
    no_marketplace: bool,
    reads: HashMap<&'static str, usize>,
    actions: Vec<String>,
}

pub struct FakeChain {
    state: Mutex<State>,
    signer: Address,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            signer: ALICE,
            hold: Mutex::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn read(&self, name: &'static str) {
        *self.state().reads.entry(name).or_default() += 1;
    }

    pub fn give_creature(&self, owner: Address, id: CreatureId) {
        self.state().creatures.insert((owner, id));
    }

    pub fn give_item(&self, owner: Address, id: ItemId, amount: u64) {
        self.state().items.insert((owner, id), amount);
    }

    pub fn fail_creature(&self, id: CreatureId) {
        self.state().failing_creatures.insert(id);
    }

    /// Report `kind` as the contract's type string for creature `id`.
    pub fn set_creature_type(&self, id: CreatureId, kind: &str) {
        self.state().creature_types.insert(id, kind.to_string());
    }

    /// Confirmed actions come back without their expected event.
    pub fn drop_events(&self) {
        self.state().drop_events = true;
    }

    fn event(&self, name: &'static str) -> Result<(), ChainError> {
        if self.state().drop_events {
            return Err(ChainError::EventNotFound(name));
        }
        Ok(())
    }

    pub fn fail_has_starter(&self) {
        self.state().fail_has_starter = true;
    }

    pub fn disable_marketplace(&self) {
        self.state().no_marketplace = true;
    }

    /// Actions block until the returned notify fires.
    pub fn hold_actions(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn reads(&self, name: &str) -> usize {
        self.state().reads.get(name).copied().unwrap_or(0)
    }

    pub fn actions(&self) -> Vec<String> {
        self.state().actions.clone()
    }

    async fn act(&self, label: String) -> ActionReceipt {
        let hold = self.hold.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }
        let mut state = self.state();
        state.actions.push(label);
        ActionReceipt {
            transaction_hash: B256::with_last_byte(state.actions.len() as u8),
            block_number: 100,
            gas_used: 21_000,
        }
    }

    fn marketplace(&self) -> Result<(), ChainError> {
        if self.state().no_marketplace {
            return Err(ChainError::Config("Marketplace contract not configured".into()));
        }
        Ok(())
    }
}

fn rpc_failure(what: &str) -> ChainError {
    ChainError::read(what, ProviderError::internal("connection reset"))
}

#[async_trait]
impl GameReader for FakeChain {
    async fn has_starter(&self, owner: Address) -> Result<bool, ChainError> {
        self.read("has_starter");
        let state = self.state();
        if state.fail_has_starter {
            return Err(rpc_failure("hasStarterPokemon"));
        }
        Ok(state.creatures.iter().any(|(o, _)| *o == owner))
    }

    async fn creature_balance(&self, owner: Address, id: CreatureId) -> Result<u64, ChainError> {
        self.read("creature_balance");
        Ok(self.state().creatures.contains(&(owner, id)) as u64)
    }

    async fn creature(&self, id: CreatureId) -> Result<Creature, ChainError> {
        self.read("creature");
        if self.state().failing_creatures.contains(&id) {
            return Err(rpc_failure("getPokemonData"));
        }
        let spec = starter(id).ok_or_else(|| rpc_failure("getPokemonData"))?;
        let kind = self
            .state()
            .creature_types
            .get(&id)
            .cloned()
            .unwrap_or_else(|| spec.kind.to_string());
        Ok(Creature {
            id,
            name: spec.name.to_string(),
            kind,
            level: 1,
            xp: 0,
            is_training: false,
            training_start_time: 0,
            training_ground_id: 0,
        })
    }

    async fn token_uri(&self, id: CreatureId) -> Result<String, ChainError> {
        Ok(format!("ipfs://pokemon/{id}.json"))
    }

    async fn training_xp(&self, _id: CreatureId, _now: u64) -> Result<u64, ChainError> {
        Ok(42)
    }

    async fn item_balance(&self, owner: Address, id: ItemId) -> Result<u64, ChainError> {
        self.marketplace()?;
        Ok(self.state().items.get(&(owner, id)).copied().unwrap_or(0))
    }

    async fn market_item(&self, id: ItemId) -> Result<MarketItem, ChainError> {
        self.marketplace()?;
        let spec = item_spec(id).ok_or_else(|| rpc_failure("getItem"))?;
        Ok(MarketItem {
            id,
            name: spec.name.to_string(),
            kind: "ball".into(),
            price: U256::from(id * 1_000),
            is_available: true,
        })
    }
}

#[async_trait]
impl GameWriter for FakeChain {
    async fn mint_starter(&self, id: CreatureId) -> Result<MintReceipt, ChainError> {
        let receipt = self.act(format!("mint {id}")).await;
        self.give_creature(self.signer, id);
        self.event("TransferSingle")?;
        Ok(MintReceipt {
            receipt,
            token_id: id,
            minted_to: self.signer,
        })
    }

    async fn start_training(
        &self,
        id: CreatureId,
        ground_id: u64,
    ) -> Result<ActionReceipt, ChainError> {
        Ok(self.act(format!("train {id} at {ground_id}")).await)
    }

    async fn complete_training(&self, id: CreatureId) -> Result<TrainingReceipt, ChainError> {
        let receipt = self.act(format!("complete {id}")).await;
        self.event("TrainingCompleted")?;
        Ok(TrainingReceipt {
            receipt,
            xp_gained: 42,
        })
    }

    async fn purchase_item(&self, id: ItemId, amount: u64) -> Result<ActionReceipt, ChainError> {
        self.marketplace()?;
        let receipt = self.act(format!("buy {amount} of {id}")).await;
        *self.state().items.entry((self.signer, id)).or_default() += amount;
        Ok(receipt)
    }

    async fn link_pokecoin(&self, token: Address) -> Result<ActionReceipt, ChainError> {
        Ok(self.act(format!("link {token}")).await)
    }

    async fn add_minter(&self, minter: Address) -> Result<ActionReceipt, ChainError> {
        Ok(self.act(format!("minter {minter}")).await)
    }
}

impl GameChain for FakeChain {
    fn name(&self) -> &str {
        "Fake"
    }

    fn network(&self) -> &str {
        "memory"
    }
}
