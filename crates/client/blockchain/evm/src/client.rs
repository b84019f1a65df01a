//! EVM game client implementation.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use client_blockchain_core::{
    ActionKind, ActionReceipt, BlockchainConfig, ChainError, GameChain, GameReader, GameWriter,
    MintReceipt, TrainingReceipt, WalletProvider,
};
use game_core::{
    Creature, CreatureId, ItemId, MarketItem, PreconditionError, XpRates,
    check_purchase, check_starter_mint, check_training_start, current_training_xp,
    training_ground,
};

use crate::config::{EvmConfig, TrainingCompletionCall};
use crate::contracts::{IMarketplace, IPokemonNFT};
use crate::gateway::{ChainGateway, ContractHandle, ContractKind};
use crate::submitter::{ActionSubmitter, find_event};

/// Game client backed by the EVM contracts through a wallet provider.
pub struct EvmGameClient {
    gateway: ChainGateway,
    submitter: ActionSubmitter,
}

impl EvmGameClient {
    /// Create a client. Fails if the configuration does not validate.
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        config: EvmConfig,
    ) -> Result<Self, ChainError> {
        config.validate().map_err(ChainError::Config)?;

        let submitter = ActionSubmitter::from_config(&config);
        Ok(Self {
            gateway: ChainGateway::new(provider, config),
            submitter,
        })
    }

    pub fn gateway(&self) -> &ChainGateway {
        &self.gateway
    }

    fn config(&self) -> &EvmConfig {
        self.gateway.config()
    }

    fn pokemon_contract(&self) -> Address {
        self.config().pokemon_contract
    }

    async fn read_creature(
        handle: &ContractHandle,
        id: CreatureId,
    ) -> Result<Creature, ChainError> {
        let data = handle
            .call(&IPokemonNFT::getPokemonDataCall {
                pokemonId: U256::from(id),
            })
            .await?
            ._0;
        Ok(creature_from_data(id, data))
    }

    async fn read_balance(
        handle: &ContractHandle,
        owner: Address,
        id: u64,
    ) -> Result<u64, ChainError> {
        let balance = match handle.kind() {
            ContractKind::Pokemon => {
                handle
                    .call(&IPokemonNFT::balanceOfCall {
                        account: owner,
                        id: U256::from(id),
                    })
                    .await?
                    ._0
            }
            ContractKind::Marketplace => {
                handle
                    .call(&IMarketplace::balanceOfCall {
                        account: owner,
                        id: U256::from(id),
                    })
                    .await?
                    ._0
            }
        };
        Ok(balance.saturating_to::<u64>())
    }

    async fn read_has_starter(handle: &ContractHandle, owner: Address) -> Result<bool, ChainError> {
        Ok(handle
            .call(&IPokemonNFT::hasStarterPokemonCall { owner })
            .await?
            ._0)
    }

    async fn read_market_item(handle: &ContractHandle, id: ItemId) -> Result<MarketItem, ChainError> {
        let item = handle
            .call(&IMarketplace::getItemCall {
                itemId: U256::from(id),
            })
            .await?
            ._0;

        Ok(MarketItem {
            id,
            name: item.name,
            kind: item.itemType,
            price: item.price,
            is_available: item.isAvailable,
        })
    }

    async fn simple_action<C>(
        &self,
        action: ActionKind,
        call: C,
    ) -> Result<ActionReceipt, ChainError>
    where
        C: alloy_sol_types::SolCall + Send + Sync,
    {
        let handle = self.gateway.signing_handle(ContractKind::Pokemon).await?;
        let receipt = self
            .submitter
            .submit(&handle, action, handle.transaction(&call))
            .await?;
        Ok(receipt.summary())
    }
}

/// Map a contract record onto the domain model.
fn creature_from_data(id: CreatureId, data: IPokemonNFT::PokemonData) -> Creature {
    Creature {
        id,
        name: data.name,
        kind: data.pokemonType,
        level: data.level.saturating_to::<u64>(),
        xp: data.xp.saturating_to::<u64>(),
        is_training: data.isTraining,
        training_start_time: data.trainingStartTime.saturating_to::<u64>(),
        training_ground_id: data.trainingGroundId.saturating_to::<u64>(),
    }
}

#[async_trait]
impl GameReader for EvmGameClient {
    async fn has_starter(&self, owner: Address) -> Result<bool, ChainError> {
        let handle = self.gateway.read_handle(ContractKind::Pokemon).await?;
        Self::read_has_starter(&handle, owner).await
    }

    async fn creature_balance(&self, owner: Address, id: CreatureId) -> Result<u64, ChainError> {
        let handle = self.gateway.read_handle(ContractKind::Pokemon).await?;
        Self::read_balance(&handle, owner, id).await
    }

    async fn creature(&self, id: CreatureId) -> Result<Creature, ChainError> {
        let handle = self.gateway.read_handle(ContractKind::Pokemon).await?;
        Self::read_creature(&handle, id).await
    }

    async fn token_uri(&self, id: CreatureId) -> Result<String, ChainError> {
        let handle = self.gateway.read_handle(ContractKind::Pokemon).await?;
        Ok(handle
            .call(&IPokemonNFT::uriCall { id: U256::from(id) })
            .await?
            ._0)
    }

    async fn training_xp(&self, id: CreatureId, now: u64) -> Result<u64, ChainError> {
        let handle = self.gateway.read_handle(ContractKind::Pokemon).await?;
        let creature = Self::read_creature(&handle, id).await?;
        if !creature.is_training {
            return Ok(creature.xp);
        }

        let rates = XpRates {
            xp_per_minute: handle
                .call(&IPokemonNFT::XP_PER_MINUTECall {})
                .await?
                ._0
                .saturating_to::<u64>(),
            bonus_multiplier: handle
                .call(&IPokemonNFT::TYPE_BONUS_MULTIPLIERCall {})
                .await?
                ._0
                .saturating_to::<u64>(),
        };

        let required = if creature.training_ground_id > 0 {
            let ground = handle
                .call(&IPokemonNFT::getTrainingGroundCall {
                    groundId: U256::from(creature.training_ground_id),
                })
                .await?
                ._0;
            ground.requiredType
        } else {
            String::new()
        };

        Ok(current_training_xp(&creature, now, rates, &required))
    }

    async fn item_balance(&self, owner: Address, id: ItemId) -> Result<u64, ChainError> {
        let handle = self.gateway.read_handle(ContractKind::Marketplace).await?;
        Self::read_balance(&handle, owner, id).await
    }

    async fn market_item(&self, id: ItemId) -> Result<MarketItem, ChainError> {
        let handle = self.gateway.read_handle(ContractKind::Marketplace).await?;
        Self::read_market_item(&handle, id).await
    }
}

#[async_trait]
impl GameWriter for EvmGameClient {
    async fn mint_starter(&self, id: CreatureId) -> Result<MintReceipt, ChainError> {
        let handle = self.gateway.signing_handle(ContractKind::Pokemon).await?;
        let signer = handle.signer().ok_or(ChainError::NotConnected)?;

        let has_starter = Self::read_has_starter(&handle, signer).await?;
        check_starter_mint(has_starter, id)?;

        let call = IPokemonNFT::mintStarterPokemonCall {
            pokemonId: U256::from(id),
        };
        let receipt = self
            .submitter
            .submit(&handle, ActionKind::MintStarter, handle.transaction(&call))
            .await?;

        let minted: IPokemonNFT::TransferSingle =
            find_event(&receipt, self.pokemon_contract(), |event: &IPokemonNFT::TransferSingle| {
                event.from == Address::ZERO
            })
            .ok_or(ChainError::EventNotFound("TransferSingle"))?;

        tracing::info!("Minted starter #{} to {}", minted.id, minted.to);
        Ok(MintReceipt {
            receipt: receipt.summary(),
            token_id: minted.id.saturating_to::<u64>(),
            minted_to: minted.to,
        })
    }

    async fn start_training(
        &self,
        id: CreatureId,
        ground_id: u64,
    ) -> Result<ActionReceipt, ChainError> {
        let handle = self.gateway.signing_handle(ContractKind::Pokemon).await?;
        let signer = handle.signer().ok_or(ChainError::NotConnected)?;

        let balance = Self::read_balance(&handle, signer, id).await?;
        if balance == 0 {
            return Err(PreconditionError::NotOwner(id).into());
        }
        let creature = Self::read_creature(&handle, id).await?;
        let ground =
            training_ground(ground_id).ok_or(PreconditionError::UnknownTrainingGround(ground_id))?;
        check_training_start(balance, &creature, ground)?;

        let call = IPokemonNFT::startTrainingCall {
            pokemonId: U256::from(id),
            groundId: U256::from(ground_id),
        };
        let receipt = self
            .submitter
            .submit(&handle, ActionKind::StartTraining, handle.transaction(&call))
            .await?;

        tracing::info!("{} started training at {}", creature.name, ground.name);
        Ok(receipt.summary())
    }

    async fn complete_training(&self, id: CreatureId) -> Result<TrainingReceipt, ChainError> {
        let handle = self.gateway.signing_handle(ContractKind::Pokemon).await?;

        let verdict = handle
            .call(&IPokemonNFT::canCompleteTrainingCall {
                pokemonId: U256::from(id),
            })
            .await?;
        if !verdict.canComplete {
            return Err(PreconditionError::CannotCompleteTraining(verdict.reason).into());
        }

        let tx = match self.config().completion_call {
            TrainingCompletionCall::Complete => {
                handle.transaction(&IPokemonNFT::completeTrainingCall {
                    pokemonId: U256::from(id),
                })
            }
            TrainingCompletionCall::End => {
                let creature = Self::read_creature(&handle, id).await?;
                handle.transaction(&IPokemonNFT::endTrainingCall {
                    pokemonId: U256::from(id),
                    groundId: U256::from(creature.training_ground_id),
                })
            }
        };
        let receipt = self
            .submitter
            .submit(&handle, ActionKind::CompleteTraining, tx)
            .await?;

        let completed: IPokemonNFT::TrainingCompleted =
            find_event(&receipt, self.pokemon_contract(), |_| true)
                .ok_or(ChainError::EventNotFound("TrainingCompleted"))?;

        let xp_gained = completed.xpGained.saturating_to::<u64>();
        tracing::info!("Training of #{} completed, {} XP gained", id, xp_gained);
        Ok(TrainingReceipt {
            receipt: receipt.summary(),
            xp_gained,
        })
    }

    async fn purchase_item(&self, id: ItemId, amount: u64) -> Result<ActionReceipt, ChainError> {
        let handle = self.gateway.signing_handle(ContractKind::Marketplace).await?;

        let item = Self::read_market_item(&handle, id).await?;
        check_purchase(&item, amount)?;
        let value = item
            .total_price(amount)
            .ok_or(PreconditionError::InvalidAmount)?;

        let call = IMarketplace::purchaseItemCall {
            itemId: U256::from(id),
            amount: U256::from(amount),
        };
        let tx = handle.transaction(&call).value(value);
        let receipt = self
            .submitter
            .submit(&handle, ActionKind::PurchaseItem, tx)
            .await?;

        tracing::info!("Purchased {} x {}", amount, item.name);
        Ok(receipt.summary())
    }

    async fn link_pokecoin(&self, token: Address) -> Result<ActionReceipt, ChainError> {
        self.simple_action(
            ActionKind::LinkPokeCoin,
            IPokemonNFT::setPokeCoinContractCall { pokeCoin: token },
        )
        .await
    }

    async fn add_minter(&self, minter: Address) -> Result<ActionReceipt, ChainError> {
        self.simple_action(ActionKind::AddMinter, IPokemonNFT::addMinterCall { minter })
            .await
    }
}

impl GameChain for EvmGameClient {
    fn name(&self) -> &str {
        "EVM"
    }

    fn network(&self) -> &str {
        self.config().network_name()
    }
}
