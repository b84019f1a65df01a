//! Client-side precondition checks.
//!
//! These checks short-circuit obviously doomed transactions before any gas is
//! estimated. They are a courtesy only: the contract re-validates everything
//! and may still revert.

use thiserror::Error;

use crate::catalog::{TrainingGround, is_starter};
use crate::creature::{Creature, CreatureId};
use crate::market::{ItemId, MarketItem};

/// A precondition the client can verify cheaply before submitting.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("You already have a starter Pokemon")]
    AlreadyHasStarter,

    #[error("Invalid starter Pokemon selection: {0}")]
    InvalidStarter(CreatureId),

    #[error("You do not own this Pokemon (#{0})")]
    NotOwner(CreatureId),

    #[error("Pokemon #{0} is already training")]
    AlreadyTraining(CreatureId),

    #[error("Unknown training ground: {0}")]
    UnknownTrainingGround(u64),

    #[error("Pokemon level {actual} is below the required level {required}")]
    LevelTooLow { required: u64, actual: u64 },

    /// Reason string returned by `canCompleteTraining`.
    #[error("{0}")]
    CannotCompleteTraining(String),

    #[error("Item #{0} is not available")]
    ItemUnavailable(ItemId),

    #[error("Purchase amount must be at least 1")]
    InvalidAmount,
}

/// Validates a starter mint request.
///
/// Ownership is checked first: an account that already holds a starter is
/// told so whatever id it picked.
pub fn check_starter_mint(
    already_has_starter: bool,
    id: CreatureId,
) -> Result<(), PreconditionError> {
    if already_has_starter {
        return Err(PreconditionError::AlreadyHasStarter);
    }
    if !is_starter(id) {
        return Err(PreconditionError::InvalidStarter(id));
    }
    Ok(())
}

/// Validates that `creature` may start training on `ground`.
pub fn check_training_start(
    balance: u64,
    creature: &Creature,
    ground: &TrainingGround,
) -> Result<(), PreconditionError> {
    if balance == 0 {
        return Err(PreconditionError::NotOwner(creature.id));
    }
    if creature.is_training {
        return Err(PreconditionError::AlreadyTraining(creature.id));
    }
    if creature.level < ground.min_level {
        return Err(PreconditionError::LevelTooLow {
            required: ground.min_level,
            actual: creature.level,
        });
    }
    Ok(())
}

pub fn check_purchase(item: &MarketItem, amount: u64) -> Result<(), PreconditionError> {
    if amount == 0 {
        return Err(PreconditionError::InvalidAmount);
    }
    if !item.is_available {
        return Err(PreconditionError::ItemUnavailable(item.id));
    }
    Ok(())
}
