//! Client-side game model shared across the PokeChain crates.
//!
//! `game-core` defines the entities read from the game contract (creatures,
//! training grounds, market items), the fixed catalogs the client ships with,
//! and the cheap precondition checks performed before any transaction is
//! submitted. It performs no I/O: the contract remains the source of truth and
//! every value here is either static or a mirror of a live read.
pub mod catalog;
pub mod creature;
pub mod error;
pub mod market;
pub mod training;

pub use catalog::{
    ITEM_IDS, ItemSpec, STARTER_IDS, STARTERS, StarterSpec, TRAINING_GROUNDS, TrainingGround,
    creature_artwork_url, is_starter, item_spec, starter, training_ground,
};
pub use creature::{Creature, CreatureId, CreatureType, TrainingStatus};
pub use error::{
    PreconditionError, check_purchase, check_starter_mint, check_training_start,
};
pub use market::{ItemId, MarketItem, OwnedItem};
pub use training::{XpRates, current_training_xp, has_type_bonus};
