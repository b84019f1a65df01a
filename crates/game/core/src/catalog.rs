//! Static catalogs shipped with the client.
//!
//! The contract is authoritative for everything it stores; these tables only
//! cover what the client needs before it can ask (which ids to scan, names for
//! display, minimum levels for the courtesy checks).

use crate::creature::{CreatureId, CreatureType};
use crate::market::ItemId;

const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";
const ITEM_SPRITE_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/items";

/// A starter creature a new account may claim once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StarterSpec {
    pub id: CreatureId,
    pub name: &'static str,
    pub kind: CreatureType,
}

/// Starter ids in scan order. Derived creature lists follow this order.
pub const STARTER_IDS: [CreatureId; 3] = [1, 4, 7];

pub const STARTERS: [StarterSpec; 3] = [
    StarterSpec {
        id: 1,
        name: "Bulbasaur",
        kind: CreatureType::Grass,
    },
    StarterSpec {
        id: 4,
        name: "Charmander",
        kind: CreatureType::Fire,
    },
    StarterSpec {
        id: 7,
        name: "Squirtle",
        kind: CreatureType::Water,
    },
];

pub fn is_starter(id: CreatureId) -> bool {
    STARTER_IDS.contains(&id)
}

pub fn starter(id: CreatureId) -> Option<&'static StarterSpec> {
    STARTERS.iter().find(|spec| spec.id == id)
}

pub fn creature_artwork_url(id: CreatureId) -> String {
    format!("{ARTWORK_BASE}/{id}.png")
}

/// A training ground as known to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrainingGround {
    pub id: u64,
    pub name: &'static str,
    pub description: &'static str,
    /// Type that earns the bonus multiplier; `None` means no bonus.
    pub required_type: Option<CreatureType>,
    pub min_level: u64,
}

pub const TRAINING_GROUNDS: [TrainingGround; 4] = [
    TrainingGround {
        id: 1,
        name: "Basic Training",
        description: "A simple training ground suitable for all Pokemon types.",
        required_type: None,
        min_level: 1,
    },
    TrainingGround {
        id: 2,
        name: "Fire Dojo",
        description: "Intense training ground. Fire-type Pokemon gain bonus XP.",
        required_type: Some(CreatureType::Fire),
        min_level: 5,
    },
    TrainingGround {
        id: 3,
        name: "Water Temple",
        description: "Specialized training ground. Water-type Pokemon gain bonus XP.",
        required_type: Some(CreatureType::Water),
        min_level: 5,
    },
    TrainingGround {
        id: 4,
        name: "Grass Garden",
        description: "Nature-focused training ground. Grass-type Pokemon gain bonus XP.",
        required_type: Some(CreatureType::Grass),
        min_level: 5,
    },
];

pub fn training_ground(id: u64) -> Option<&'static TrainingGround> {
    TRAINING_GROUNDS.iter().find(|ground| ground.id == id)
}

/// A marketplace item id with its display data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSpec {
    pub id: ItemId,
    pub name: &'static str,
    sprite: &'static str,
}

impl ItemSpec {
    pub fn sprite_url(&self) -> String {
        format!("{ITEM_SPRITE_BASE}/{}.png", self.sprite)
    }
}

/// Item ids in scan order.
pub const ITEM_IDS: [ItemId; 4] = [1, 2, 3, 4];

const ITEMS: [ItemSpec; 4] = [
    ItemSpec {
        id: 1,
        name: "Poke Ball",
        sprite: "poke-ball",
    },
    ItemSpec {
        id: 2,
        name: "Great Ball",
        sprite: "great-ball",
    },
    ItemSpec {
        id: 3,
        name: "Ultra Ball",
        sprite: "ultra-ball",
    },
    ItemSpec {
        id: 4,
        name: "Master Ball",
        sprite: "master-ball",
    },
];

pub fn item_spec(id: ItemId) -> Option<&'static ItemSpec> {
    ITEMS.iter().find(|item| item.id == id)
}
