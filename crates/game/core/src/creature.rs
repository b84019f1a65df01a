//! Creature records as reported by the game contract.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Token id of a creature (one of the starter ids).
pub type CreatureId = u64;

/// Elemental types the client knows by name.
///
/// The contract stores types as free-form strings; parsing is
/// case-insensitive and strings outside this list stay on the creature as-is.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CreatureType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
}

/// Full creature record for one owned token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    /// `pokemonType` exactly as the contract reports it.
    pub kind: String,
    /// Level, never below 1 on-chain.
    pub level: u64,
    /// Experience within the current level (conventionally 0..=100).
    pub xp: u64,
    pub is_training: bool,
    /// Unix seconds; 0 while idle.
    pub training_start_time: u64,
    /// 0 while idle.
    pub training_ground_id: u64,
}

/// Training state derived from the three training fields.
///
/// The contract sets and clears the fields together, so a creature is either
/// fully idle or fully training.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrainingStatus {
    Idle,
    Training { since: u64, ground_id: u64 },
}

impl Creature {
    /// Known elemental type, if the reported string names one.
    pub fn creature_type(&self) -> Option<CreatureType> {
        self.kind.parse().ok()
    }

    pub fn training_status(&self) -> TrainingStatus {
        if self.is_training {
            TrainingStatus::Training {
                since: self.training_start_time,
                ground_id: self.training_ground_id,
            }
        } else {
            TrainingStatus::Idle
        }
    }
}
