//! Training XP projection.
//!
//! The contract accrues XP over elapsed training time and only settles it when
//! training completes. The projection below lets the client show the value a
//! completion would award right now, using the contract's own constants.

use crate::creature::Creature;

const SECONDS_PER_MINUTE: u64 = 60;

/// Rate constants read from the contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpRates {
    /// `XP_PER_MINUTE()`
    pub xp_per_minute: u64,
    /// `TYPE_BONUS_MULTIPLIER()`, in percent (150 = 1.5x).
    pub bonus_multiplier: u64,
}

/// Whether a ground favouring `required` gives a bonus to `kind`.
///
/// Both sides are contract strings compared case-insensitively. An empty
/// `required` means the ground has no bonus type.
pub fn has_type_bonus(required: &str, kind: &str) -> bool {
    !required.is_empty() && required.eq_ignore_ascii_case(kind)
}

/// XP the creature would hold if training completed at `now` (unix seconds).
///
/// Idle creatures report their stored XP. A start time in the future counts
/// as zero elapsed minutes.
pub fn current_training_xp(
    creature: &Creature,
    now: u64,
    rates: XpRates,
    ground_type: &str,
) -> u64 {
    if !creature.is_training {
        return creature.xp;
    }

    let minutes = now.saturating_sub(creature.training_start_time) / SECONDS_PER_MINUTE;
    let base = creature
        .xp
        .saturating_add(minutes.saturating_mul(rates.xp_per_minute));

    if creature.training_ground_id > 0 && has_type_bonus(ground_type, &creature.kind) {
        let boosted = u128::from(base) * u128::from(rates.bonus_multiplier) / 100;
        u64::try_from(boosted).unwrap_or(u64::MAX)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES: XpRates = XpRates {
        xp_per_minute: 2,
        bonus_multiplier: 150,
    };

    fn squirtle(is_training: bool, start: u64, ground: u64) -> Creature {
        Creature {
            id: 7,
            name: "Squirtle".into(),
            kind: "Water".into(),
            level: 5,
            xp: 10,
            is_training,
            training_start_time: start,
            training_ground_id: ground,
        }
    }

    #[test]
    fn idle_creature_reports_stored_xp() {
        let creature = squirtle(false, 0, 0);
        assert_eq!(current_training_xp(&creature, 10_000, RATES, ""), 10);
    }

    #[test]
    fn accrues_whole_minutes_only() {
        let creature = squirtle(true, 1_000, 1);
        // 179 seconds = 2 whole minutes
        assert_eq!(current_training_xp(&creature, 1_179, RATES, ""), 14);
    }

    #[test]
    fn matching_ground_applies_bonus() {
        let creature = squirtle(true, 1_000, 3);
        // (10 + 5 * 2) * 150 / 100 = 30
        assert_eq!(
            current_training_xp(&creature, 1_300, RATES, "water"),
            30
        );
        // wrong type, no bonus
        assert_eq!(
            current_training_xp(&creature, 1_300, RATES, "Fire"),
            20
        );
    }

    #[test]
    fn bonus_matches_free_form_types() {
        assert!(has_type_bonus("Grass/Poison", "grass/poison"));
        assert!(!has_type_bonus("", ""));
        assert!(!has_type_bonus("Grass", "Grass/Poison"));
    }

    #[test]
    fn clock_skew_does_not_underflow() {
        let creature = squirtle(true, 5_000, 1);
        assert_eq!(current_training_xp(&creature, 4_000, RATES, ""), 10);
    }
}
