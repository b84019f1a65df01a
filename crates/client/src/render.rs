//! Plain-text rendering of game values.

use alloy_primitives::U256;
use game_core::{Creature, MarketItem, TrainingStatus, training_ground};

const WEI_DECIMALS: usize = 18;

/// Wei amount as a decimal ether string, e.g. `1.5` or `0.01`.
pub fn format_ether(wei: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(WEI_DECIMALS));
    let whole = wei / unit;
    let fraction = (wei % unit).to_string();
    let padded = format!("{fraction:0>width$}", width = WEI_DECIMALS);
    let trimmed = padded.trim_end_matches('0');
    let fraction = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{whole}.{fraction}")
}

/// One-line creature summary: `#4 Charmander (Fire) Lv 5, 30 XP`.
pub fn creature_line(creature: &Creature) -> String {
    format!(
        "#{} {} ({}) Lv {}, {} XP",
        creature.id, creature.name, creature.kind, creature.level, creature.xp
    )
}

/// Training state relative to `now` (unix seconds).
pub fn training_label(creature: &Creature, now: u64) -> String {
    match creature.training_status() {
        TrainingStatus::Idle => "Idle".to_string(),
        TrainingStatus::Training { since, ground_id } => {
            let ground = training_ground(ground_id)
                .map_or_else(|| format!("ground #{ground_id}"), |g| g.name.to_string());
            let minutes = now.saturating_sub(since) / 60;
            format!("Training at {ground} for {minutes}m")
        }
    }
}

pub fn market_line(item: &MarketItem) -> String {
    let availability = if item.is_available {
        ""
    } else {
        " (unavailable)"
    };
    format!(
        "#{} {} [{}] {} ETH{}",
        item.id,
        item.name,
        item.kind,
        format_ether(item.price),
        availability
    )
}
