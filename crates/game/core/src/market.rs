//! Marketplace items.

use alloy_primitives::U256;

/// Token id of a marketplace item.
pub type ItemId = u64;

/// A listed item with its on-chain price.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketItem {
    pub id: ItemId,
    pub name: String,
    pub kind: String,
    /// Price per unit in wei.
    pub price: U256,
    pub is_available: bool,
}

impl MarketItem {
    /// Total value to attach when buying `amount` units, `None` on overflow.
    pub fn total_price(&self, amount: u64) -> Option<U256> {
        self.price.checked_mul(U256::from(amount))
    }
}

/// An item held by the connected account.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnedItem {
    pub id: ItemId,
    pub name: String,
    pub amount: u64,
}
