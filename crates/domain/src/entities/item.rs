//! Inventory entries referencing the equipment library.

use serde::{Deserialize, Serialize};

/// An item carried by a character.
///
/// `index` is the equipment library key (for example `longsword`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub index: String,
    pub name: String,
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(index: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            index: index.into(),
            name: name.into(),
            quantity,
        }
    }
}
