//! External service ports: reference data and interactive prompts.

use async_trait::async_trait;
use questboard_domain::AbilityScores;
use serde::{Deserialize, Serialize};

/// A named entry in a reference list (race, class, subclass, equipment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReference {
    pub index: String,
    pub name: String,
}

impl ApiReference {
    pub fn new(index: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            name: name.into(),
        }
    }
}

/// Class data needed by the character creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDetails {
    pub index: String,
    pub name: String,
    pub hit_die: u8,
}

/// Equipment entry for the item library.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentDetails {
    pub index: String,
    pub name: String,
    pub category: Option<String>,
    /// Formatted cost, e.g. "15 gp"
    pub cost: Option<String>,
    pub weight: Option<f64>,
    pub description: Vec<String>,
}

/// Read-only race/class/equipment reference data.
///
/// Implementations never fail: unreachable or malformed data degrades to an
/// empty list or `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceDataPort: Send + Sync {
    async fn list_races(&self) -> Vec<ApiReference>;
    async fn list_classes(&self) -> Vec<ApiReference>;
    async fn list_subclasses(&self, class_index: &str) -> Vec<ApiReference>;
    async fn list_equipment(&self) -> Vec<ApiReference>;
    async fn class_details(&self, class_index: &str) -> Option<ClassDetails>;
    /// Names of the class features gained at exactly `level`.
    async fn class_level_features(&self, class_index: &str, level: u8) -> Vec<String>;
    async fn equipment_details(&self, index: &str) -> Option<EquipmentDetails>;
}

/// Context shown to the user when an ability score improvement is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityIncreasePrompt {
    pub character_name: String,
    pub level: u8,
    pub scores: AbilityScores,
}

/// Asks the user which abilities to raise.
///
/// Returns the raw answer (`"STR"` or `"DEX,CON"`); `None` means no answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AbilityChoicePort: Send + Sync {
    async fn choose_increase(&self, prompt: &AbilityIncreasePrompt) -> Option<String>;
}
