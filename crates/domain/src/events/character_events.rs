//! Character progression outcomes
//!
//! These communicate what happened when experience was awarded or a level
//! was applied, so callers can report each step.

use crate::value_objects::AbilityScoreIncrease;

/// Result of adding experience points, before level effects are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub amount: i64,
    pub total_xp: i64,
    pub old_level: u8,
    pub new_level: u8,
}

impl XpAward {
    pub fn levels_gained(&self) -> u8 {
        self.new_level.saturating_sub(self.old_level)
    }
}

/// Effects applied for one level during a level-up replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpOutcome {
    pub level: u8,
    pub hp_gained: i32,
    pub new_max_hp: i32,
    /// Features that were not already on the sheet
    pub features_added: Vec<String>,
    /// Whether this level offered an ability score improvement
    pub ability_increase_offered: bool,
    pub ability_increase: Option<AbilityScoreIncrease>,
}
