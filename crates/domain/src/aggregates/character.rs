//! Character aggregate - a player character and its progression
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: level, XP and hit points only move through the
//!   progression methods below
//! - **Sequential level-ups**: `apply_level_up` accepts exactly the next level,
//!   so multi-level jumps are replayed one level at a time
//! - **Set-like features**: feature names are merged without duplicates,
//!   keeping first-seen order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::InventoryItem;
use crate::error::DomainError;
use crate::events::{LevelUpOutcome, XpAward};
use crate::game_systems::dnd5e;
use crate::value_objects::{Ability, AbilityScoreIncrease, AbilityScores, CharacterName};
use crate::{CampaignId, CharacterId, UserId};

/// A race, class or subclass picked from the reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRef {
    /// API key, e.g. `half-elf`
    pub index: String,
    /// Display name, e.g. `Half-Elf`
    pub name: String,
}

impl CatalogRef {
    pub fn new(index: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            name: name.into(),
        }
    }
}

/// A player character.
///
/// # Invariants
///
/// - `level` equals `level_from_xp(xp)` whenever the character is persisted
/// - `features` holds no duplicates
/// - every inventory entry has a quantity of at least 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    id: CharacterId,
    owner_id: UserId,
    #[serde(default)]
    campaign_id: Option<CampaignId>,
    name: CharacterName,
    race: CatalogRef,
    class: CatalogRef,
    #[serde(default)]
    subclass: Option<CatalogRef>,
    scores: AbilityScores,
    level: u8,
    xp: i64,
    max_hp: i32,
    hit_die: u8,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    inventory: Vec<InventoryItem>,
    created_at: DateTime<Utc>,
}

impl Character {
    /// A fresh level 1 character with 0 XP and starting hit points.
    pub fn new(
        owner_id: UserId,
        name: CharacterName,
        race: CatalogRef,
        class: CatalogRef,
        scores: AbilityScores,
        hit_die: u8,
        now: DateTime<Utc>,
    ) -> Self {
        let hit_die = if hit_die == 0 {
            dnd5e::DEFAULT_HIT_DIE
        } else {
            hit_die
        };
        Self {
            id: CharacterId::new(),
            owner_id,
            campaign_id: None,
            name,
            race,
            class,
            subclass: None,
            max_hp: dnd5e::starting_hp(hit_die, scores.get(Ability::Con)),
            scores,
            level: 1,
            xp: 0,
            hit_die,
            features: Vec::new(),
            inventory: Vec::new(),
            created_at: now,
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    pub fn with_campaign(mut self, campaign_id: CampaignId) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }

    pub fn with_subclass(mut self, subclass: CatalogRef) -> Self {
        self.subclass = Some(subclass);
        self
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = String>) -> Self {
        self.merge_features(features);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn campaign_id(&self) -> Option<CampaignId> {
        self.campaign_id
    }

    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    pub fn race(&self) -> &CatalogRef {
        &self.race
    }

    pub fn class(&self) -> &CatalogRef {
        &self.class
    }

    pub fn subclass(&self) -> Option<&CatalogRef> {
        self.subclass.as_ref()
    }

    pub fn scores(&self) -> &AbilityScores {
        &self.scores
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn xp(&self) -> i64 {
        self.xp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn hit_die(&self) -> u8 {
        self.hit_die
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn proficiency_bonus(&self) -> i32 {
        dnd5e::proficiency_bonus(self.level)
    }

    /// The level the current XP entitles the character to.
    pub fn expected_level(&self) -> u8 {
        dnd5e::level_from_xp(self.xp)
    }

    /// XP still missing for the next level, `None` at level 20.
    pub fn xp_to_next_level(&self) -> Option<i64> {
        (self.level < dnd5e::MAX_LEVEL)
            .then(|| (dnd5e::xp_for_next_level(self.level) - self.xp).max(0))
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    // =========================================================================
    // Progression
    // =========================================================================

    /// Add experience points. Level effects are applied separately, one level
    /// at a time, through [`Character::apply_level_up`].
    pub fn award_xp(&mut self, amount: i64) -> Result<XpAward, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation(
                "Experience awards must be a positive number",
            ));
        }
        self.xp = self.xp.saturating_add(amount);
        Ok(XpAward {
            amount,
            total_xp: self.xp,
            old_level: self.level,
            new_level: dnd5e::level_from_xp(self.xp).max(self.level),
        })
    }

    /// Apply the effects of reaching `level`, which must be the next level.
    ///
    /// Hit points grow by the hit die plus the current CON modifier, the
    /// fetched class features are merged in, then the optional ability score
    /// improvement is applied.
    pub fn apply_level_up(
        &mut self,
        level: u8,
        class_features: Vec<String>,
        increase: Option<AbilityScoreIncrease>,
    ) -> Result<LevelUpOutcome, DomainError> {
        if level != self.level + 1 || level > dnd5e::MAX_LEVEL {
            return Err(DomainError::invalid_state_transition(format!(
                "Cannot apply level {} to a level {} character",
                level, self.level
            )));
        }

        let hp_gained = dnd5e::hp_gain(self.hit_die, self.scores.get(Ability::Con));
        self.max_hp += hp_gained;
        self.level = level;

        let ability_increase_offered = class_features
            .iter()
            .any(|f| dnd5e::is_ability_score_feature(f));
        let features_added = self.merge_features(class_features);

        if let Some(increase) = increase {
            increase.apply_to(&mut self.scores);
        }

        Ok(LevelUpOutcome {
            level,
            hp_gained,
            new_max_hp: self.max_hp,
            features_added,
            ability_increase_offered,
            ability_increase: increase,
        })
    }

    pub fn apply_ability_increase(&mut self, increase: AbilityScoreIncrease) {
        increase.apply_to(&mut self.scores);
    }

    /// Set-union merge; returns the names that were new.
    pub fn merge_features(&mut self, features: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut added = Vec::new();
        for feature in features {
            let feature = feature.trim().to_string();
            if feature.is_empty() || self.features.contains(&feature) {
                continue;
            }
            self.features.push(feature.clone());
            added.push(feature);
        }
        added
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Add items, stacking with an existing entry of the same index.
    pub fn add_item(
        &mut self,
        index: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
    ) -> Result<&InventoryItem, DomainError> {
        if quantity == 0 {
            return Err(DomainError::validation("Quantity must be at least 1"));
        }
        let index = index.into();
        let existing = self.inventory.iter().position(|i| i.index == index);
        let position = match existing {
            Some(position) => {
                let entry = &mut self.inventory[position];
                entry.quantity = entry.quantity.saturating_add(quantity);
                position
            }
            None => {
                self.inventory
                    .push(InventoryItem::new(index, name, quantity));
                self.inventory.len() - 1
            }
        };
        Ok(&self.inventory[position])
    }

    /// Remove up to `quantity` items; the entry disappears at zero.
    ///
    /// Returns the quantity left.
    pub fn remove_item(&mut self, index: &str, quantity: u32) -> Result<u32, DomainError> {
        let position = self
            .inventory
            .iter()
            .position(|i| i.index == index)
            .ok_or_else(|| DomainError::not_found("InventoryItem", index))?;
        let entry = &mut self.inventory[position];
        entry.quantity = entry.quantity.saturating_sub(quantity.max(1));
        let remaining = entry.quantity;
        if remaining == 0 {
            self.inventory.remove(position);
        }
        Ok(remaining)
    }
}
