//! Character use cases: creation, experience and leveling, inventory.
//!
//! # Leveling
//!
//! Awarding XP can cross several thresholds at once. Each crossed level is
//! replayed in order: its class features are fetched, an ability score
//! improvement is offered when one of them grants it, then the level's hit
//! points and features are applied. The result is saved once at the end.

mod error;

pub use error::CharacterError;

use std::sync::Arc;

use questboard_domain::{
    dnd5e, AbilityScoreIncrease, AbilityScores, CampaignId, CatalogRef, Character, CharacterId,
    CharacterName, InventoryItem, LevelUpOutcome, User, UserId, XpAward,
};

use crate::infrastructure::ports::{
    AbilityChoicePort, AbilityIncreasePrompt, ApiReference, ClockPort, ReferenceDataPort,
};
use crate::infrastructure::state_store::{AppState, StateStore};

/// Choices offered by the character creator.
#[derive(Debug, Clone, Default)]
pub struct ReferenceOptions {
    pub races: Vec<ApiReference>,
    pub classes: Vec<ApiReference>,
}

#[derive(Debug, Clone)]
pub struct CreateCharacterInput {
    pub name: String,
    pub race_index: String,
    pub class_index: String,
    pub subclass_index: Option<String>,
    /// STR, DEX, CON, INT, WIS, CHA
    pub scores: [i32; 6],
    pub campaign_id: Option<CampaignId>,
}

/// Everything that happened during one XP award.
#[derive(Debug, Clone)]
pub struct XpReport {
    pub award: XpAward,
    pub levels: Vec<LevelUpOutcome>,
}

pub struct CharacterUseCases {
    store: Arc<StateStore>,
    reference: Arc<dyn ReferenceDataPort>,
    chooser: Arc<dyn AbilityChoicePort>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterUseCases {
    pub fn new(
        store: Arc<StateStore>,
        reference: Arc<dyn ReferenceDataPort>,
        chooser: Arc<dyn AbilityChoicePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            store,
            reference,
            chooser,
            clock,
        }
    }

    async fn user(&self) -> Result<User, CharacterError> {
        super::signed_in(&self.store)
            .await
            .ok_or(CharacterError::NotLoggedIn)
    }

    /// Races and classes for the creator; empty when the API is unreachable.
    pub async fn reference_options(&self) -> ReferenceOptions {
        let (races, classes) =
            tokio::join!(self.reference.list_races(), self.reference.list_classes());
        ReferenceOptions { races, classes }
    }

    pub async fn create(&self, input: CreateCharacterInput) -> Result<Character, CharacterError> {
        let user = self.user().await?;
        let name = CharacterName::new(input.name)?;
        let scores = AbilityScores::new(input.scores)?;

        if let Some(campaign_id) = input.campaign_id {
            self.store
                .read(|state| {
                    let campaign = state
                        .campaign(campaign_id)
                        .ok_or(CharacterError::CampaignNotFound(campaign_id))?;
                    if !campaign.is_member(user.id) {
                        return Err(CharacterError::NotMember);
                    }
                    Ok(())
                })
                .await?;
        }

        let class_index = normalize_index(&input.class_index);
        let race_index = normalize_index(&input.race_index);
        let (races, classes, class_details, level_one) = tokio::join!(
            self.reference.list_races(),
            self.reference.list_classes(),
            self.reference.class_details(&class_index),
            self.reference.class_level_features(&class_index, 1),
        );

        let race = resolve(&races, &race_index);
        let class = resolve(&classes, &class_index);
        let hit_die = match class_details {
            Some(details) if details.hit_die > 0 => details.hit_die,
            _ => dnd5e::hit_die_for_class(&class.index),
        };

        let mut character = Character::new(
            user.id,
            name,
            race,
            class,
            scores,
            hit_die,
            self.clock.now(),
        )
        .with_features(level_one);

        if let Some(subclass_index) = input.subclass_index.as_deref().map(normalize_index) {
            if !subclass_index.is_empty() {
                let subclasses = self.reference.list_subclasses(&class_index).await;
                character = character.with_subclass(resolve(&subclasses, &subclass_index));
            }
        }
        if let Some(campaign_id) = input.campaign_id {
            character = character.with_campaign(campaign_id);
        }

        self.store
            .mutate(|state| {
                state.characters.push(character.clone());
                Ok::<_, CharacterError>(())
            })
            .await?;

        tracing::info!(
            character_id = %character.id(),
            owner_id = %user.id,
            class = %character.class().index,
            hit_die = character.hit_die(),
            "Character created"
        );
        Ok(character)
    }

    /// A character the current user owns or shares a campaign with.
    pub async fn get(&self, id: CharacterId) -> Result<Character, CharacterError> {
        let user = self.user().await?;
        self.store
            .read(|state| {
                let character = state.character(id).ok_or(CharacterError::NotFound(id))?;
                if !can_view(state, character, user.id) {
                    return Err(CharacterError::NotVisible);
                }
                Ok(character.clone())
            })
            .await
    }

    pub async fn list_for_user(&self, user: UserId) -> Vec<Character> {
        self.store
            .read(|state| {
                state
                    .characters
                    .iter()
                    .filter(|c| c.is_owned_by(user))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn list_for_campaign(&self, campaign_id: CampaignId) -> Vec<Character> {
        self.store
            .read(|state| {
                state
                    .characters
                    .iter()
                    .filter(|c| c.campaign_id() == Some(campaign_id))
                    .cloned()
                    .collect()
            })
            .await
    }

    /// Award experience and replay every level crossed.
    ///
    /// Allowed for the DM of the character's campaign, or for the owner when
    /// the character is not in a campaign.
    pub async fn award_xp(&self, id: CharacterId, amount: i64) -> Result<XpReport, CharacterError> {
        let user = self.user().await?;
        let mut character = self
            .store
            .read(|state| {
                let character = state.character(id).ok_or(CharacterError::NotFound(id))?;
                ensure_can_award(state, character, user.id)?;
                Ok::<_, CharacterError>(character.clone())
            })
            .await?;

        let award = character.award_xp(amount)?;
        let mut levels = Vec::new();
        for level in dnd5e::level_up_plan(award.old_level, award.new_level) {
            let features = self
                .reference
                .class_level_features(&character.class().index, level)
                .await;
            let increase = if features.iter().any(|f| dnd5e::is_ability_score_feature(f)) {
                self.ask_for_increase(&character, level).await
            } else {
                None
            };
            let outcome = character.apply_level_up(level, features, increase)?;
            tracing::info!(
                character_id = %id,
                level = outcome.level,
                hp_gained = outcome.hp_gained,
                features_added = outcome.features_added.len(),
                "Level applied"
            );
            levels.push(outcome);
        }

        self.replace(character).await?;
        tracing::info!(character_id = %id, amount, total_xp = award.total_xp, new_level = award.new_level, "Experience awarded");
        Ok(XpReport { award, levels })
    }

    async fn ask_for_increase(&self, character: &Character, level: u8) -> Option<AbilityScoreIncrease> {
        let prompt = AbilityIncreasePrompt {
            character_name: character.name().to_string(),
            level,
            scores: *character.scores(),
        };
        let answer = self.chooser.choose_increase(&prompt).await?;
        let parsed = AbilityScoreIncrease::parse(&answer);
        if parsed.is_none() {
            tracing::warn!(level, answer = %answer, "Ability score improvement skipped: invalid choice");
        }
        parsed
    }

    /// Apply an ability score improvement from raw input. Owner only.
    ///
    /// Empty or invalid input changes nothing and returns `false`.
    pub async fn apply_ability_increase(
        &self,
        id: CharacterId,
        input: &str,
    ) -> Result<bool, CharacterError> {
        let user = self.user().await?;
        let Some(increase) = AbilityScoreIncrease::parse(input) else {
            self.owned(id, user.id).await?;
            return Ok(false);
        };
        self.store
            .mutate(|state| {
                let character = owned_mut(state, id, user.id)?;
                character.apply_ability_increase(increase);
                Ok::<_, CharacterError>(())
            })
            .await?;
        tracing::info!(character_id = %id, increase = %increase, "Ability scores increased");
        Ok(true)
    }

    /// Add equipment by library index, stacking with what is already carried.
    pub async fn add_item(
        &self,
        id: CharacterId,
        index: &str,
        quantity: u32,
    ) -> Result<InventoryItem, CharacterError> {
        let user = self.user().await?;
        self.owned(id, user.id).await?;

        let index = normalize_index(index);
        let name = self
            .reference
            .equipment_details(&index)
            .await
            .map(|d| d.name)
            .unwrap_or_else(|| display_name(&index));

        let item = self
            .store
            .mutate(|state| {
                let character = owned_mut(state, id, user.id)?;
                Ok::<_, CharacterError>(character.add_item(index.as_str(), name, quantity)?.clone())
            })
            .await?;
        tracing::info!(character_id = %id, item = %item.index, quantity = item.quantity, "Item added");
        Ok(item)
    }

    /// Remove up to `quantity` of an item; returns what is left.
    pub async fn remove_item(
        &self,
        id: CharacterId,
        index: &str,
        quantity: u32,
    ) -> Result<u32, CharacterError> {
        let user = self.user().await?;
        let index = normalize_index(index);
        let remaining = self
            .store
            .mutate(|state| {
                let character = owned_mut(state, id, user.id)?;
                Ok::<_, CharacterError>(character.remove_item(&index, quantity)?)
            })
            .await?;
        tracing::info!(character_id = %id, item = %index, remaining, "Item removed");
        Ok(remaining)
    }

    async fn owned(&self, id: CharacterId, user: UserId) -> Result<(), CharacterError> {
        self.store
            .read(|state| {
                let character = state.character(id).ok_or(CharacterError::NotFound(id))?;
                if !character.is_owned_by(user) {
                    return Err(CharacterError::NotOwner);
                }
                Ok(())
            })
            .await
    }

    async fn replace(&self, character: Character) -> Result<(), CharacterError> {
        self.store
            .mutate(|state| {
                let slot = state
                    .character_mut(character.id())
                    .ok_or(CharacterError::NotFound(character.id()))?;
                *slot = character;
                Ok(())
            })
            .await
    }
}

fn owned_mut(
    state: &mut AppState,
    id: CharacterId,
    user: UserId,
) -> Result<&mut Character, CharacterError> {
    let character = state.character_mut(id).ok_or(CharacterError::NotFound(id))?;
    if !character.is_owned_by(user) {
        return Err(CharacterError::NotOwner);
    }
    Ok(character)
}

fn can_view(state: &AppState, character: &Character, user: UserId) -> bool {
    character.is_owned_by(user)
        || character
            .campaign_id()
            .and_then(|c| state.campaign(c))
            .is_some_and(|c| c.is_member(user))
}

fn ensure_can_award(
    state: &AppState,
    character: &Character,
    user: UserId,
) -> Result<(), CharacterError> {
    match character.campaign_id() {
        Some(campaign_id) => {
            let campaign = state
                .campaign(campaign_id)
                .ok_or(CharacterError::CampaignNotFound(campaign_id))?;
            if campaign.is_dm(user) {
                Ok(())
            } else {
                Err(CharacterError::NotCampaignDm)
            }
        }
        None if character.is_owned_by(user) => Ok(()),
        None => Err(CharacterError::NotOwner),
    }
}

fn normalize_index(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "-")
}

/// `half-elf` -> `Half Elf`, used when the reference API has no entry.
fn display_name(index: &str) -> String {
    index
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn resolve(options: &[ApiReference], index: &str) -> CatalogRef {
    options
        .iter()
        .find(|o| o.index == index)
        .map(|o| CatalogRef::new(o.index.clone(), o.name.clone()))
        .unwrap_or_else(|| CatalogRef::new(index, display_name(index)))
}
