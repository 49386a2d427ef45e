//! Questboard domain: campaigns, session proposals, characters and the
//! D&D 5e rules they rely on.
//!
//! This crate is pure: no I/O, no async, no randomness (dice take an
//! injected roller).

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod game_systems;
pub mod ids;
pub mod value_objects;

pub use aggregates::{
    Campaign, CatalogRef, Character, ChatMessage, ProposalOption, SessionProposal, VoteChoice,
    VoteTally,
};
pub use entities::{dedup_sessions, DiceRollLogEntry, InventoryItem, Role, ScheduledSession, User};
pub use error::DomainError;
pub use events::{FinalizeOutcome, LevelUpOutcome, VoteOutcome, XpAward};
pub use game_systems::dnd5e;
pub use ids::{CampaignId, CharacterId, MessageId, ProposalId, RollId, SessionId, UserId};
pub use value_objects::{
    Ability, AbilityScoreIncrease, AbilityScores, CampaignName, CharacterName, DiceFormula,
    DiceParseError, DiceRollResult, TimeSlot, Username,
};
