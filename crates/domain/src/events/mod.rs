//! Domain events
//!
//! Outcome enums returned by aggregate mutations.

mod character_events;
mod proposal_events;

pub use character_events::{LevelUpOutcome, XpAward};
pub use proposal_events::{FinalizeOutcome, VoteOutcome};
