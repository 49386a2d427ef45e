//! Value objects - Immutable objects defined by their attributes

mod ability;
mod dice;
mod names;
mod time_slot;

pub use ability::{
    Ability, AbilityScoreIncrease, AbilityScores, ASI_SCORE_CAP, MAX_ABILITY_SCORE,
    MIN_ABILITY_SCORE,
};
pub use dice::{DiceFormula, DiceParseError, DiceRollResult};
pub use names::{CampaignName, CharacterName, Username};
pub use time_slot::{truncate_to_minute, TimeSlot};
