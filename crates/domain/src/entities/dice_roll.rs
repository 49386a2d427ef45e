//! Dice roll log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::DiceRollResult;
use crate::{RollId, UserId};

/// One line of the shared dice log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRollLogEntry {
    pub id: RollId,
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
    /// The expression as the user typed it
    pub expression: String,
    pub rolls: Vec<i32>,
    pub total: i32,
    pub critical: bool,
}

impl DiceRollLogEntry {
    pub fn from_result(
        user_id: UserId,
        expression: impl Into<String>,
        result: &DiceRollResult,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RollId::new(),
            timestamp: now,
            user_id,
            expression: expression.into(),
            rolls: result.individual_rolls.clone(),
            total: result.total,
            critical: result.is_critical(),
        }
    }
}
