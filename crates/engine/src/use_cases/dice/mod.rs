//! Dice roller with a shared, capped roll log.

use std::sync::Arc;

use questboard_domain::{DiceFormula, DiceParseError, DiceRollLogEntry, DiceRollResult};

use crate::infrastructure::ports::{ClockPort, RandomPort};
use crate::infrastructure::state_store::{StateStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum DiceError {
    #[error("You need to log in first")]
    NotLoggedIn,

    #[error("{0}")]
    Parse(#[from] DiceParseError),

    #[error("{0}")]
    Store(#[from] StoreError),
}

pub struct DiceUseCases {
    store: Arc<StateStore>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    log_limit: usize,
}

impl DiceUseCases {
    pub fn new(
        store: Arc<StateStore>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        log_limit: usize,
    ) -> Self {
        Self {
            store,
            clock,
            random,
            log_limit: log_limit.max(1),
        }
    }

    /// Roll an expression such as `1d20+5` and append it to the log.
    pub async fn roll(&self, expression: &str) -> Result<(DiceRollResult, DiceRollLogEntry), DiceError> {
        let user = super::signed_in(&self.store)
            .await
            .ok_or(DiceError::NotLoggedIn)?;
        let formula = DiceFormula::parse(expression)?;
        let result = formula.roll_with(|sides| self.random.gen_range(1, i32::from(sides)));
        let entry =
            DiceRollLogEntry::from_result(user.id, expression.trim(), &result, self.clock.now());

        let limit = self.log_limit;
        self.store
            .mutate(|state| {
                state.dice_log.push(entry.clone());
                let overflow = state.dice_log.len().saturating_sub(limit);
                state.dice_log.drain(..overflow);
                Ok::<_, DiceError>(())
            })
            .await?;

        tracing::info!(user_id = %user.id, expression = %entry.expression, total = result.total, critical = entry.critical, "Dice rolled");
        Ok((result, entry))
    }

    /// The most recent `limit` rolls, newest first.
    pub async fn history(&self, limit: usize) -> Vec<DiceRollLogEntry> {
        self.store
            .read(|state| state.dice_log.iter().rev().take(limit).cloned().collect())
            .await
    }
}
