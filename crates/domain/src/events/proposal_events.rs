//! Outcomes of voting on and finalizing session proposals.

use chrono::NaiveDateTime;

use crate::aggregates::VoteChoice;

/// What happened when a vote was cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// First vote from this user on the option
    Recorded(VoteChoice),
    /// The user moved from one category to another
    Changed { from: VoteChoice, to: VoteChoice },
    /// Same choice as before, nothing changed
    Unchanged(VoteChoice),
}

/// What happened when a proposal was finalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The proposal was locked on this option
    Finalized {
        option_index: usize,
        starts_at: NaiveDateTime,
    },
    /// The proposal was already locked on this option; no change
    AlreadyFinalized { option_index: usize },
}

impl FinalizeOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Finalized { .. })
    }
}
