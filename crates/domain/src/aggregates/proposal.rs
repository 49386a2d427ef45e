//! SessionProposal aggregate - candidate time slots open for voting
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: votes can only change through `cast_vote`/`retract_vote`
//! - **Exclusive votes by construction**: each option maps a user to exactly one
//!   `VoteChoice`, so a user can never sit in two categories of the same option
//! - **One-way lock**: `finalize` sets the chosen option once; afterwards the
//!   proposal rejects votes and any other option

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::DomainError;
use crate::events::{FinalizeOutcome, VoteOutcome};
use crate::value_objects::TimeSlot;
use crate::{CampaignId, ProposalId, UserId};

/// A user's answer for one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Yes,
    Maybe,
    No,
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::Maybe => write!(f, "maybe"),
            Self::No => write!(f, "no"),
        }
    }
}

impl std::str::FromStr for VoteChoice {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "maybe" | "m" => Ok(Self::Maybe),
            "no" | "n" => Ok(Self::No),
            other => Err(DomainError::parse(format!(
                "Unknown vote '{}', expected yes, maybe or no",
                other
            ))),
        }
    }
}

/// Vote counts for one option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub yes: usize,
    pub maybe: usize,
    pub no: usize,
}

/// One candidate slot and the votes cast on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalOption {
    slot: TimeSlot,
    #[serde(default)]
    votes: BTreeMap<UserId, VoteChoice>,
}

impl ProposalOption {
    fn new(slot: TimeSlot) -> Self {
        Self {
            slot,
            votes: BTreeMap::new(),
        }
    }

    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    pub fn vote_of(&self, user: UserId) -> Option<VoteChoice> {
        self.votes.get(&user).copied()
    }

    pub fn voters(&self, choice: VoteChoice) -> Vec<UserId> {
        self.votes
            .iter()
            .filter(|(_, c)| **c == choice)
            .map(|(user, _)| *user)
            .collect()
    }

    pub fn tally(&self) -> VoteTally {
        self.votes
            .values()
            .fold(VoteTally::default(), |mut tally, choice| {
                match choice {
                    VoteChoice::Yes => tally.yes += 1,
                    VoteChoice::Maybe => tally.maybe += 1,
                    VoteChoice::No => tally.no += 1,
                }
                tally
            })
    }
}

/// A set of candidate time/location options for a future session.
///
/// # Invariants
///
/// - at least one option
/// - a user holds at most one vote per option
/// - once `chosen` is set it never changes and votes are frozen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProposal {
    id: ProposalId,
    campaign_id: CampaignId,
    proposer_id: UserId,
    title: String,
    options: Vec<ProposalOption>,
    #[serde(default)]
    chosen: Option<usize>,
    created_at: DateTime<Utc>,
}

impl SessionProposal {
    /// Create a proposal with one or more candidate slots.
    pub fn new(
        campaign_id: CampaignId,
        proposer_id: UserId,
        title: impl Into<String>,
        slots: Vec<TimeSlot>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if slots.is_empty() {
            return Err(DomainError::validation(
                "A proposal needs at least one time option",
            ));
        }
        let title = title.into().trim().to_string();
        let title = if title.is_empty() {
            "Next session".to_string()
        } else {
            title
        };
        Ok(Self {
            id: ProposalId::new(),
            campaign_id,
            proposer_id,
            title,
            options: slots.into_iter().map(ProposalOption::new).collect(),
            chosen: None,
            created_at: now,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> ProposalId {
        self.id
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn proposer_id(&self) -> UserId {
        self.proposer_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &[ProposalOption] {
        &self.options
    }

    pub fn option(&self, index: usize) -> Option<&ProposalOption> {
        self.options.get(index)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_finalized(&self) -> bool {
        self.chosen.is_some()
    }

    pub fn chosen_index(&self) -> Option<usize> {
        self.chosen
    }

    pub fn chosen_option(&self) -> Option<&ProposalOption> {
        self.chosen.and_then(|i| self.options.get(i))
    }

    pub fn chosen_starts_at(&self) -> Option<NaiveDateTime> {
        self.chosen_option().map(|o| o.slot.starts_at())
    }

    pub fn tally(&self, index: usize) -> Option<VoteTally> {
        self.options.get(index).map(ProposalOption::tally)
    }

    /// Option with the most yes votes; ties go to fewer no votes, then the
    /// earlier option.
    pub fn best_option(&self) -> Option<usize> {
        self.options
            .iter()
            .enumerate()
            .map(|(i, option)| (i, option.tally()))
            .max_by(|(ia, a), (ib, b)| {
                a.yes
                    .cmp(&b.yes)
                    .then(b.no.cmp(&a.no))
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Record `user`'s answer for one option, replacing any earlier answer on
    /// that option.
    pub fn cast_vote(
        &mut self,
        user: UserId,
        option_index: usize,
        choice: VoteChoice,
    ) -> Result<VoteOutcome, DomainError> {
        self.ensure_open()?;
        let option = self.option_mut(option_index)?;
        let outcome = match option.votes.insert(user, choice) {
            None => VoteOutcome::Recorded(choice),
            Some(previous) if previous == choice => VoteOutcome::Unchanged(choice),
            Some(previous) => VoteOutcome::Changed {
                from: previous,
                to: choice,
            },
        };
        Ok(outcome)
    }

    /// Remove `user`'s answer for one option.
    pub fn retract_vote(
        &mut self,
        user: UserId,
        option_index: usize,
    ) -> Result<Option<VoteChoice>, DomainError> {
        self.ensure_open()?;
        let option = self.option_mut(option_index)?;
        Ok(option.votes.remove(&user))
    }

    /// Lock the proposal on one option.
    ///
    /// Repeating the call with the same option is a no-op; choosing a
    /// different option afterwards is rejected.
    pub fn finalize(&mut self, option_index: usize) -> Result<FinalizeOutcome, DomainError> {
        let starts_at = self
            .options
            .get(option_index)
            .map(|o| o.slot.starts_at())
            .ok_or_else(|| invalid_option(option_index, self.options.len()))?;

        match self.chosen {
            Some(chosen) if chosen == option_index => {
                Ok(FinalizeOutcome::AlreadyFinalized { option_index })
            }
            Some(chosen) => Err(DomainError::invalid_state_transition(format!(
                "Proposal already finalized on option {}",
                chosen + 1
            ))),
            None => {
                self.chosen = Some(option_index);
                Ok(FinalizeOutcome::Finalized {
                    option_index,
                    starts_at,
                })
            }
        }
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_finalized() {
            return Err(DomainError::invalid_state_transition(
                "Voting is closed: the proposal has been finalized",
            ));
        }
        Ok(())
    }

    fn option_mut(&mut self, index: usize) -> Result<&mut ProposalOption, DomainError> {
        let len = self.options.len();
        self.options
            .get_mut(index)
            .ok_or_else(|| invalid_option(index, len))
    }
}

fn invalid_option(index: usize, len: usize) -> DomainError {
    DomainError::validation(format!(
        "Option {} does not exist (proposal has {} options)",
        index + 1,
        len
    ))
}
