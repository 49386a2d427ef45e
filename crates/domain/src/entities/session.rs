//! Scheduled game sessions and the listing de-duplication rule.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::aggregates::SessionProposal;
use crate::value_objects::{truncate_to_minute, TimeSlot};
use crate::{CampaignId, ProposalId, SessionId};

/// A session on the calendar.
///
/// Either entered directly by the DM or produced by finalizing a proposal
/// (`proposal_id` is then set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSession {
    pub id: SessionId,
    pub campaign_id: CampaignId,
    pub title: String,
    pub slot: TimeSlot,
    #[serde(default)]
    pub proposal_id: Option<ProposalId>,
}

impl ScheduledSession {
    pub fn new(campaign_id: CampaignId, title: impl Into<String>, slot: TimeSlot) -> Self {
        Self {
            id: SessionId::new(),
            campaign_id,
            title: title.into().trim().to_string(),
            slot,
            proposal_id: None,
        }
    }

    /// The session a finalized proposal stands for, `None` while voting is open.
    pub fn from_proposal(proposal: &SessionProposal) -> Option<Self> {
        let slot = proposal.chosen_option()?.slot().clone();
        Some(Self {
            id: SessionId::new(),
            campaign_id: proposal.campaign_id(),
            title: proposal.title().to_string(),
            slot,
            proposal_id: Some(proposal.id()),
        })
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.slot.starts_at()
    }

    /// Minute-level start time plus normalised location.
    pub fn dedup_key(&self) -> (NaiveDateTime, String) {
        let starts_at = self.starts_at();
        let minute = starts_at.date().and_time(truncate_to_minute(starts_at.time()));
        (minute, self.slot.location().trim().to_lowercase())
    }
}

/// Keep the first entry for each (minute, location) pair, then order by start.
pub fn dedup_sessions(entries: impl IntoIterator<Item = ScheduledSession>) -> Vec<ScheduledSession> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ScheduledSession> = entries
        .into_iter()
        .filter(|session| seen.insert(session.dedup_key()))
        .collect();
    unique.sort_by_key(ScheduledSession::starts_at);
    unique
}
