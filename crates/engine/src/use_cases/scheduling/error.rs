//! Scheduling and voting errors.

use questboard_domain::{CampaignId, DomainError, ProposalId};

use crate::infrastructure::state_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("You need to log in first")]
    NotLoggedIn,

    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Only the campaign's DM can do that")]
    NotCampaignDm,

    #[error("You are not a member of this campaign")]
    NotMember,

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Store(#[from] StoreError),
}
