//! Campaign operation errors.

use questboard_domain::{CampaignId, DomainError};

use crate::infrastructure::state_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    #[error("You need to log in first")]
    NotLoggedIn,

    #[error("Campaign not found: {0}")]
    NotFound(CampaignId),

    #[error("No user named '{0}'")]
    UserNotFound(String),

    #[error("Only DM accounts can create campaigns")]
    DmRoleRequired,

    #[error("Only the campaign's DM can do that")]
    NotCampaignDm,

    #[error("You are not a member of this campaign")]
    NotMember,

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Store(#[from] StoreError),
}
