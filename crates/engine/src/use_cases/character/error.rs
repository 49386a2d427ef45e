//! Character operation errors.

use questboard_domain::{CampaignId, CharacterId, DomainError};

use crate::infrastructure::state_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("You need to log in first")]
    NotLoggedIn,

    #[error("Character not found: {0}")]
    NotFound(CharacterId),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    #[error("You are not a member of this campaign")]
    NotMember,

    #[error("Only the character's owner can do that")]
    NotOwner,

    #[error("Only the campaign's DM can award experience")]
    NotCampaignDm,

    #[error("You cannot view this character")]
    NotVisible,

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Store(#[from] StoreError),
}
