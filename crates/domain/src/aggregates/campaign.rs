//! Campaign aggregate - a DM, their players, notes and table chat

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DomainError;
use crate::value_objects::CampaignName;
use crate::{CampaignId, MessageId, UserId};

const MAX_MESSAGE_LENGTH: usize = 2000;
const MAX_NOTES_LENGTH: usize = 20_000;

/// One chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// A campaign run by one DM.
///
/// # Invariants
///
/// - the owner (DM) is never in the player list
/// - the player list holds no duplicates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    id: CampaignId,
    name: CampaignName,
    owner_id: UserId,
    #[serde(default)]
    players: Vec<UserId>,
    #[serde(default)]
    shared_notes: String,
    #[serde(default)]
    private_notes: BTreeMap<UserId, String>,
    #[serde(default)]
    chat: Vec<ChatMessage>,
    created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn new(owner_id: UserId, name: CampaignName, now: DateTime<Utc>) -> Self {
        Self {
            id: CampaignId::new(),
            name,
            owner_id,
            players: Vec::new(),
            shared_notes: String::new(),
            private_notes: BTreeMap::new(),
            chat: Vec::new(),
            created_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> CampaignId {
        self.id
    }

    pub fn name(&self) -> &CampaignName {
        &self.name
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn players(&self) -> &[UserId] {
        &self.players
    }

    pub fn shared_notes(&self) -> &str {
        &self.shared_notes
    }

    pub fn private_notes(&self, user: UserId) -> Option<&str> {
        self.private_notes.get(&user).map(String::as_str)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// The last `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.chat.len().saturating_sub(n);
        &self.chat[start..]
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_dm(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.is_dm(user) || self.players.contains(&user)
    }

    /// DM first, then players in join order.
    pub fn members(&self) -> Vec<UserId> {
        std::iter::once(self.owner_id)
            .chain(self.players.iter().copied())
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn add_player(&mut self, user: UserId) -> Result<(), DomainError> {
        if self.is_dm(user) {
            return Err(DomainError::constraint("The DM cannot join as a player"));
        }
        if self.players.contains(&user) {
            return Err(DomainError::constraint("Already a member of this campaign"));
        }
        self.players.push(user);
        Ok(())
    }

    pub fn remove_player(&mut self, user: UserId) -> Result<(), DomainError> {
        let before = self.players.len();
        self.players.retain(|p| *p != user);
        if self.players.len() == before {
            return Err(DomainError::not_found("CampaignPlayer", user.to_string()));
        }
        self.private_notes.remove(&user);
        Ok(())
    }

    pub fn rename(&mut self, name: CampaignName) {
        self.name = name;
    }

    pub fn set_shared_notes(&mut self, text: impl Into<String>) -> Result<(), DomainError> {
        self.shared_notes = checked_notes(text.into())?;
        Ok(())
    }

    pub fn set_private_notes(
        &mut self,
        user: UserId,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let text = checked_notes(text.into())?;
        if text.is_empty() {
            self.private_notes.remove(&user);
        } else {
            self.private_notes.insert(user, text);
        }
        Ok(())
    }

    pub fn post_message(
        &mut self,
        author_id: UserId,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&ChatMessage, DomainError> {
        let body = body.into().trim().to_string();
        if body.is_empty() {
            return Err(DomainError::validation("Message cannot be empty"));
        }
        if body.len() > MAX_MESSAGE_LENGTH {
            return Err(DomainError::validation(format!(
                "Message cannot exceed {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        self.chat.push(ChatMessage {
            id: MessageId::new(),
            author_id,
            body,
            sent_at: now,
        });
        Ok(&self.chat[self.chat.len() - 1])
    }
}

fn checked_notes(text: String) -> Result<String, DomainError> {
    if text.len() > MAX_NOTES_LENGTH {
        return Err(DomainError::validation(format!(
            "Notes cannot exceed {} characters",
            MAX_NOTES_LENGTH
        )));
    }
    Ok(text)
}
