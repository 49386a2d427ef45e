//! Whole-application state, persisted as one JSON document.
//!
//! The store is the single source of truth for everything the views render.
//! Every mutation rewrites the full document; there are no partial writes.

use std::sync::Arc;

use questboard_domain::{
    Campaign, CampaignId, Character, CharacterId, DiceRollLogEntry, ProposalId, ScheduledSession,
    SessionProposal, User, UserId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{StorageError, StorageProvider};

/// Storage key the state document lives under.
pub const STATE_KEY: &str = "questboard.state";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to save state: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to encode state: {0}")]
    Serialization(String),
}

/// Everything the application knows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub sessions: Vec<ScheduledSession>,
    #[serde(default)]
    pub proposals: Vec<SessionProposal>,
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Oldest first
    #[serde(default)]
    pub dice_log: Vec<DiceRollLogEntry>,
    #[serde(default)]
    pub current_user: Option<UserId>,
}

impl AppState {
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-insensitive username lookup.
    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username.matches(username))
    }

    /// Display name for a user id, falling back to the id itself.
    pub fn username_of(&self, id: UserId) -> String {
        self.user(id)
            .map(|u| u.username.to_string())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.and_then(|id| self.user(id))
    }

    pub fn campaign(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| c.id() == id)
    }

    pub fn campaign_mut(&mut self, id: CampaignId) -> Option<&mut Campaign> {
        self.campaigns.iter_mut().find(|c| c.id() == id)
    }

    pub fn campaigns_for(&self, user: UserId) -> Vec<&Campaign> {
        self.campaigns.iter().filter(|c| c.is_member(user)).collect()
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&SessionProposal> {
        self.proposals.iter().find(|p| p.id() == id)
    }

    pub fn proposal_mut(&mut self, id: ProposalId) -> Option<&mut SessionProposal> {
        self.proposals.iter_mut().find(|p| p.id() == id)
    }

    pub fn proposals_for(&self, campaign: CampaignId) -> Vec<&SessionProposal> {
        self.proposals
            .iter()
            .filter(|p| p.campaign_id() == campaign)
            .collect()
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id() == id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id() == id)
    }
}

/// Shared state handle backed by a [`StorageProvider`].
pub struct StateStore {
    storage: Arc<dyn StorageProvider>,
    state: RwLock<AppState>,
}

impl StateStore {
    /// Read the document from storage.
    ///
    /// A missing document yields the default state; an unreadable one is
    /// logged and also replaced by the default state.
    pub fn load(storage: Arc<dyn StorageProvider>) -> Self {
        let state = match storage.load(STATE_KEY) {
            None => AppState::default(),
            Some(raw) => match serde_json::from_str::<AppState>(&raw) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored state is unreadable, starting fresh");
                    AppState::default()
                }
            },
        };
        tracing::debug!(
            users = state.users.len(),
            campaigns = state.campaigns.len(),
            characters = state.characters.len(),
            "State loaded"
        );
        Self {
            storage,
            state: RwLock::new(state),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let guard = self.state.read().await;
        f(&guard)
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    /// Apply `f` to a copy of the state, save the copy, then make it current.
    ///
    /// If `f` fails or the save fails the in-memory state is left untouched.
    pub async fn mutate<R, E>(&self, f: impl FnOnce(&mut AppState) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.state.write().await;
        let mut next = guard.clone();
        let result = f(&mut next)?;
        self.persist(&next).map_err(E::from)?;
        *guard = next;
        Ok(result)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.read(|s| s.current_user().cloned()).await
    }

    pub async fn set_current_user(&self, user: Option<UserId>) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.current_user = user;
            Ok::<_, StoreError>(())
        })
        .await
    }

    fn persist(&self, state: &AppState) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string(state).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.storage.save(STATE_KEY, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStorageProvider;
    use chrono::Utc;
    use questboard_domain::{Role, Username};

    struct FailingStorage;

    impl StorageProvider for FailingStorage {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io("disk full".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn user(name: &str) -> User {
        User::new(Username::new(name).expect("valid"), "pw", Role::Player, Utc::now())
            .expect("valid user")
    }

    #[tokio::test]
    async fn missing_document_is_default_state() {
        let store = StateStore::load(Arc::new(MemoryStorageProvider::new()));
        let state = store.snapshot().await;
        assert!(state.users.is_empty());
        assert!(state.current_user.is_none());
    }

    #[tokio::test]
    async fn corrupt_document_is_default_state() {
        let storage = Arc::new(MemoryStorageProvider::new());
        storage.save(STATE_KEY, "[1, 2").expect("save");
        let store = StateStore::load(storage);
        assert!(store.snapshot().await.campaigns.is_empty());
    }

    #[tokio::test]
    async fn mutations_are_persisted() {
        let storage = Arc::new(MemoryStorageProvider::new());
        let store = StateStore::load(storage.clone());
        let alice = user("alice");
        let alice_id = alice.id;

        store
            .mutate(|s| {
                s.users.push(alice);
                s.current_user = Some(alice_id);
                Ok::<_, StoreError>(())
            })
            .await
            .expect("mutate");

        let reloaded = StateStore::load(storage);
        let current = reloaded.current_user().await.expect("logged in");
        assert_eq!(current.id, alice_id);
        assert!(reloaded.read(|s| s.user_by_name("ALICE").is_some()).await);
    }

    #[tokio::test]
    async fn failed_closure_leaves_state_untouched() {
        let storage = Arc::new(MemoryStorageProvider::new());
        let store = StateStore::load(storage.clone());

        #[derive(Debug)]
        enum TestError {
            Rejected,
            Store,
        }
        impl From<StoreError> for TestError {
            fn from(_: StoreError) -> Self {
                TestError::Store
            }
        }

        let result: Result<(), TestError> = store
            .mutate(|s| {
                s.users.push(user("bob"));
                Err(TestError::Rejected)
            })
            .await;

        assert!(matches!(result, Err(TestError::Rejected)));
        assert!(store.snapshot().await.users.is_empty());
        assert!(storage.load(STATE_KEY).is_none());
    }

    #[tokio::test]
    async fn failed_save_leaves_state_untouched() {
        let store = StateStore::load(Arc::new(FailingStorage));
        let result = store
            .mutate(|s| {
                s.users.push(user("carol"));
                Ok::<_, StoreError>(())
            })
            .await;

        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert!(store.snapshot().await.users.is_empty());
    }
}
