//! Campaign use cases: creation, membership, notes and table chat.

mod error;

pub use error::CampaignError;

use std::sync::Arc;

use questboard_domain::{Campaign, CampaignId, CampaignName, ChatMessage, User, UserId};

use crate::infrastructure::ports::ClockPort;
use crate::infrastructure::state_store::{AppState, StateStore};

pub struct CampaignUseCases {
    store: Arc<StateStore>,
    clock: Arc<dyn ClockPort>,
}

impl CampaignUseCases {
    pub fn new(store: Arc<StateStore>, clock: Arc<dyn ClockPort>) -> Self {
        Self { store, clock }
    }

    async fn user(&self) -> Result<User, CampaignError> {
        super::signed_in(&self.store)
            .await
            .ok_or(CampaignError::NotLoggedIn)
    }

    /// Create a campaign owned by the current user, who must hold the DM role.
    pub async fn create(&self, name: &str) -> Result<Campaign, CampaignError> {
        let user = self.user().await?;
        if !user.is_dm() {
            return Err(CampaignError::DmRoleRequired);
        }
        let campaign = Campaign::new(user.id, CampaignName::new(name)?, self.clock.now());

        self.store
            .mutate(|state| {
                state.campaigns.push(campaign.clone());
                Ok::<_, CampaignError>(())
            })
            .await?;

        tracing::info!(campaign_id = %campaign.id(), owner_id = %user.id, name = %campaign.name(), "Campaign created");
        Ok(campaign)
    }

    /// Campaigns `user` runs or plays in, oldest first.
    pub async fn list_for_user(&self, user: UserId) -> Vec<Campaign> {
        self.store
            .read(|state| state.campaigns_for(user).into_iter().cloned().collect())
            .await
    }

    /// Load a campaign the current user belongs to.
    pub async fn get(&self, id: CampaignId) -> Result<Campaign, CampaignError> {
        let user = self.user().await?;
        self.store
            .read(|state| {
                let campaign = state.campaign(id).ok_or(CampaignError::NotFound(id))?;
                if !campaign.is_member(user.id) {
                    return Err(CampaignError::NotMember);
                }
                Ok(campaign.clone())
            })
            .await
    }

    /// The current user joins as a player.
    pub async fn join(&self, id: CampaignId) -> Result<Campaign, CampaignError> {
        let user = self.user().await?;
        let campaign = self
            .store
            .mutate(|state| {
                let campaign = state.campaign_mut(id).ok_or(CampaignError::NotFound(id))?;
                campaign.add_player(user.id)?;
                Ok::<_, CampaignError>(campaign.clone())
            })
            .await?;
        tracing::info!(campaign_id = %id, user_id = %user.id, "Player joined campaign");
        Ok(campaign)
    }

    pub async fn add_player(&self, id: CampaignId, username: &str) -> Result<(), CampaignError> {
        let dm = self.user().await?;
        let player_id = self
            .store
            .mutate(|state| {
                let player_id = find_user(state, username)?;
                let campaign = dm_campaign_mut(state, id, dm.id)?;
                campaign.add_player(player_id)?;
                Ok::<_, CampaignError>(player_id)
            })
            .await?;
        tracing::info!(campaign_id = %id, user_id = %player_id, "Player added to campaign");
        Ok(())
    }

    pub async fn remove_player(&self, id: CampaignId, username: &str) -> Result<(), CampaignError> {
        let dm = self.user().await?;
        let player_id = self
            .store
            .mutate(|state| {
                let player_id = find_user(state, username)?;
                let campaign = dm_campaign_mut(state, id, dm.id)?;
                campaign.remove_player(player_id)?;
                Ok::<_, CampaignError>(player_id)
            })
            .await?;
        tracing::info!(campaign_id = %id, user_id = %player_id, "Player removed from campaign");
        Ok(())
    }

    /// Replace the notes every member sees. DM only.
    pub async fn update_shared_notes(&self, id: CampaignId, text: &str) -> Result<(), CampaignError> {
        let dm = self.user().await?;
        self.store
            .mutate(|state| {
                dm_campaign_mut(state, id, dm.id)?.set_shared_notes(text)?;
                Ok::<_, CampaignError>(())
            })
            .await?;
        tracing::info!(campaign_id = %id, "Shared notes updated");
        Ok(())
    }

    /// Replace the current user's own notes for this campaign.
    pub async fn update_private_notes(
        &self,
        id: CampaignId,
        text: &str,
    ) -> Result<(), CampaignError> {
        let user = self.user().await?;
        self.store
            .mutate(|state| {
                member_campaign_mut(state, id, user.id)?.set_private_notes(user.id, text)?;
                Ok::<_, CampaignError>(())
            })
            .await?;
        tracing::debug!(campaign_id = %id, user_id = %user.id, "Private notes updated");
        Ok(())
    }

    pub async fn post_message(&self, id: CampaignId, body: &str) -> Result<ChatMessage, CampaignError> {
        let user = self.user().await?;
        let now = self.clock.now();
        let message = self
            .store
            .mutate(|state| {
                let campaign = member_campaign_mut(state, id, user.id)?;
                let message = campaign.post_message(user.id, body, now)?.clone();
                Ok::<_, CampaignError>(message)
            })
            .await?;
        tracing::debug!(campaign_id = %id, message_id = %message.id, "Chat message posted");
        Ok(message)
    }
}

fn find_user(state: &AppState, username: &str) -> Result<UserId, CampaignError> {
    state
        .user_by_name(username)
        .map(|u| u.id)
        .ok_or_else(|| CampaignError::UserNotFound(username.trim().to_string()))
}

fn dm_campaign_mut(
    state: &mut AppState,
    id: CampaignId,
    user: UserId,
) -> Result<&mut Campaign, CampaignError> {
    let campaign = state.campaign_mut(id).ok_or(CampaignError::NotFound(id))?;
    if !campaign.is_dm(user) {
        return Err(CampaignError::NotCampaignDm);
    }
    Ok(campaign)
}

fn member_campaign_mut(
    state: &mut AppState,
    id: CampaignId,
    user: UserId,
) -> Result<&mut Campaign, CampaignError> {
    let campaign = state.campaign_mut(id).ok_or(CampaignError::NotFound(id))?;
    if !campaign.is_member(user) {
        return Err(CampaignError::NotMember);
    }
    Ok(campaign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{self, add_user, login_as};
    use questboard_domain::Role;

    struct Fixture {
        campaigns: CampaignUseCases,
        store: Arc<StateStore>,
        dm: UserId,
        player: UserId,
    }

    async fn fixture() -> Fixture {
        let store = test_support::store();
        let dm = add_user(&store, "dungeon_mira", Role::Dm).await;
        let player = add_user(&store, "tobin", Role::Player).await;
        Fixture {
            campaigns: CampaignUseCases::new(store.clone(), test_support::clock()),
            store,
            dm,
            player,
        }
    }

    #[tokio::test]
    async fn players_cannot_create_campaigns() {
        let f = fixture().await;
        login_as(&f.store, f.player).await;
        let err = f.campaigns.create("Curse of Strahd").await.expect_err("player");
        assert!(matches!(err, CampaignError::DmRoleRequired));
    }

    #[tokio::test]
    async fn requires_login() {
        let f = fixture().await;
        let err = f.campaigns.create("Curse of Strahd").await.expect_err("anonymous");
        assert!(matches!(err, CampaignError::NotLoggedIn));
    }

    #[tokio::test]
    async fn dm_creates_and_player_joins() {
        let f = fixture().await;
        login_as(&f.store, f.dm).await;
        let campaign = f.campaigns.create("Curse of Strahd").await.expect("create");
        assert_eq!(campaign.owner_id(), f.dm);

        login_as(&f.store, f.player).await;
        assert!(matches!(
            f.campaigns.get(campaign.id()).await,
            Err(CampaignError::NotMember)
        ));
        f.campaigns.join(campaign.id()).await.expect("join");
        assert!(f.campaigns.get(campaign.id()).await.is_ok());
        assert_eq!(f.campaigns.list_for_user(f.player).await.len(), 1);
        assert!(f.campaigns.join(campaign.id()).await.is_err());
    }

    #[tokio::test]
    async fn only_the_dm_manages_players_and_shared_notes() {
        let f = fixture().await;
        login_as(&f.store, f.dm).await;
        let id = f.campaigns.create("Tomb of Annihilation").await.expect("create").id();
        f.campaigns.add_player(id, "TOBIN").await.expect("add by name");
        assert!(matches!(
            f.campaigns.add_player(id, "nobody").await,
            Err(CampaignError::UserNotFound(_))
        ));

        login_as(&f.store, f.player).await;
        assert!(matches!(
            f.campaigns.update_shared_notes(id, "spoilers").await,
            Err(CampaignError::NotCampaignDm)
        ));
        assert!(matches!(
            f.campaigns.remove_player(id, "tobin").await,
            Err(CampaignError::NotCampaignDm)
        ));
        f.campaigns
            .update_private_notes(id, "my secret backstory")
            .await
            .expect("own notes");
        f.campaigns.post_message(id, "hello table").await.expect("chat");

        login_as(&f.store, f.dm).await;
        f.campaigns.remove_player(id, "tobin").await.expect("remove");
        let campaign = f.store.read(|s| s.campaign(id).cloned()).await.expect("exists");
        assert!(!campaign.is_member(f.player));
        assert_eq!(campaign.private_notes(f.player), None);
        assert_eq!(campaign.messages().len(), 1);
    }
}
