//! Session scheduling: direct entries, proposals, voting and finalization.
//!
//! Two sources feed a campaign's calendar: sessions the DM enters directly
//! and the chosen option of every finalized proposal. Listings merge both and
//! collapse entries that share a minute-level start and a location.

mod error;

pub use error::SchedulingError;

use std::sync::Arc;

use chrono::NaiveDateTime;
use questboard_domain::{
    dedup_sessions, CampaignId, FinalizeOutcome, ProposalId, ScheduledSession, SessionProposal,
    TimeSlot, User, UserId, VoteChoice, VoteOutcome,
};

use crate::infrastructure::ports::ClockPort;
use crate::infrastructure::state_store::{AppState, StateStore};

pub struct SchedulingUseCases {
    store: Arc<StateStore>,
    clock: Arc<dyn ClockPort>,
}

impl SchedulingUseCases {
    pub fn new(store: Arc<StateStore>, clock: Arc<dyn ClockPort>) -> Self {
        Self { store, clock }
    }

    async fn user(&self) -> Result<User, SchedulingError> {
        super::signed_in(&self.store)
            .await
            .ok_or(SchedulingError::NotLoggedIn)
    }

    /// Local wall-clock time, the frame session slots are written in.
    pub fn local_now(&self) -> NaiveDateTime {
        self.clock
            .now()
            .with_timezone(&chrono::Local)
            .naive_local()
    }

    /// Put a session on the calendar without a vote. DM only.
    pub async fn schedule_session(
        &self,
        campaign_id: CampaignId,
        title: &str,
        slot: TimeSlot,
    ) -> Result<ScheduledSession, SchedulingError> {
        let user = self.user().await?;
        let session = ScheduledSession::new(campaign_id, title, slot);
        self.store
            .mutate(|state| {
                ensure_dm(state, campaign_id, user.id)?;
                state.sessions.push(session.clone());
                Ok::<_, SchedulingError>(())
            })
            .await?;
        tracing::info!(campaign_id = %campaign_id, session_id = %session.id, starts_at = %session.starts_at(), "Session scheduled");
        Ok(session)
    }

    /// Open a vote over one or more candidate slots. DM only.
    pub async fn create_proposal(
        &self,
        campaign_id: CampaignId,
        title: &str,
        options: Vec<TimeSlot>,
    ) -> Result<SessionProposal, SchedulingError> {
        let user = self.user().await?;
        let proposal =
            SessionProposal::new(campaign_id, user.id, title, options, self.clock.now())?;
        self.store
            .mutate(|state| {
                ensure_dm(state, campaign_id, user.id)?;
                state.proposals.push(proposal.clone());
                Ok::<_, SchedulingError>(())
            })
            .await?;
        tracing::info!(
            campaign_id = %campaign_id,
            proposal_id = %proposal.id(),
            options = proposal.options().len(),
            "Proposal created"
        );
        Ok(proposal)
    }

    /// Record the current user's answer for one option.
    pub async fn vote(
        &self,
        proposal_id: ProposalId,
        option_index: usize,
        choice: VoteChoice,
    ) -> Result<VoteOutcome, SchedulingError> {
        let user = self.user().await?;
        let outcome = self
            .store
            .mutate(|state| {
                let proposal = member_proposal_mut(state, proposal_id, user.id)?;
                Ok::<_, SchedulingError>(proposal.cast_vote(user.id, option_index, choice)?)
            })
            .await?;
        tracing::info!(proposal_id = %proposal_id, user_id = %user.id, option = option_index, outcome = ?outcome, "Vote cast");
        Ok(outcome)
    }

    pub async fn retract_vote(
        &self,
        proposal_id: ProposalId,
        option_index: usize,
    ) -> Result<Option<VoteChoice>, SchedulingError> {
        let user = self.user().await?;
        let removed = self
            .store
            .mutate(|state| {
                let proposal = member_proposal_mut(state, proposal_id, user.id)?;
                Ok::<_, SchedulingError>(proposal.retract_vote(user.id, option_index)?)
            })
            .await?;
        tracing::info!(proposal_id = %proposal_id, user_id = %user.id, option = option_index, "Vote retracted");
        Ok(removed)
    }

    /// Lock a proposal on one option and put it on the calendar.
    ///
    /// The calendar entry is created only the first time; repeating the call
    /// with the same option changes nothing.
    pub async fn finalize(
        &self,
        proposal_id: ProposalId,
        option_index: usize,
    ) -> Result<FinalizeOutcome, SchedulingError> {
        let user = self.user().await?;
        let outcome = self
            .store
            .mutate(|state| {
                let campaign_id = state
                    .proposal(proposal_id)
                    .map(|p| p.campaign_id())
                    .ok_or(SchedulingError::ProposalNotFound(proposal_id))?;
                ensure_dm(state, campaign_id, user.id)?;

                let proposal = state
                    .proposal_mut(proposal_id)
                    .ok_or(SchedulingError::ProposalNotFound(proposal_id))?;
                let outcome = proposal.finalize(option_index)?;
                if outcome.is_new() {
                    if let Some(session) = ScheduledSession::from_proposal(proposal) {
                        state.sessions.push(session);
                    }
                }
                Ok::<_, SchedulingError>(outcome)
            })
            .await?;

        match outcome {
            FinalizeOutcome::Finalized { starts_at, .. } => {
                tracing::info!(proposal_id = %proposal_id, option = option_index, starts_at = %starts_at, "Proposal finalized");
            }
            FinalizeOutcome::AlreadyFinalized { .. } => {
                tracing::debug!(proposal_id = %proposal_id, "Proposal already finalized on this option");
            }
        }
        Ok(outcome)
    }

    /// A proposal the current user can see.
    pub async fn proposal(&self, proposal_id: ProposalId) -> Result<SessionProposal, SchedulingError> {
        let user = self.user().await?;
        self.store
            .read(|state| {
                let proposal = state
                    .proposal(proposal_id)
                    .ok_or(SchedulingError::ProposalNotFound(proposal_id))?;
                ensure_member(state, proposal.campaign_id(), user.id)?;
                Ok(proposal.clone())
            })
            .await
    }

    /// The campaign calendar, deduplicated and ordered by start.
    pub async fn campaign_sessions(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<ScheduledSession>, SchedulingError> {
        let user = self.user().await?;
        self.store
            .read(|state| {
                ensure_member(state, campaign_id, user.id)?;
                Ok(merged_sessions(state, campaign_id))
            })
            .await
    }

    /// Calendar entries across all of `user`'s campaigns starting at or after `now`.
    pub async fn upcoming_sessions(&self, user: UserId, now: NaiveDateTime) -> Vec<ScheduledSession> {
        self.store
            .read(|state| {
                let entries = state
                    .campaigns_for(user)
                    .into_iter()
                    .flat_map(|c| merged_sessions(state, c.id()))
                    .filter(|s| s.starts_at() >= now);
                dedup_sessions(entries)
            })
            .await
    }

    /// Proposals still accepting votes, oldest first.
    pub async fn open_proposals(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Vec<SessionProposal>, SchedulingError> {
        let user = self.user().await?;
        self.store
            .read(|state| {
                ensure_member(state, campaign_id, user.id)?;
                Ok(state
                    .proposals_for(campaign_id)
                    .into_iter()
                    .filter(|p| !p.is_finalized())
                    .cloned()
                    .collect())
            })
            .await
    }
}

/// Direct sessions plus finalized proposals for one campaign.
fn merged_sessions(state: &AppState, campaign_id: CampaignId) -> Vec<ScheduledSession> {
    let direct = state
        .sessions
        .iter()
        .filter(|s| s.campaign_id == campaign_id)
        .cloned();
    let voted = state
        .proposals_for(campaign_id)
        .into_iter()
        .filter_map(ScheduledSession::from_proposal);
    dedup_sessions(direct.chain(voted))
}

fn ensure_dm(state: &AppState, campaign_id: CampaignId, user: UserId) -> Result<(), SchedulingError> {
    let campaign = state
        .campaign(campaign_id)
        .ok_or(SchedulingError::CampaignNotFound(campaign_id))?;
    if !campaign.is_dm(user) {
        return Err(SchedulingError::NotCampaignDm);
    }
    Ok(())
}

fn ensure_member(
    state: &AppState,
    campaign_id: CampaignId,
    user: UserId,
) -> Result<(), SchedulingError> {
    let campaign = state
        .campaign(campaign_id)
        .ok_or(SchedulingError::CampaignNotFound(campaign_id))?;
    if !campaign.is_member(user) {
        return Err(SchedulingError::NotMember);
    }
    Ok(())
}

fn member_proposal_mut(
    state: &mut AppState,
    proposal_id: ProposalId,
    user: UserId,
) -> Result<&mut SessionProposal, SchedulingError> {
    let campaign_id = state
        .proposal(proposal_id)
        .map(|p| p.campaign_id())
        .ok_or(SchedulingError::ProposalNotFound(proposal_id))?;
    ensure_member(state, campaign_id, user)?;
    state
        .proposal_mut(proposal_id)
        .ok_or(SchedulingError::ProposalNotFound(proposal_id))
}
