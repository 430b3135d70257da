//! Participate Vote Use Case

use chrono::{DateTime, Utc};
use kernel::id::{ChoiceId, UserId, VoteId};
use std::sync::Arc;

use crate::domain::repository::{ParticipationRepository, VoteRepository};
use crate::domain::services::check_participation;
use crate::error::{VoteError, VoteResult};

#[derive(Debug, Clone)]
pub struct ParticipateInput {
    pub choice_ids: Vec<ChoiceId>,
    pub participation_code: Option<String>,
}

pub struct ParticipateVoteUseCase<R>
where
    R: VoteRepository + ParticipationRepository,
{
    repo: Arc<R>,
}

impl<R> ParticipateVoteUseCase<R>
where
    R: VoteRepository + ParticipationRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        vote_id: VoteId,
        user_id: UserId,
        input: ParticipateInput,
    ) -> VoteResult<()> {
        self.execute_at(vote_id, user_id, input, Utc::now()).await
    }

    /// Replaces the caller's previous selections in this vote.
    pub async fn execute_at(
        &self,
        vote_id: VoteId,
        user_id: UserId,
        input: ParticipateInput,
        now: DateTime<Utc>,
    ) -> VoteResult<()> {
        let vote = self
            .repo
            .find_by_id(vote_id)
            .await?
            .ok_or(VoteError::VoteNotFound)?;
        let choices = self.repo.find_choices(vote_id).await?;

        check_participation(
            &vote,
            &choices,
            &input.choice_ids,
            input.participation_code.as_deref(),
            now,
        )?;

        self.repo.replace(vote_id, user_id, &input.choice_ids).await?;

        tracing::info!(
            vote_id = %vote_id,
            user_id = %user_id,
            choices = input.choice_ids.len(),
            "Participation replaced"
        );
        Ok(())
    }
}
