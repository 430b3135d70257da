//! Close Vote Use Case

use chrono::{DateTime, SubsecRound, Utc};
use kernel::id::{UserId, VoteId};
use std::sync::Arc;

use crate::domain::repository::VoteRepository;
use crate::error::{VoteError, VoteResult};

pub struct CloseVoteUseCase<R>
where
    R: VoteRepository,
{
    vote_repo: Arc<R>,
}

impl<R> CloseVoteUseCase<R>
where
    R: VoteRepository,
{
    pub fn new(vote_repo: Arc<R>) -> Self {
        Self { vote_repo }
    }

    pub async fn execute(&self, vote_id: VoteId, user_id: UserId) -> VoteResult<()> {
        self.execute_at(vote_id, user_id, Utc::now()).await
    }

    /// End the vote now. The end time never moves later.
    pub async fn execute_at(
        &self,
        vote_id: VoteId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> VoteResult<()> {
        let now = now.trunc_subsecs(6);
        let vote = self
            .vote_repo
            .find_by_id(vote_id)
            .await?
            .ok_or(VoteError::VoteNotFound)?;

        if !vote.is_written_by(user_id) {
            return Err(VoteError::VoteNotYours);
        }
        if vote.is_ended_at(now) {
            return Err(VoteError::AlreadyEnded);
        }

        // A concurrent close may have won since the read
        if !self.vote_repo.close(vote_id, now).await? {
            return Err(VoteError::AlreadyEnded);
        }

        tracing::info!(vote_id = %vote_id, "Vote closed");
        Ok(())
    }
}
