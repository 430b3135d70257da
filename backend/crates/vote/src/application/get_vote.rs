//! Get Vote Use Case
//!
//! Assembles the detail view of one vote for one viewer. Participant
//! counts and names follow `result_visibility`.

use chrono::{DateTime, Utc};
use kernel::id::{UserId, VoteId};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::entities::{Choice, Comment, UNKNOWN_WRITER_NAME, Vote, VoteImage};
use crate::domain::repository::{
    CommentRepository, ParticipationRepository, UserDirectory, VoteRepository,
};
use crate::domain::services::{ResultVisibility, result_visibility};
use crate::error::{VoteError, VoteResult};

#[derive(Debug, Clone)]
pub struct ChoiceDetail {
    pub choice: Choice,
    /// The viewer picked this choice
    pub participated: bool,
    pub participants_count: Option<i64>,
    pub participants_name: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct CommentDetail {
    pub comment: Comment,
    pub writer_name: String,
    pub is_mine: bool,
}

#[derive(Debug, Clone)]
pub struct VoteDetail {
    pub vote: Vote,
    pub writer_name: String,
    pub is_writer: bool,
    pub images: Vec<VoteImage>,
    pub choices: Vec<ChoiceDetail>,
    pub comments: Vec<CommentDetail>,
    pub visibility: ResultVisibility,
}

pub struct GetVoteUseCase<R>
where
    R: VoteRepository + ParticipationRepository + CommentRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> GetVoteUseCase<R>
where
    R: VoteRepository + ParticipationRepository + CommentRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, vote_id: VoteId, viewer: UserId) -> VoteResult<VoteDetail> {
        self.execute_at(vote_id, viewer, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        vote_id: VoteId,
        viewer: UserId,
        now: DateTime<Utc>,
    ) -> VoteResult<VoteDetail> {
        let vote = VoteRepository::find_by_id(self.repo.as_ref(), vote_id)
            .await?
            .ok_or(VoteError::VoteNotFound)?;

        let choices = self.repo.find_choices(vote_id).await?;
        let images = self.repo.find_images(vote_id).await?;
        let participations = self.repo.find_for_vote(vote_id).await?;
        let comments = self.repo.find_active_for_vote(vote_id).await?;

        let user_ids: Vec<UserId> = std::iter::once(vote.writer_id)
            .chain(participations.iter().map(|p| p.user_id))
            .chain(comments.iter().map(|c| c.writer_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let names = self.repo.display_names(&user_ids).await?;
        let name_of = |id: UserId| {
            names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_WRITER_NAME.to_string())
        };

        let visibility = result_visibility(&vote, now);

        let choices = choices
            .into_iter()
            .map(|choice| {
                let participants: Vec<UserId> = participations
                    .iter()
                    .filter(|p| p.choice_id == choice.id)
                    .map(|p| p.user_id)
                    .collect();

                ChoiceDetail {
                    participated: participants.contains(&viewer),
                    participants_count: visibility
                        .counts
                        .then_some(participants.len() as i64),
                    participants_name: visibility
                        .names
                        .then(|| participants.iter().map(|&id| name_of(id)).collect()),
                    choice,
                }
            })
            .collect();

        let comments = comments
            .into_iter()
            .map(|comment| CommentDetail {
                writer_name: name_of(comment.writer_id),
                is_mine: comment.writer_id == viewer,
                comment,
            })
            .collect();

        Ok(VoteDetail {
            writer_name: name_of(vote.writer_id),
            is_writer: vote.is_written_by(viewer),
            vote,
            images,
            choices,
            comments,
            visibility,
        })
    }
}
