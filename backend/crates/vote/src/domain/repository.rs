//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use chrono::{DateTime, Utc};
use kernel::id::{ChoiceId, CommentId, UserId, VoteId};
use std::collections::HashMap;

use crate::domain::entities::{
    Choice, ChoiceParticipation, Comment, NewVote, Vote, VoteImage, VoteSummary,
};
use crate::domain::value_objects::ListQuery;
use crate::error::VoteResult;

#[trait_variant::make(VoteRepository: Send)]
pub trait LocalVoteRepository {
    /// Insert the vote, its choices and its image rows in one unit.
    async fn create(&self, vote: NewVote) -> VoteResult<Vote>;

    async fn find_by_id(&self, id: VoteId) -> VoteResult<Option<Vote>>;

    /// Choices in creation order
    async fn find_choices(&self, vote_id: VoteId) -> VoteResult<Vec<Choice>>;

    /// Images by ascending `order`
    async fn find_images(&self, vote_id: VoteId) -> VoteResult<Vec<VoteImage>>;

    /// Move `end_datetime` to `now` if it is still later than `now`.
    ///
    /// Returns false when the vote had already ended.
    async fn close(&self, id: VoteId, now: DateTime<Utc>) -> VoteResult<bool>;
}

#[trait_variant::make(VoteListRepository: Send)]
pub trait LocalVoteListRepository {
    /// At most `query.limit` rows after `query.cursor`, ordered by
    /// ordering time descending then id ascending.
    async fn list_votes(&self, query: &ListQuery) -> VoteResult<Vec<VoteSummary>>;
}

#[trait_variant::make(ParticipationRepository: Send)]
pub trait LocalParticipationRepository {
    /// Delete every selection of `user_id` in this vote, then insert one
    /// per `choice_ids`. Serialized per (vote, user).
    async fn replace(
        &self,
        vote_id: VoteId,
        user_id: UserId,
        choice_ids: &[ChoiceId],
    ) -> VoteResult<()>;

    async fn find_for_vote(&self, vote_id: VoteId) -> VoteResult<Vec<ChoiceParticipation>>;
}

#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create(
        &self,
        vote_id: VoteId,
        writer_id: UserId,
        content: &str,
        now: DateTime<Utc>,
    ) -> VoteResult<Comment>;

    /// Soft-deleted comments are not returned
    async fn find_by_id(&self, id: CommentId) -> VoteResult<Option<Comment>>;

    /// Non-deleted comments by creation time
    async fn find_active_for_vote(&self, vote_id: VoteId) -> VoteResult<Vec<Comment>>;

    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
        now: DateTime<Utc>,
    ) -> VoteResult<()>;

    async fn mark_deleted(&self, id: CommentId, now: DateTime<Utc>) -> VoteResult<()>;
}

/// Read-only view of user display names
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    /// Ids without a row are absent from the map.
    async fn display_names(&self, ids: &[UserId]) -> VoteResult<HashMap<UserId, String>>;
}

/// Everything the vote handlers need from one store
pub trait VoteStore:
    VoteRepository
    + VoteListRepository
    + ParticipationRepository
    + CommentRepository
    + UserDirectory
    + Send
    + Sync
    + 'static
{
}

impl<T> VoteStore for T where
    T: VoteRepository
        + VoteListRepository
        + ParticipationRepository
        + CommentRepository
        + UserDirectory
        + Send
        + Sync
        + 'static
{
}
