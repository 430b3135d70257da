//! Comment Use Cases
//!
//! Create, edit and soft-delete comments on a vote. Edit and delete check
//! that the comment belongs to the vote before checking the writer.

use chrono::{DateTime, SubsecRound, Utc};
use kernel::id::{CommentId, UserId, VoteId};
use std::sync::Arc;

use crate::domain::entities::Comment;
use crate::domain::repository::{CommentRepository, VoteRepository};
use crate::domain::services::{check_comment_access, check_comment_content};
use crate::error::{VoteError, VoteResult};

async fn load_own_comment<R>(
    repo: &R,
    vote_id: VoteId,
    comment_id: CommentId,
    user_id: UserId,
) -> VoteResult<Comment>
where
    R: VoteRepository + CommentRepository,
{
    VoteRepository::find_by_id(repo, vote_id)
        .await?
        .ok_or(VoteError::VoteNotFound)?;

    let comment = CommentRepository::find_by_id(repo, comment_id)
        .await?
        .ok_or(VoteError::CommentNotFound)?;

    check_comment_access(&comment, vote_id, user_id)?;
    Ok(comment)
}

// ============================================================================
// Create
// ============================================================================

pub struct CreateCommentUseCase<R>
where
    R: VoteRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> CreateCommentUseCase<R>
where
    R: VoteRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        vote_id: VoteId,
        writer_id: UserId,
        content: &str,
    ) -> VoteResult<Comment> {
        check_comment_content(content)?;

        VoteRepository::find_by_id(self.repo.as_ref(), vote_id)
            .await?
            .ok_or(VoteError::VoteNotFound)?;

        let comment = CommentRepository::create(
            self.repo.as_ref(),
            vote_id,
            writer_id,
            content,
            Utc::now().trunc_subsecs(6),
        )
        .await?;

        tracing::info!(vote_id = %vote_id, comment_id = %comment.id, "Comment created");
        Ok(comment)
    }
}

// ============================================================================
// Edit
// ============================================================================

pub struct EditCommentUseCase<R>
where
    R: VoteRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> EditCommentUseCase<R>
where
    R: VoteRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        vote_id: VoteId,
        comment_id: CommentId,
        user_id: UserId,
        content: &str,
    ) -> VoteResult<()> {
        self.execute_at(vote_id, comment_id, user_id, content, Utc::now())
            .await
    }

    /// Overwrites the content and stamps the edit time. No history is kept.
    pub async fn execute_at(
        &self,
        vote_id: VoteId,
        comment_id: CommentId,
        user_id: UserId,
        content: &str,
        now: DateTime<Utc>,
    ) -> VoteResult<()> {
        check_comment_content(content)?;
        load_own_comment(self.repo.as_ref(), vote_id, comment_id, user_id).await?;

        self.repo
            .update_content(comment_id, content, now.trunc_subsecs(6))
            .await?;

        tracing::info!(vote_id = %vote_id, comment_id = %comment_id, "Comment edited");
        Ok(())
    }
}

// ============================================================================
// Delete
// ============================================================================

pub struct DeleteCommentUseCase<R>
where
    R: VoteRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteCommentUseCase<R>
where
    R: VoteRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        vote_id: VoteId,
        comment_id: CommentId,
        user_id: UserId,
    ) -> VoteResult<()> {
        load_own_comment(self.repo.as_ref(), vote_id, comment_id, user_id).await?;

        self.repo
            .mark_deleted(comment_id, Utc::now().trunc_subsecs(6))
            .await?;

        tracing::info!(vote_id = %vote_id, comment_id = %comment_id, "Comment deleted");
        Ok(())
    }
}
