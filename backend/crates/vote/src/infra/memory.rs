//! In-memory vote store
//!
//! Arena tables keyed by id behind one `RwLock`. Foreign keys are plain
//! ids looked up in the owning table. Multi-row writes happen under a
//! single write guard, so readers never see half a vote.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{ChoiceId, CommentId, ImageId, UserId, VoteId};
use tokio::sync::RwLock;

use crate::domain::entities::{
    Choice, ChoiceParticipation, Comment, CommentStatus, NewVote, Vote, VoteImage, VoteSummary,
};
use crate::domain::repository::{
    CommentRepository, ParticipationRepository, UserDirectory, VoteListRepository,
    VoteRepository,
};
use crate::domain::services::ordering_time;
use crate::domain::value_objects::{ListCategory, ListQuery};
use crate::error::{VoteError, VoteResult};

#[derive(Default)]
struct Tables {
    next_vote_id: i64,
    next_choice_id: i64,
    next_image_id: i64,
    next_comment_id: i64,
    votes: BTreeMap<VoteId, Vote>,
    choices: BTreeMap<ChoiceId, Choice>,
    images: Vec<VoteImage>,
    participations: BTreeSet<ChoiceParticipation>,
    comments: BTreeMap<CommentId, Comment>,
    user_names: HashMap<UserId, String>,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn choice_ids_of(&self, vote_id: VoteId) -> HashSet<ChoiceId> {
        self.choices
            .values()
            .filter(|c| c.vote_id == vote_id)
            .map(|c| c.id)
            .collect()
    }

    fn participants_of(&self, vote_id: VoteId) -> HashSet<UserId> {
        let choice_ids = self.choice_ids_of(vote_id);
        self.participations
            .iter()
            .filter(|p| choice_ids.contains(&p.choice_id))
            .map(|p| p.user_id)
            .collect()
    }

    fn matches(&self, vote: &Vote, query: &ListQuery) -> bool {
        match query.category {
            ListCategory::Ongoing | ListCategory::Hot => vote.end_datetime > query.now,
            ListCategory::Ended => vote.end_datetime <= query.now,
            ListCategory::Made => vote.writer_id == query.user_id,
            ListCategory::Participated => self.participants_of(vote.id).contains(&query.user_id),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryVoteRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display name for `user_id`.
    pub async fn put_user(&self, user_id: UserId, name: impl Into<String>) {
        self.tables
            .write()
            .await
            .user_names
            .insert(user_id, name.into());
    }

    #[cfg(test)]
    pub(crate) async fn selections_of(&self, vote_id: VoteId, user_id: UserId) -> Vec<ChoiceId> {
        let tables = self.tables.read().await;
        let choice_ids = tables.choice_ids_of(vote_id);
        tables
            .participations
            .iter()
            .filter(|p| p.user_id == user_id && choice_ids.contains(&p.choice_id))
            .map(|p| p.choice_id)
            .collect()
    }
}

// ============================================================================
// Votes
// ============================================================================

impl VoteRepository for InMemoryVoteRepository {
    async fn create(&self, new_vote: NewVote) -> VoteResult<Vote> {
        let mut tables = self.tables.write().await;

        let vote_id = VoteId::from_i64(next_id(&mut tables.next_vote_id));

        for content in &new_vote.choices {
            let id = ChoiceId::from_i64(next_id(&mut tables.next_choice_id));
            tables.choices.insert(
                id,
                Choice {
                    id,
                    vote_id,
                    content: content.clone(),
                },
            );
        }

        for (index, src) in new_vote.image_urls.iter().enumerate() {
            let id = ImageId::from_i64(next_id(&mut tables.next_image_id));
            tables.images.push(VoteImage {
                id,
                vote_id,
                order: index as i32 + 1,
                src: src.clone(),
            });
        }

        let vote = new_vote.into_vote(vote_id);
        tables.votes.insert(vote_id, vote.clone());
        Ok(vote)
    }

    async fn find_by_id(&self, id: VoteId) -> VoteResult<Option<Vote>> {
        Ok(self.tables.read().await.votes.get(&id).cloned())
    }

    async fn find_choices(&self, vote_id: VoteId) -> VoteResult<Vec<Choice>> {
        let tables = self.tables.read().await;
        Ok(tables
            .choices
            .values()
            .filter(|c| c.vote_id == vote_id)
            .cloned()
            .collect())
    }

    async fn find_images(&self, vote_id: VoteId) -> VoteResult<Vec<VoteImage>> {
        let tables = self.tables.read().await;
        let mut images: Vec<VoteImage> = tables
            .images
            .iter()
            .filter(|i| i.vote_id == vote_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.order);
        Ok(images)
    }

    async fn close(&self, id: VoteId, now: DateTime<Utc>) -> VoteResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.votes.get_mut(&id) {
            Some(vote) if vote.end_datetime > now => {
                vote.end_datetime = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl VoteListRepository for InMemoryVoteRepository {
    async fn list_votes(&self, query: &ListQuery) -> VoteResult<Vec<VoteSummary>> {
        let tables = self.tables.read().await;
        let category = query.category;

        let mut rows: Vec<VoteSummary> = tables
            .votes
            .values()
            .filter(|vote| tables.matches(vote, query))
            .filter(|vote| {
                query
                    .cursor
                    .is_none_or(|cursor| cursor.precedes(ordering_time(vote, category), vote.id))
            })
            .map(|vote| VoteSummary {
                vote: vote.clone(),
                participant_count: tables.participants_of(vote.id).len() as i64,
            })
            .filter(|row| {
                category != ListCategory::Hot || row.participant_count >= query.hot_threshold
            })
            .collect();

        rows.sort_by(|a, b| {
            ordering_time(&b.vote, category)
                .cmp(&ordering_time(&a.vote, category))
                .then(a.vote.id.cmp(&b.vote.id))
        });
        rows.truncate(query.limit);
        Ok(rows)
    }
}

// ============================================================================
// Participations
// ============================================================================

impl ParticipationRepository for InMemoryVoteRepository {
    async fn replace(
        &self,
        vote_id: VoteId,
        user_id: UserId,
        choice_ids: &[ChoiceId],
    ) -> VoteResult<()> {
        let mut tables = self.tables.write().await;

        let in_vote = tables.choice_ids_of(vote_id);
        tables
            .participations
            .retain(|p| !(p.user_id == user_id && in_vote.contains(&p.choice_id)));

        for &choice_id in choice_ids {
            tables.participations.insert(ChoiceParticipation { choice_id, user_id });
        }
        Ok(())
    }

    async fn find_for_vote(&self, vote_id: VoteId) -> VoteResult<Vec<ChoiceParticipation>> {
        let tables = self.tables.read().await;
        let in_vote = tables.choice_ids_of(vote_id);
        Ok(tables
            .participations
            .iter()
            .filter(|p| in_vote.contains(&p.choice_id))
            .copied()
            .collect())
    }
}

// ============================================================================
// Comments
// ============================================================================

impl CommentRepository for InMemoryVoteRepository {
    async fn create(
        &self,
        vote_id: VoteId,
        writer_id: UserId,
        content: &str,
        now: DateTime<Utc>,
    ) -> VoteResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.votes.contains_key(&vote_id) {
            return Err(VoteError::VoteNotFound);
        }

        let id = CommentId::from_i64(next_id(&mut tables.next_comment_id));
        let comment = Comment {
            id,
            vote_id,
            writer_id,
            content: content.to_string(),
            create_datetime: now,
            edited_datetime: None,
            status: CommentStatus::Active,
            deleted_datetime: None,
        };
        tables.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: CommentId) -> VoteResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&id)
            .filter(|c| !c.is_deleted())
            .cloned())
    }

    async fn find_active_for_vote(&self, vote_id: VoteId) -> VoteResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.vote_id == vote_id && !c.is_deleted())
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            a.create_datetime
                .cmp(&b.create_datetime)
                .then(a.id.cmp(&b.id))
        });
        Ok(comments)
    }

    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
        now: DateTime<Utc>,
    ) -> VoteResult<()> {
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .get_mut(&id)
            .filter(|c| !c.is_deleted())
            .ok_or(VoteError::CommentNotFound)?;
        comment.content = content.to_string();
        comment.edited_datetime = Some(now);
        Ok(())
    }

    async fn mark_deleted(&self, id: CommentId, now: DateTime<Utc>) -> VoteResult<()> {
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .get_mut(&id)
            .filter(|c| !c.is_deleted())
            .ok_or(VoteError::CommentNotFound)?;
        comment.status = CommentStatus::Deleted;
        comment.deleted_datetime = Some(now);
        Ok(())
    }
}

impl UserDirectory for InMemoryVoteRepository {
    async fn display_names(&self, ids: &[UserId]) -> VoteResult<HashMap<UserId, String>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.user_names.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}
