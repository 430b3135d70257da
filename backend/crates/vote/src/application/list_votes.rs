//! List Votes Use Case
//!
//! Keyset-paginated lists by category. Pages are built from the last
//! row's `(ordering time, id)`, never an offset, so rows inserted between
//! fetches neither appear mid-walk nor push existing rows out.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use std::sync::Arc;

use crate::application::config::VoteConfig;
use crate::domain::entities::VotePage;
use crate::domain::repository::VoteListRepository;
use crate::domain::services::build_page;
use crate::domain::value_objects::{ListCategory, ListCursor, ListQuery};
use crate::error::VoteResult;

pub struct ListVotesUseCase<R>
where
    R: VoteListRepository,
{
    list_repo: Arc<R>,
    config: Arc<VoteConfig>,
}

impl<R> ListVotesUseCase<R>
where
    R: VoteListRepository,
{
    pub fn new(list_repo: Arc<R>, config: Arc<VoteConfig>) -> Self {
        Self { list_repo, config }
    }

    pub async fn execute(
        &self,
        category: ListCategory,
        user_id: UserId,
        cursor: Option<ListCursor>,
    ) -> VoteResult<VotePage> {
        self.execute_at(category, user_id, cursor, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        category: ListCategory,
        user_id: UserId,
        cursor: Option<ListCursor>,
        now: DateTime<Utc>,
    ) -> VoteResult<VotePage> {
        let query = ListQuery {
            category,
            user_id,
            now,
            cursor,
            limit: self.config.page_size,
            hot_threshold: self.config.hot_threshold,
        };

        let rows = self.list_repo.list_votes(&query).await?;
        tracing::debug!(
            category = %category,
            user_id = %user_id,
            rows = rows.len(),
            "Vote list page"
        );

        Ok(build_page(rows, self.config.page_size, category))
    }
}
