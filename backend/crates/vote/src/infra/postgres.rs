//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ChoiceId, CommentId, ImageId, UserId, VoteId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use crate::domain::entities::{
    Choice, ChoiceParticipation, Comment, CommentStatus, NewVote, Vote, VoteImage, VoteSummary,
};
use crate::domain::repository::{
    CommentRepository, ParticipationRepository, UserDirectory, VoteListRepository,
    VoteRepository,
};
use crate::domain::value_objects::{ListCategory, ListQuery};
use crate::error::{VoteError, VoteResult};

const VOTE_COLUMNS: &str = r#"
    id,
    writer_id,
    title,
    content,
    participation_code_required,
    participation_code,
    realtime_result,
    multiple_choice,
    anonymous_choice,
    create_datetime,
    end_datetime
"#;

const COMMENT_COLUMNS: &str = r#"
    id,
    vote_id,
    writer_id,
    content,
    create_datetime,
    edited_datetime,
    is_deleted,
    deleted_datetime
"#;

/// Advisory lock key serializing participation writes per (vote, user)
fn participation_lock_key(vote_id: VoteId, user_id: UserId) -> i64 {
    vote_id.as_i64().wrapping_shl(32) ^ user_id.as_i64()
}

/// PostgreSQL-backed vote repository
#[derive(Clone)]
pub struct PgVoteRepository {
    pool: PgPool,
}

impl PgVoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Votes
// ============================================================================

impl VoteRepository for PgVoteRepository {
    async fn create(&self, vote: NewVote) -> VoteResult<Vote> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, VoteRow>(&format!(
            r#"
            INSERT INTO votes (
                writer_id,
                title,
                content,
                participation_code_required,
                participation_code,
                realtime_result,
                multiple_choice,
                anonymous_choice,
                create_datetime,
                end_datetime
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {VOTE_COLUMNS}
            "#
        ))
        .bind(vote.writer_id.as_i64())
        .bind(&vote.title)
        .bind(&vote.content)
        .bind(vote.participation_code_required)
        .bind(&vote.participation_code)
        .bind(vote.realtime_result)
        .bind(vote.multiple_choice)
        .bind(vote.anonymous_choice)
        .bind(vote.create_datetime)
        .bind(vote.end_datetime)
        .fetch_one(&mut *tx)
        .await?;

        for content in &vote.choices {
            sqlx::query("INSERT INTO choices (vote_id, content) VALUES ($1, $2)")
                .bind(row.id)
                .bind(content)
                .execute(&mut *tx)
                .await?;
        }

        for (index, src) in vote.image_urls.iter().enumerate() {
            sqlx::query("INSERT INTO vote_images (vote_id, image_order, src) VALUES ($1, $2, $3)")
                .bind(row.id)
                .bind(index as i32 + 1)
                .bind(src)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(row.into_vote())
    }

    async fn find_by_id(&self, id: VoteId) -> VoteResult<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {VOTE_COLUMNS} FROM votes WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VoteRow::into_vote))
    }

    async fn find_choices(&self, vote_id: VoteId) -> VoteResult<Vec<Choice>> {
        let rows = sqlx::query_as::<_, (i64, i64, String)>(
            "SELECT id, vote_id, content FROM choices WHERE vote_id = $1 ORDER BY id",
        )
        .bind(vote_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, vote_id, content)| Choice {
                id: ChoiceId::from_i64(id),
                vote_id: VoteId::from_i64(vote_id),
                content,
            })
            .collect())
    }

    async fn find_images(&self, vote_id: VoteId) -> VoteResult<Vec<VoteImage>> {
        let rows = sqlx::query_as::<_, (i64, i64, i32, String)>(
            r#"
            SELECT id, vote_id, image_order, src
            FROM vote_images
            WHERE vote_id = $1
            ORDER BY image_order
            "#,
        )
        .bind(vote_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, vote_id, order, src)| VoteImage {
                id: ImageId::from_i64(id),
                vote_id: VoteId::from_i64(vote_id),
                order,
                src,
            })
            .collect())
    }

    async fn close(&self, id: VoteId, now: DateTime<Utc>) -> VoteResult<bool> {
        let updated = sqlx::query(
            "UPDATE votes SET end_datetime = $2 WHERE id = $1 AND end_datetime > $2",
        )
        .bind(id.as_i64())
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Lists
// ============================================================================

/// One page of summaries in keyset order: time DESC, then id ASC
fn build_list_query(query: &ListQuery) -> QueryBuilder<'static, Postgres> {
    let order_column = if query.category.orders_by_end() {
        "v.end_datetime"
    } else {
        "v.create_datetime"
    };

    let mut qb = QueryBuilder::<Postgres>::new(
        r#"
        SELECT
            v.id,
            v.writer_id,
            v.title,
            v.content,
            v.participation_code_required,
            v.participation_code,
            v.realtime_result,
            v.multiple_choice,
            v.anonymous_choice,
            v.create_datetime,
            v.end_datetime,
            COUNT(DISTINCT cp.user_id) AS participant_count
        FROM votes v
        LEFT JOIN choices c ON c.vote_id = v.id
        LEFT JOIN choice_participations cp ON cp.choice_id = c.id
        WHERE "#,
    );

    match query.category {
        ListCategory::Ongoing | ListCategory::Hot => {
            qb.push("v.end_datetime > ").push_bind(query.now);
        }
        ListCategory::Ended => {
            qb.push("v.end_datetime <= ").push_bind(query.now);
        }
        ListCategory::Made => {
            qb.push("v.writer_id = ").push_bind(query.user_id.as_i64());
        }
        ListCategory::Participated => {
            qb.push(
                r#"EXISTS (
                    SELECT 1 FROM choice_participations p
                    JOIN choices pc ON pc.id = p.choice_id
                    WHERE pc.vote_id = v.id AND p.user_id = "#,
            )
            .push_bind(query.user_id.as_i64())
            .push(")");
        }
    }

    // Keyset: strictly after the last row already returned
    if let Some(cursor) = query.cursor {
        qb.push(" AND (")
            .push(order_column)
            .push(" < ")
            .push_bind(cursor.time)
            .push(" OR (")
            .push(order_column)
            .push(" = ")
            .push_bind(cursor.time)
            .push(" AND v.id > ")
            .push_bind(cursor.id.as_i64())
            .push("))");
    }

    qb.push(" GROUP BY v.id");

    // Aggregate only over rows that passed the keyset filter
    if query.category == ListCategory::Hot {
        qb.push(" HAVING COUNT(DISTINCT cp.user_id) >= ")
            .push_bind(query.hot_threshold);
    }

    qb.push(" ORDER BY ")
        .push(order_column)
        .push(" DESC, v.id ASC LIMIT ")
        .push_bind(query.limit as i64);

    qb
}

impl VoteListRepository for PgVoteRepository {
    async fn list_votes(&self, query: &ListQuery) -> VoteResult<Vec<VoteSummary>> {
        let mut qb = build_list_query(query);

        let rows = qb
            .build_query_as::<VoteSummaryRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| VoteSummary {
                vote: row.vote.into_vote(),
                participant_count: row.participant_count,
            })
            .collect())
    }
}

// ============================================================================
// Participations
// ============================================================================

impl ParticipationRepository for PgVoteRepository {
    async fn replace(
        &self,
        vote_id: VoteId,
        user_id: UserId,
        choice_ids: &[ChoiceId],
    ) -> VoteResult<()> {
        let mut tx = self.pool.begin().await?;

        // Held until commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(participation_lock_key(vote_id, user_id))
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM choice_participations
            WHERE user_id = $1
              AND choice_id IN (SELECT id FROM choices WHERE vote_id = $2)
            "#,
        )
        .bind(user_id.as_i64())
        .bind(vote_id.as_i64())
        .execute(&mut *tx)
        .await?;

        let ids: Vec<i64> = choice_ids.iter().map(ChoiceId::as_i64).collect();
        sqlx::query(
            r#"
            INSERT INTO choice_participations (user_id, choice_id)
            SELECT $1, UNNEST($2::BIGINT[])
            "#,
        )
        .bind(user_id.as_i64())
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_for_vote(&self, vote_id: VoteId) -> VoteResult<Vec<ChoiceParticipation>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT cp.choice_id, cp.user_id
            FROM choice_participations cp
            JOIN choices c ON c.id = cp.choice_id
            WHERE c.vote_id = $1
            ORDER BY cp.choice_id, cp.user_id
            "#,
        )
        .bind(vote_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(choice_id, user_id)| ChoiceParticipation {
                choice_id: ChoiceId::from_i64(choice_id),
                user_id: UserId::from_i64(user_id),
            })
            .collect())
    }
}

// ============================================================================
// Comments
// ============================================================================

impl CommentRepository for PgVoteRepository {
    async fn create(
        &self,
        vote_id: VoteId,
        writer_id: UserId,
        content: &str,
        now: DateTime<Utc>,
    ) -> VoteResult<Comment> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            INSERT INTO comments (vote_id, writer_id, content, create_datetime)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(vote_id.as_i64())
        .bind(writer_id.as_i64())
        .bind(content)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_comment())
    }

    async fn find_by_id(&self, id: CommentId) -> VoteResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1 AND NOT is_deleted"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn find_active_for_vote(&self, vote_id: VoteId) -> VoteResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE vote_id = $1 AND NOT is_deleted
            ORDER BY create_datetime, id
            "#
        ))
        .bind(vote_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn update_content(
        &self,
        id: CommentId,
        content: &str,
        now: DateTime<Utc>,
    ) -> VoteResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE comments SET
                content = $2,
                is_edited = TRUE,
                edited_datetime = $3
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id.as_i64())
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(VoteError::CommentNotFound);
        }
        Ok(())
    }

    async fn mark_deleted(&self, id: CommentId, now: DateTime<Utc>) -> VoteResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE comments SET
                is_deleted = TRUE,
                deleted_datetime = $2
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id.as_i64())
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(VoteError::CommentNotFound);
        }
        Ok(())
    }
}

impl UserDirectory for PgVoteRepository {
    async fn display_names(&self, ids: &[UserId]) -> VoteResult<HashMap<UserId, String>> {
        let ids: Vec<i64> = ids.iter().map(UserId::as_i64).collect();
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, name FROM users WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| (UserId::from_i64(id), name))
            .collect())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct VoteRow {
    id: i64,
    writer_id: i64,
    title: String,
    content: String,
    participation_code_required: bool,
    participation_code: Option<String>,
    realtime_result: bool,
    multiple_choice: bool,
    anonymous_choice: bool,
    create_datetime: DateTime<Utc>,
    end_datetime: DateTime<Utc>,
}

impl VoteRow {
    fn into_vote(self) -> Vote {
        Vote {
            id: VoteId::from_i64(self.id),
            writer_id: UserId::from_i64(self.writer_id),
            title: self.title,
            content: self.content,
            participation_code_required: self.participation_code_required,
            participation_code: self.participation_code,
            realtime_result: self.realtime_result,
            multiple_choice: self.multiple_choice,
            anonymous_choice: self.anonymous_choice,
            create_datetime: self.create_datetime,
            end_datetime: self.end_datetime,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VoteSummaryRow {
    #[sqlx(flatten)]
    vote: VoteRow,
    participant_count: i64,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    vote_id: i64,
    writer_id: i64,
    content: String,
    create_datetime: DateTime<Utc>,
    edited_datetime: Option<DateTime<Utc>>,
    is_deleted: bool,
    deleted_datetime: Option<DateTime<Utc>>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::from_i64(self.id),
            vote_id: VoteId::from_i64(self.vote_id),
            writer_id: UserId::from_i64(self.writer_id),
            content: self.content,
            create_datetime: self.create_datetime,
            edited_datetime: self.edited_datetime,
            status: if self.is_deleted {
                CommentStatus::Deleted
            } else {
                CommentStatus::Active
            },
            deleted_datetime: self.deleted_datetime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ListCursor;
    use chrono::TimeZone;

    fn list_query(category: ListCategory, cursor: Option<ListCursor>) -> ListQuery {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        ListQuery {
            category,
            user_id: UserId::from_i64(7),
            now,
            cursor,
            limit: 10,
            hot_threshold: 5,
        }
    }

    fn cursor() -> Option<ListCursor> {
        let time = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        Some(ListCursor::new(time, VoteId::from_i64(42)))
    }

    fn normalized_sql(query: &ListQuery) -> String {
        let qb = build_list_query(query);
        qb.sql().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_list_sql_orders_ended_by_end_time() {
        let sql = normalized_sql(&list_query(ListCategory::Ended, None));
        assert!(sql.contains("WHERE v.end_datetime <= $1"));
        assert!(sql.ends_with("ORDER BY v.end_datetime DESC, v.id ASC LIMIT $2"));
    }

    #[test]
    fn test_list_sql_orders_others_by_create_time() {
        for category in [
            ListCategory::Ongoing,
            ListCategory::Hot,
            ListCategory::Made,
            ListCategory::Participated,
        ] {
            let sql = normalized_sql(&list_query(category, cursor()));
            assert!(
                sql.contains("ORDER BY v.create_datetime DESC, v.id ASC LIMIT"),
                "{category:?}: {sql}"
            );
            assert!(!sql.contains("ORDER BY v.end_datetime"), "{category:?}");
        }
    }

    #[test]
    fn test_list_sql_keyset_precedes_grouping() {
        let sql = normalized_sql(&list_query(ListCategory::Ongoing, cursor()));
        let keyset = sql
            .find("AND (v.create_datetime < $2 OR (v.create_datetime = $3 AND v.id > $4))")
            .expect("keyset predicate");
        let group = sql.find("GROUP BY v.id").expect("group by");
        assert!(keyset < group);
        assert!(sql.ends_with("LIMIT $5"));
    }

    #[test]
    fn test_list_sql_without_cursor_has_no_keyset() {
        let sql = normalized_sql(&list_query(ListCategory::Made, None));
        assert!(sql.contains("WHERE v.writer_id = $1 GROUP BY v.id ORDER BY"));
        assert!(!sql.contains("v.id >"));
    }

    #[test]
    fn test_list_sql_having_only_for_hot() {
        let hot = normalized_sql(&list_query(ListCategory::Hot, cursor()));
        let group = hot.find("GROUP BY v.id").expect("group by");
        let having = hot
            .find("HAVING COUNT(DISTINCT cp.user_id) >= $5")
            .expect("having");
        assert!(group < having);
        assert!(hot.contains("WHERE v.end_datetime > $1"));

        for category in [
            ListCategory::Ongoing,
            ListCategory::Ended,
            ListCategory::Made,
            ListCategory::Participated,
        ] {
            let sql = normalized_sql(&list_query(category, cursor()));
            assert!(!sql.contains("HAVING"), "{category:?}");
        }
    }

    #[test]
    fn test_list_sql_participated_filters_by_caller() {
        let sql = normalized_sql(&list_query(ListCategory::Participated, None));
        assert!(sql.contains("WHERE EXISTS ( SELECT 1 FROM choice_participations p"));
        assert!(sql.contains("WHERE pc.vote_id = v.id AND p.user_id = $1)"));
    }

    #[test]
    fn test_lock_key_separates_pairs() {
        let a = participation_lock_key(VoteId::from_i64(1), UserId::from_i64(2));
        let b = participation_lock_key(VoteId::from_i64(2), UserId::from_i64(1));
        let c = participation_lock_key(VoteId::from_i64(1), UserId::from_i64(2));
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
