//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::{ChoiceId, CommentId, ImageId, UserId, VoteId};

use crate::domain::value_objects::ListCursor;

/// Display name shown for a writer whose account row is missing
pub const UNKNOWN_WRITER_NAME: &str = "탈퇴한 회원";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub writer_id: UserId,
    pub title: String,
    pub content: String,
    pub participation_code_required: bool,
    pub participation_code: Option<String>,
    pub realtime_result: bool,
    pub multiple_choice: bool,
    pub anonymous_choice: bool,
    pub create_datetime: DateTime<Utc>,
    /// Only ever moved earlier, by `close`
    pub end_datetime: DateTime<Utc>,
}

impl Vote {
    /// Ended at or after `end_datetime`
    #[inline]
    pub fn is_ended_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_datetime
    }

    #[inline]
    pub fn is_written_by(&self, user_id: UserId) -> bool {
        self.writer_id == user_id
    }
}

/// A validated vote ready to be persisted with its choices and images.
#[derive(Debug, Clone)]
pub struct NewVote {
    pub writer_id: UserId,
    pub title: String,
    pub content: String,
    pub participation_code_required: bool,
    pub participation_code: Option<String>,
    pub realtime_result: bool,
    pub multiple_choice: bool,
    pub anonymous_choice: bool,
    pub create_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    /// Choice contents in submitted order
    pub choices: Vec<String>,
    /// Stored image URLs in submitted order
    pub image_urls: Vec<String>,
}

impl NewVote {
    pub fn into_vote(self, id: VoteId) -> Vote {
        Vote {
            id,
            writer_id: self.writer_id,
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub vote_id: VoteId,
    pub content: String,
}

/// One user's selection of one choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChoiceParticipation {
    pub choice_id: ChoiceId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteImage {
    pub id: ImageId,
    pub vote_id: VoteId,
    /// 1-based position in the submitted image list
    pub order: i32,
    pub src: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub vote_id: VoteId,
    pub writer_id: UserId,
    pub content: String,
    pub create_datetime: DateTime<Utc>,
    pub edited_datetime: Option<DateTime<Utc>>,
    pub status: CommentStatus,
    pub deleted_datetime: Option<DateTime<Utc>>,
}

impl Comment {
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_datetime.is_some()
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.status == CommentStatus::Deleted
    }
}

/// A vote together with its distinct participant count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteSummary {
    pub vote: Vote,
    pub participant_count: i64,
}

/// One page of a vote list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotePage {
    pub votes: Vec<VoteSummary>,
    pub has_next: bool,
    /// Keyset of the last row, absent when `has_next` is false
    pub next_cursor: Option<ListCursor>,
}
