//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{ChoiceDetail, CommentDetail, VoteDetail};
use crate::domain::entities::{VoteImage, VotePage, VoteSummary};
use crate::domain::services::VoteDraft;

// ============================================================================
// Create
// ============================================================================

/// JSON body of the `data` multipart part
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVoteRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub participation_code_required: bool,
    #[serde(default)]
    pub participation_code: Option<String>,
    #[serde(default)]
    pub realtime_result: bool,
    #[serde(default)]
    pub multiple_choice: bool,
    // Wire name kept for existing clients
    #[serde(default, rename = "annonymous_choice")]
    pub anonymous_choice: bool,
    /// Civil time without offset, e.g. `2025-01-31 18:00:00`
    #[serde(with = "civil_datetime")]
    pub end_datetime: NaiveDateTime,
    pub choices: Vec<String>,
}

impl From<CreateVoteRequest> for VoteDraft {
    fn from(req: CreateVoteRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
            participation_code_required: req.participation_code_required,
            participation_code: req.participation_code,
            realtime_result: req.realtime_result,
            multiple_choice: req.multiple_choice,
            anonymous_choice: req.anonymous_choice,
            end_datetime: req.end_datetime,
            choices: req.choices,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateVoteResponse {
    pub id: i64,
}

/// Accepts both `YYYY-MM-DD HH:MM:SS` and the ISO `T` separator.
mod civil_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, de::Error};

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
            .ok_or_else(|| D::Error::custom(format!("invalid end_datetime: {raw}")))
    }
}

// ============================================================================
// List
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    pub category: String,
    pub start_cursor_time: Option<DateTime<Utc>>,
    pub start_cursor_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteListItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub create_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub participant_count: i64,
}

impl From<VoteSummary> for VoteListItem {
    fn from(summary: VoteSummary) -> Self {
        Self {
            id: summary.vote.id.as_i64(),
            title: summary.vote.title,
            content: summary.vote.content,
            create_datetime: summary.vote.create_datetime,
            end_datetime: summary.vote.end_datetime,
            participant_count: summary.participant_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteListResponse {
    pub votes_list: Vec<VoteListItem>,
    pub has_next: bool,
    /// Pass back as `start_cursor_time` for the next page
    pub next_cursor_time: Option<DateTime<Utc>>,
    /// Pass back as `start_cursor_id` for the next page
    pub next_cursor_id: Option<i64>,
}

impl From<VotePage> for VoteListResponse {
    fn from(page: VotePage) -> Self {
        Self {
            has_next: page.has_next,
            next_cursor_time: page.next_cursor.map(|c| c.time),
            next_cursor_id: page.next_cursor.map(|c| c.id.as_i64()),
            votes_list: page.votes.into_iter().map(VoteListItem::from).collect(),
        }
    }
}

// ============================================================================
// Detail
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    pub order: i32,
    pub src: String,
}

impl From<VoteImage> for ImageResponse {
    fn from(image: VoteImage) -> Self {
        Self {
            order: image.order,
            src: image.src,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoiceResponse {
    pub choice_id: i64,
    pub choice_content: String,
    pub participation: bool,
    /// Hidden until results are visible
    pub choice_num_participants: Option<i64>,
    pub choice_participants_name: Option<Vec<String>>,
}

impl From<ChoiceDetail> for ChoiceResponse {
    fn from(detail: ChoiceDetail) -> Self {
        Self {
            choice_id: detail.choice.id.as_i64(),
            choice_content: detail.choice.content,
            participation: detail.participated,
            choice_num_participants: detail.participants_count,
            choice_participants_name: detail.participants_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub comment_id: i64,
    pub writer_name: String,
    pub is_writer: bool,
    pub comment_content: String,
    pub created_datetime: DateTime<Utc>,
    pub is_edited: bool,
    pub edited_datetime: Option<DateTime<Utc>>,
}

impl From<CommentDetail> for CommentResponse {
    fn from(detail: CommentDetail) -> Self {
        Self {
            is_edited: detail.comment.is_edited(),
            comment_id: detail.comment.id.as_i64(),
            writer_name: detail.writer_name,
            is_writer: detail.is_mine,
            comment_content: detail.comment.content,
            created_datetime: detail.comment.create_datetime,
            edited_datetime: detail.comment.edited_datetime,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteDetailResponse {
    pub id: i64,
    pub writer_name: String,
    pub is_writer: bool,
    pub title: String,
    pub content: String,
    pub participation_code_required: bool,
    pub realtime_result: bool,
    pub multiple_choice: bool,
    pub annonymous_choice: bool,
    pub create_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub images: Vec<ImageResponse>,
    pub choices: Vec<ChoiceResponse>,
    pub comments: Vec<CommentResponse>,
}

impl From<VoteDetail> for VoteDetailResponse {
    fn from(detail: VoteDetail) -> Self {
        let vote = detail.vote;
        Self {
            id: vote.id.as_i64(),
            writer_name: detail.writer_name,
            is_writer: detail.is_writer,
            title: vote.title,
            content: vote.content,
            participation_code_required: vote.participation_code_required,
            realtime_result: vote.realtime_result,
            multiple_choice: vote.multiple_choice,
            annonymous_choice: vote.anonymous_choice,
            create_datetime: vote.create_datetime,
            end_datetime: vote.end_datetime,
            images: detail.images.into_iter().map(ImageResponse::from).collect(),
            choices: detail.choices.into_iter().map(ChoiceResponse::from).collect(),
            comments: detail.comments.into_iter().map(CommentResponse::from).collect(),
        }
    }
}

// ============================================================================
// Participate / Comment
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipateRequest {
    pub participated_choice_ids: Vec<i64>,
    #[serde(default)]
    pub participation_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_reads_wire_names() {
        let req: CreateVoteRequest = serde_json::from_value(json!({
            "title": "점심 메뉴",
            "content": "골라주세요",
            "annonymous_choice": true,
            "end_datetime": "2099-12-31 18:00:00",
            "choices": ["학식", "짜장면"]
        }))
        .unwrap();

        assert!(req.anonymous_choice);
        assert!(!req.participation_code_required);
        assert_eq!(req.end_datetime.to_string(), "2099-12-31 18:00:00");
    }

    #[test]
    fn test_create_request_accepts_iso_separator() {
        let req: CreateVoteRequest = serde_json::from_value(json!({
            "title": "t",
            "content": "c",
            "end_datetime": "2099-12-31T18:00",
            "choices": ["a"]
        }))
        .unwrap();

        assert_eq!(req.end_datetime.to_string(), "2099-12-31 18:00:00");
    }

    #[test]
    fn test_create_request_rejects_unparseable_datetime() {
        let result = serde_json::from_value::<CreateVoteRequest>(json!({
            "title": "t",
            "content": "c",
            "end_datetime": "tomorrow",
            "choices": ["a"]
        }));

        assert!(result.is_err());
    }
}
