//! Domain Services
//!
//! Pure rules for vote creation, participation, result visibility and
//! paging. No I/O happens here; the use cases supply `now`.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use kernel::id::{ChoiceId, UserId, VoteId};
use std::collections::HashSet;

use crate::domain::entities::{Choice, Comment, NewVote, Vote, VotePage, VoteSummary};
use crate::domain::value_objects::{ListCategory, ListCursor};
use crate::error::{VoteError, VoteResult};

pub const TITLE_MAX_CHARS: usize = 100;
pub const CHOICE_MAX_CHARS: usize = 200;
pub const PARTICIPATION_CODE_CHARS: usize = 6;

// ============================================================================
// Creation
// ============================================================================

/// Vote fields as submitted, before validation
#[derive(Debug, Clone)]
pub struct VoteDraft {
    pub title: String,
    pub content: String,
    pub participation_code_required: bool,
    pub participation_code: Option<String>,
    pub realtime_result: bool,
    pub multiple_choice: bool,
    pub anonymous_choice: bool,
    /// Civil time in the service timezone
    pub end_datetime: NaiveDateTime,
    pub choices: Vec<String>,
}

fn check_text(field: &str, value: &str, max_chars: Option<usize>) -> VoteResult<()> {
    let len = value.chars().count();
    if value.is_empty() || max_chars.is_some_and(|max| len > max) {
        return Err(VoteError::InvalidFieldFormat(field.to_string()));
    }
    Ok(())
}

/// Validate a draft into a `NewVote` without images.
///
/// Field formats are checked first, then the code requirement, then the
/// end time, which must be strictly after `now`.
pub fn validate_draft(
    draft: VoteDraft,
    writer_id: UserId,
    now: DateTime<Utc>,
    civil_offset: FixedOffset,
) -> VoteResult<NewVote> {
    check_text("title", &draft.title, Some(TITLE_MAX_CHARS))?;
    check_text("content", &draft.content, None)?;

    if draft.choices.is_empty() {
        return Err(VoteError::InvalidFieldFormat("choices".to_string()));
    }
    for choice in &draft.choices {
        check_text("choices", choice, Some(CHOICE_MAX_CHARS))?;
    }

    let code = draft.participation_code.filter(|code| !code.is_empty());
    if let Some(code) = &code {
        if code.chars().count() != PARTICIPATION_CODE_CHARS
            || code.chars().any(char::is_whitespace)
        {
            return Err(VoteError::InvalidFieldFormat(
                "participation_code".to_string(),
            ));
        }
    }
    if draft.participation_code_required && code.is_none() {
        return Err(VoteError::ParticipationCodeRequired);
    }

    let end_datetime = civil_offset
        .from_local_datetime(&draft.end_datetime)
        .single()
        .ok_or(VoteError::InvalidEndDatetime)?
        .with_timezone(&Utc);
    if end_datetime <= now {
        return Err(VoteError::InvalidEndDatetime);
    }

    Ok(NewVote {
        writer_id,
        title: draft.title,
        content: draft.content,
        participation_code_required: draft.participation_code_required,
        // A code is only kept when it is enforced
        participation_code: code.filter(|_| draft.participation_code_required),
        realtime_result: draft.realtime_result,
        multiple_choice: draft.multiple_choice,
        anonymous_choice: draft.anonymous_choice,
        create_datetime: now,
        end_datetime,
        choices: draft.choices,
        image_urls: Vec::new(),
    })
}

// ============================================================================
// Participation
// ============================================================================

/// Check a participation request against the vote.
///
/// Order: ended, code missing, code wrong, empty or duplicate ids,
/// multiple not allowed, choice outside the vote.
pub fn check_participation(
    vote: &Vote,
    choices: &[Choice],
    choice_ids: &[ChoiceId],
    participation_code: Option<&str>,
    now: DateTime<Utc>,
) -> VoteResult<()> {
    if vote.is_ended_at(now) {
        return Err(VoteError::EndedVote);
    }

    if vote.participation_code_required {
        match participation_code.filter(|code| !code.is_empty()) {
            None => return Err(VoteError::ParticipationCodeNotProvided),
            Some(code) if vote.participation_code.as_deref() != Some(code) => {
                return Err(VoteError::WrongParticipationCode);
            }
            Some(_) => {}
        }
    }

    if choice_ids.is_empty() {
        return Err(VoteError::InvalidFieldFormat("choice_ids".to_string()));
    }
    let unique: HashSet<ChoiceId> = choice_ids.iter().copied().collect();
    if unique.len() != choice_ids.len() {
        return Err(VoteError::InvalidFieldFormat(
            "duplicate choice_ids".to_string(),
        ));
    }

    if !vote.multiple_choice && choice_ids.len() > 1 {
        return Err(VoteError::MultipleChoicesNotAllowed);
    }

    let known: HashSet<ChoiceId> = choices
        .iter()
        .filter(|choice| choice.vote_id == vote.id)
        .map(|choice| choice.id)
        .collect();
    if !choice_ids.iter().all(|id| known.contains(id)) {
        return Err(VoteError::ChoiceNotFound);
    }

    Ok(())
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultVisibility {
    /// Per-choice participant counts
    pub counts: bool,
    /// Per-choice participant names
    pub names: bool,
}

pub fn result_visibility(vote: &Vote, now: DateTime<Utc>) -> ResultVisibility {
    let counts = vote.realtime_result || vote.is_ended_at(now);
    ResultVisibility {
        counts,
        names: counts && !vote.anonymous_choice,
    }
}

// ============================================================================
// Comments
// ============================================================================

pub fn check_comment_content(content: &str) -> VoteResult<()> {
    check_text("content", content, None)
}

/// Not-in-vote takes precedence over ownership.
pub fn check_comment_access(comment: &Comment, vote_id: VoteId, user_id: UserId) -> VoteResult<()> {
    if comment.vote_id != vote_id {
        return Err(VoteError::CommentNotInThisVote);
    }
    if comment.writer_id != user_id {
        return Err(VoteError::CommentNotYours);
    }
    Ok(())
}

// ============================================================================
// Paging
// ============================================================================

pub fn ordering_time(vote: &Vote, category: ListCategory) -> DateTime<Utc> {
    if category.orders_by_end() {
        vote.end_datetime
    } else {
        vote.create_datetime
    }
}

/// `has_next` is true iff the page is full; the cursor is the last row's key.
pub fn build_page(rows: Vec<VoteSummary>, page_size: usize, category: ListCategory) -> VotePage {
    let has_next = page_size > 0 && rows.len() == page_size;
    let next_cursor = if has_next {
        rows.last()
            .map(|row| ListCursor::new(ordering_time(&row.vote, category), row.vote.id))
    } else {
        None
    };

    VotePage {
        votes: rows,
        has_next,
        next_cursor,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    pub(crate) fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    pub(crate) fn draft() -> VoteDraft {
        VoteDraft {
            title: "점심 메뉴".to_string(),
            content: "오늘 점심 뭐 먹을까요?".to_string(),
            participation_code_required: false,
            participation_code: None,
            realtime_result: true,
            multiple_choice: false,
            anonymous_choice: false,
            end_datetime: NaiveDate::from_ymd_opt(2099, 12, 31)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            choices: vec!["학식".to_string(), "짜장면".to_string()],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap()
    }

    fn vote(multiple_choice: bool, code: Option<&str>) -> Vote {
        Vote {
            id: VoteId::from_i64(1),
            writer_id: UserId::from_i64(1),
            title: "t".into(),
            content: "c".into(),
            participation_code_required: code.is_some(),
            participation_code: code.map(String::from),
            realtime_result: false,
            multiple_choice,
            anonymous_choice: false,
            create_datetime: now() - Duration::hours(1),
            end_datetime: now() + Duration::hours(1),
        }
    }

    fn choices() -> Vec<Choice> {
        (1..=3)
            .map(|i| Choice {
                id: ChoiceId::from_i64(i),
                vote_id: VoteId::from_i64(1),
                content: format!("choice {i}"),
            })
            .collect()
    }

    fn ids(raw: &[i64]) -> Vec<ChoiceId> {
        raw.iter().copied().map(ChoiceId::from_i64).collect()
    }

    #[test]
    fn test_end_datetime_is_civil_time() {
        let mut d = draft();
        d.end_datetime = NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let new_vote = validate_draft(d, UserId::from_i64(1), now(), kst()).unwrap();
        assert_eq!(
            new_vote.end_datetime,
            Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_end_datetime_must_be_strictly_future() {
        let mut d = draft();
        // 12:00 KST == 03:00 UTC == now
        d.end_datetime = NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(matches!(
            validate_draft(d, UserId::from_i64(1), now(), kst()),
            Err(VoteError::InvalidEndDatetime)
        ));
    }

    #[test]
    fn test_code_required_without_code() {
        let mut d = draft();
        d.participation_code_required = true;
        d.participation_code = Some(String::new());
        assert!(matches!(
            validate_draft(d, UserId::from_i64(1), now(), kst()),
            Err(VoteError::ParticipationCodeRequired)
        ));
    }

    #[test]
    fn test_field_formats() {
        let writer = UserId::from_i64(1);

        let mut d = draft();
        d.title = "가".repeat(101);
        assert!(matches!(
            validate_draft(d, writer, now(), kst()),
            Err(VoteError::InvalidFieldFormat(_))
        ));

        let mut d = draft();
        d.title = "가".repeat(100);
        assert!(validate_draft(d, writer, now(), kst()).is_ok());

        let mut d = draft();
        d.choices.clear();
        assert!(matches!(
            validate_draft(d, writer, now(), kst()),
            Err(VoteError::InvalidFieldFormat(_))
        ));

        let mut d = draft();
        d.choices.push("x".repeat(201));
        assert!(matches!(
            validate_draft(d, writer, now(), kst()),
            Err(VoteError::InvalidFieldFormat(_))
        ));

        let mut d = draft();
        d.participation_code_required = true;
        d.participation_code = Some("ab cd1".into());
        assert!(matches!(
            validate_draft(d, writer, now(), kst()),
            Err(VoteError::InvalidFieldFormat(_))
        ));
    }

    #[test]
    fn test_only_empty_text_is_blank() {
        let writer = UserId::from_i64(1);

        let mut d = draft();
        d.title = String::new();
        assert!(matches!(
            validate_draft(d, writer, now(), kst()),
            Err(VoteError::InvalidFieldFormat(_))
        ));

        let mut d = draft();
        d.title = "   ".into();
        d.content = "\n".into();
        assert!(validate_draft(d, writer, now(), kst()).is_ok());

        assert!(check_comment_content(" ").is_ok());
        assert!(matches!(
            check_comment_content(""),
            Err(VoteError::InvalidFieldFormat(_))
        ));
    }

    #[test]
    fn test_code_dropped_when_not_required() {
        let mut d = draft();
        d.participation_code = Some("abc123".into());
        let new_vote = validate_draft(d, UserId::from_i64(1), now(), kst()).unwrap();
        assert_eq!(new_vote.participation_code, None);
    }

    #[test]
    fn test_participation_check_order() {
        let choices = choices();

        let mut ended = vote(false, Some("abc123"));
        ended.end_datetime = now();
        assert!(matches!(
            check_participation(&ended, &choices, &ids(&[1, 2]), None, now()),
            Err(VoteError::EndedVote)
        ));

        let coded = vote(false, Some("abc123"));
        assert!(matches!(
            check_participation(&coded, &choices, &ids(&[1, 2]), None, now()),
            Err(VoteError::ParticipationCodeNotProvided)
        ));
        assert!(matches!(
            check_participation(&coded, &choices, &ids(&[1, 2]), Some("zzz999"), now()),
            Err(VoteError::WrongParticipationCode)
        ));
        assert!(matches!(
            check_participation(&coded, &choices, &ids(&[]), Some("abc123"), now()),
            Err(VoteError::InvalidFieldFormat(_))
        ));
        assert!(matches!(
            check_participation(&coded, &choices, &ids(&[1, 1]), Some("abc123"), now()),
            Err(VoteError::InvalidFieldFormat(_))
        ));
        assert!(matches!(
            check_participation(&coded, &choices, &ids(&[1, 99]), Some("abc123"), now()),
            Err(VoteError::MultipleChoicesNotAllowed)
        ));
        assert!(matches!(
            check_participation(&coded, &choices, &ids(&[99]), Some("abc123"), now()),
            Err(VoteError::ChoiceNotFound)
        ));
        assert!(check_participation(&coded, &choices, &ids(&[2]), Some("abc123"), now()).is_ok());

        let multi = vote(true, None);
        assert!(check_participation(&multi, &choices, &ids(&[1, 3]), None, now()).is_ok());
    }

    #[test]
    fn test_result_visibility() {
        let mut v = vote(false, None);
        assert_eq!(
            result_visibility(&v, now()),
            ResultVisibility { counts: false, names: false }
        );

        v.realtime_result = true;
        assert_eq!(
            result_visibility(&v, now()),
            ResultVisibility { counts: true, names: true }
        );

        v.anonymous_choice = true;
        assert_eq!(
            result_visibility(&v, now()),
            ResultVisibility { counts: true, names: false }
        );

        v.realtime_result = false;
        v.anonymous_choice = false;
        assert!(result_visibility(&v, v.end_datetime).counts);
    }

    #[test]
    fn test_partial_page_is_final() {
        let rows = vec![VoteSummary {
            vote: vote(false, None),
            participant_count: 0,
        }];
        let page = build_page(rows.clone(), 1, ListCategory::Ongoing);
        assert!(page.has_next);
        assert_eq!(
            page.next_cursor,
            Some(ListCursor::new(rows[0].vote.create_datetime, rows[0].vote.id))
        );

        let page = build_page(rows.clone(), 1, ListCategory::Ended);
        assert_eq!(
            page.next_cursor.map(|c| c.time),
            Some(rows[0].vote.end_datetime)
        );

        let page = build_page(rows, 10, ListCategory::Ongoing);
        assert!(!page.has_next);
        assert_eq!(page.next_cursor, None);
    }
}
