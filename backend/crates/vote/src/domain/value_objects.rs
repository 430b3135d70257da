//! Domain Value Objects

use chrono::{DateTime, Utc};
use kernel::id::{UserId, VoteId};
use std::fmt;

use crate::error::{VoteError, VoteResult};

// ============================================================================
// List category
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListCategory {
    /// Still open, newest first
    Ongoing,
    /// Closed, most recently ended first
    Ended,
    /// Open with at least `hot_threshold` participants
    Hot,
    /// Written by the caller
    Made,
    /// The caller picked at least one choice
    Participated,
}

impl ListCategory {
    pub const ALL: [ListCategory; 5] = [
        ListCategory::Ongoing,
        ListCategory::Ended,
        ListCategory::Hot,
        ListCategory::Made,
        ListCategory::Participated,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Ended => "ended",
            Self::Hot => "hot",
            Self::Made => "made",
            Self::Participated => "participated",
        }
    }

    pub fn from_code(code: &str) -> VoteResult<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.code() == code)
            .ok_or_else(|| VoteError::InvalidFieldFormat(format!("unknown category: {code}")))
    }

    /// Ended lists page over `end_datetime`; all others over `create_datetime`.
    #[inline]
    pub const fn orders_by_end(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for ListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Keyset cursor
// ============================================================================

/// `(ordering time, vote id)` of the last row already seen.
///
/// Rows after the cursor satisfy
/// `time < cursor.time OR (time = cursor.time AND id > cursor.id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCursor {
    pub time: DateTime<Utc>,
    pub id: VoteId,
}

impl ListCursor {
    pub fn new(time: DateTime<Utc>, id: VoteId) -> Self {
        Self { time, id }
    }

    /// Both parts or neither. A single part is `CursorError`.
    pub fn from_parts(time: Option<DateTime<Utc>>, id: Option<i64>) -> VoteResult<Option<Self>> {
        match (time, id) {
            (None, None) => Ok(None),
            (Some(time), Some(id)) => Ok(Some(Self::new(time, VoteId::from_i64(id)))),
            _ => Err(VoteError::CursorError),
        }
    }

    /// Whether a row with this ordering key comes after the cursor.
    #[inline]
    pub fn precedes(&self, time: DateTime<Utc>, id: VoteId) -> bool {
        time < self.time || (time == self.time && id > self.id)
    }
}

/// Everything a store needs to produce one page.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub category: ListCategory,
    /// Caller, used by `Made` and `Participated`
    pub user_id: UserId,
    pub now: DateTime<Utc>,
    pub cursor: Option<ListCursor>,
    pub limit: usize,
    pub hot_threshold: i64,
}

// ============================================================================
// Image upload
// ============================================================================

/// An uploaded image before it reaches storage
#[derive(Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lower-cased extension, checked against `allowed`.
    pub fn checked_extension(&self, allowed: &[String]) -> VoteResult<String> {
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if extension.is_empty() || !allowed.iter().any(|a| a.eq_ignore_ascii_case(&extension)) {
            return Err(VoteError::InvalidFileExtension(self.file_name.clone()));
        }
        Ok(extension)
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_category_codes() {
        for category in ListCategory::ALL {
            assert_eq!(ListCategory::from_code(category.code()).unwrap(), category);
        }
        assert!(matches!(
            ListCategory::from_code("popular"),
            Err(VoteError::InvalidFieldFormat(_))
        ));
    }

    #[test]
    fn test_cursor_needs_both_parts() {
        let t = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(ListCursor::from_parts(None, None).unwrap(), None);
        assert_eq!(
            ListCursor::from_parts(Some(t), Some(7)).unwrap(),
            Some(ListCursor::new(t, VoteId::from_i64(7)))
        );
        assert!(matches!(
            ListCursor::from_parts(Some(t), None),
            Err(VoteError::CursorError)
        ));
        assert!(matches!(
            ListCursor::from_parts(None, Some(7)),
            Err(VoteError::CursorError)
        ));
    }

    #[test]
    fn test_cursor_tie_breaks_on_ascending_id() {
        let t = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        let cursor = ListCursor::new(t, VoteId::from_i64(5));

        assert!(cursor.precedes(t - chrono::Duration::seconds(1), VoteId::from_i64(1)));
        assert!(cursor.precedes(t, VoteId::from_i64(6)));
        assert!(!cursor.precedes(t, VoteId::from_i64(5)));
        assert!(!cursor.precedes(t, VoteId::from_i64(4)));
        assert!(!cursor.precedes(t + chrono::Duration::seconds(1), VoteId::from_i64(9)));
    }

    #[test]
    fn test_image_extension_allow_list() {
        let allowed: Vec<String> = ["png", "jpg", "jpeg", "gif"].map(String::from).to_vec();
        let upload = |name: &str| ImageUpload {
            file_name: name.to_string(),
            bytes: vec![1, 2, 3],
        };

        assert_eq!(upload("cat.PNG").checked_extension(&allowed).unwrap(), "png");
        assert_eq!(upload("a.b.jpeg").checked_extension(&allowed).unwrap(), "jpeg");
        assert!(upload("notes.txt").checked_extension(&allowed).is_err());
        assert!(upload("noextension").checked_extension(&allowed).is_err());
    }
}
