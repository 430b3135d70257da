//! Application Configuration
//!
//! Configuration for the vote application layer.

use chrono::{FixedOffset, Offset, Utc};

/// Asia/Seoul, no daylight saving
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Debug, Clone)]
pub struct VoteConfig {
    /// Rows per list page
    pub page_size: usize,
    /// Minimum distinct participants for the hot list
    pub hot_threshold: i64,
    /// Offset used to read civil `end_datetime` input
    pub civil_offset_secs: i32,
    /// Lower-case image extensions accepted on create
    pub allowed_image_extensions: Vec<String>,
    /// Request body limit for multipart create
    pub max_upload_bytes: usize,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            hot_threshold: 5,
            civil_offset_secs: KST_OFFSET_SECS,
            allowed_image_extensions: ["png", "jpg", "jpeg", "gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl VoteConfig {
    /// Config for local development
    pub fn development() -> Self {
        Self::default()
    }

    pub fn civil_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.civil_offset_secs).unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VoteConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.hot_threshold, 5);
        assert_eq!(config.civil_offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let config = VoteConfig {
            civil_offset_secs: 90_000,
            ..VoteConfig::default()
        };
        assert_eq!(config.civil_offset().local_minus_utc(), 0);
    }
}
