//! Display Name Value Object

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AuthError, AuthResult};

pub const DISPLAY_NAME_MAX_LENGTH: usize = 20;

/// Name shown in place of a withdrawn user's display name.
pub const WITHDRAWN_USER_NAME: &str = "탈퇴한 회원";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// 1-20 characters after NFKC normalization and trimming.
    pub fn new(raw: impl AsRef<str>) -> AuthResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let trimmed = normalized.trim();
        let len = trimmed.chars().count();
        if len == 0 || len > DISPLAY_NAME_MAX_LENGTH {
            return Err(AuthError::InvalidFieldFormat(format!(
                "name must be 1-{DISPLAY_NAME_MAX_LENGTH} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn withdrawn() -> Self {
        Self(WITHDRAWN_USER_NAME.to_string())
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
