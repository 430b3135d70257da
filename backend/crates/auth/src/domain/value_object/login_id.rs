//! Login Id Value Object
//!
//! The handle a user signs in with (`userid` on the wire). Distinct from
//! the numeric `kernel::id::UserId` the database assigns.
//!
//! ## Invariants
//! - 3 to 20 characters after NFKC normalization
//! - ASCII letters, digits, `_` and `-` only
//! - Case is preserved and significant

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::error::{AuthError, AuthResult};

pub const LOGIN_ID_MIN_LENGTH: usize = 3;
pub const LOGIN_ID_MAX_LENGTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginId(String);

impl LoginId {
    pub fn new(raw: impl AsRef<str>) -> AuthResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let len = normalized.chars().count();

        if !(LOGIN_ID_MIN_LENGTH..=LOGIN_ID_MAX_LENGTH).contains(&len) {
            return Err(AuthError::InvalidFieldFormat(format!(
                "userid must be {LOGIN_ID_MIN_LENGTH}-{LOGIN_ID_MAX_LENGTH} characters"
            )));
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AuthError::InvalidFieldFormat(
                "userid may only contain letters, digits, '_' and '-'".to_string(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Wrap a value read back from storage or a verified token subject
    pub fn from_trusted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_login_ids() {
        assert!(LoginId::new("abc").is_ok());
        assert!(LoginId::new("snu_vote-2025").is_ok());
        assert!(LoginId::new("A".repeat(20)).is_ok());
    }

    #[test]
    fn test_invalid_login_ids() {
        assert!(LoginId::new("ab").is_err());
        assert!(LoginId::new("a".repeat(21)).is_err());
        assert!(LoginId::new("user name").is_err());
        assert!(LoginId::new("user.name").is_err());
        assert!(LoginId::new("사용자아이디").is_err());
    }

    #[test]
    fn test_fullwidth_is_normalized() {
        let id = LoginId::new("ｓｎｕ１").unwrap();
        assert_eq!(id.as_str(), "snu1");
    }

    #[test]
    fn test_case_is_preserved() {
        assert_ne!(LoginId::new("Alice").unwrap(), LoginId::new("alice").unwrap());
    }
}
