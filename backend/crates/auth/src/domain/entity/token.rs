//! Bearer token model
//!
//! Access tokens carry no stored state and end only by expiry. A refresh
//! token carries a `jti`; once that `jti` is in the blocklist the token is
//! spent for good.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Signed claim set. `exp` is Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub typ: TokenType,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Revocation record for a spent refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedRefreshToken {
    pub jti: String,
    /// Expiry of the original token. Rows past it may be swept.
    pub expires_at: DateTime<Utc>,
}
