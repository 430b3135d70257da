//! OAuth provider linkage
//!
//! One user links at most one account per provider, and one provider
//! account links to at most one user.

use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Naver,
    Kakao,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 2] = [OAuthProvider::Naver, OAuthProvider::Kakao];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Naver => "naver",
            Self::Kakao => "kakao",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "naver" => Some(Self::Naver),
            "kakao" => Some(Self::Kakao),
            _ => None,
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLink {
    pub user_id: UserId,
    pub provider: OAuthProvider,
    /// Provider-scoped unique account id
    pub provider_user_id: String,
}
