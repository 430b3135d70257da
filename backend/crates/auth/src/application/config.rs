//! Application Configuration
//!
//! Configuration for the Auth application layer. Passed into every use
//! case so tests can run with isolated secrets.

use std::time::Duration;

pub const NAVER_PROFILE_URL: &str = "https://openapi.naver.com/v1/nid/me";
pub const KAKAO_PROFILE_URL: &str = "https://kapi.kakao.com/v2/user/me";

/// Minimum accepted length of the token signing secret.
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 key for access and refresh tokens
    pub token_secret: Vec<u8>,
    /// Access token lifetime (1 hour)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime (7 days)
    pub refresh_token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Bound on each identity provider call
    pub oauth_timeout: Duration,
    pub naver_profile_url: String,
    pub kakao_profile_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; MIN_TOKEN_SECRET_LEN],
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            password_pepper: None,
            oauth_timeout: Duration::from_secs(5),
            naver_profile_url: NAVER_PROFILE_URL.to_string(),
            kakao_profile_url: KAKAO_PROFILE_URL.to_string(),
        }
    }
}

impl AuthConfig {
    /// Config with a random signing secret (for development and tests)
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_bytes(MIN_TOKEN_SECRET_LEN),
            ..Default::default()
        }
    }

    /// Config with the given secret, rejecting short keys.
    pub fn with_secret(secret: Vec<u8>) -> Result<Self, String> {
        if secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(format!(
                "token secret must be at least {MIN_TOKEN_SECRET_LEN} bytes (got {})",
                secret.len()
            ));
        }
        Ok(Self {
            token_secret: secret,
            ..Default::default()
        })
    }

    pub fn access_token_ttl_secs(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }

    pub fn refresh_token_ttl_secs(&self) -> i64 {
        self.refresh_token_ttl.as_secs() as i64
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.access_token_ttl_secs(), 3600);
        assert_eq!(config.refresh_token_ttl_secs(), 604_800);
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(AuthConfig::with_secret(vec![1u8; 16]).is_err());
        assert!(AuthConfig::with_secret(vec![1u8; 32]).is_ok());
    }

    #[test]
    fn test_random_secrets_differ() {
        assert_ne!(
            AuthConfig::with_random_secret().token_secret,
            AuthConfig::with_random_secret().token_secret
        );
    }
}
