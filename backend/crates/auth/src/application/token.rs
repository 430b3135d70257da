//! Token codec
//!
//! Compact JWS tokens: `base64url(header).base64url(claims).base64url(mac)`
//! with header `{"alg":"HS256","typ":"JWT"}` and an HMAC-SHA256 signature
//! over the first two segments.
//!
//! Validation order is fixed: structure and signature (`InvalidToken`),
//! then expiry (`ExpiredToken`), then type, then subject.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use platform::crypto::{from_base64url, to_base64url};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::token::{TokenClaims, TokenPair, TokenType};
use crate::domain::value_object::login_id::LoginId;
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Signs and verifies bearer tokens with the configured secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.token_secret.clone(),
            access_ttl_secs: config.access_token_ttl_secs(),
            refresh_ttl_secs: config.refresh_token_ttl_secs(),
        }
    }

    // ========================================================================
    // Issuance
    // ========================================================================

    pub fn issue_tokens(&self, login_id: &LoginId) -> AuthResult<TokenPair> {
        self.issue_tokens_at(login_id, Utc::now())
    }

    /// Mint an access token (1h) and a refresh token (7d, fresh `jti`).
    pub fn issue_tokens_at(&self, login_id: &LoginId, now: DateTime<Utc>) -> AuthResult<TokenPair> {
        let issued = now.timestamp();

        let access = TokenClaims {
            sub: Some(login_id.as_str().to_string()),
            typ: TokenType::Access,
            exp: issued + self.access_ttl_secs,
            jti: None,
        };
        let refresh = TokenClaims {
            sub: Some(login_id.as_str().to_string()),
            typ: TokenType::Refresh,
            exp: issued + self.refresh_ttl_secs,
            jti: Some(Uuid::new_v4().to_string()),
        };

        Ok(TokenPair {
            access_token: self.encode(&access)?,
            refresh_token: self.encode(&refresh)?,
        })
    }

    pub fn encode(&self, claims: &TokenClaims) -> AuthResult<String> {
        let payload = serde_json::to_vec(claims)
            .map_err(|e| AuthError::Internal(format!("claims serialization failed: {e}")))?;

        let signing_input = format!(
            "{}.{}",
            to_base64url(HEADER_JSON.as_bytes()),
            to_base64url(&payload)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{signing_input}.{}", to_base64url(&signature)))
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Verify structure and signature only. Expiry is not checked.
    pub fn decode(&self, token: &str) -> AuthResult<TokenClaims> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(AuthError::InvalidToken)?;
        let (header, payload) = signing_input
            .split_once('.')
            .ok_or(AuthError::InvalidToken)?;
        if payload.contains('.') {
            return Err(AuthError::InvalidToken);
        }

        let header_bytes = from_base64url(header).map_err(|_| AuthError::InvalidToken)?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| AuthError::InvalidToken)?;
        if header.alg != "HS256" {
            return Err(AuthError::InvalidToken);
        }

        let signature = from_base64url(signature).map_err(|_| AuthError::InvalidToken)?;
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let payload = from_base64url(payload).map_err(|_| AuthError::InvalidToken)?;
        serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)
    }

    pub fn validate_access_token(&self, token: &str) -> AuthResult<LoginId> {
        self.validate_access_token_at(token, Utc::now())
    }

    /// Resolve the login id an access token was issued for.
    pub fn validate_access_token_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<LoginId> {
        let claims = self.decode(token)?;
        check_expiry(&claims, now)?;
        if claims.typ != TokenType::Access {
            return Err(AuthError::NotAccessToken);
        }
        subject(&claims)
    }

    /// Decode a refresh token without consulting the blocklist.
    ///
    /// A token of another type is `InvalidToken`, as is a refresh token
    /// without a subject or `jti`.
    pub fn decode_refresh_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        let claims = self.decode(token)?;
        check_expiry(&claims, now)?;
        if claims.typ != TokenType::Refresh || claims.jti.is_none() {
            return Err(AuthError::InvalidToken);
        }
        subject(&claims)?;
        Ok(claims)
    }

    fn mac(&self) -> AuthResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| AuthError::Internal("invalid token secret".to_string()))
    }
}

fn check_expiry(claims: &TokenClaims, now: DateTime<Utc>) -> AuthResult<()> {
    if now.timestamp() > claims.exp {
        return Err(AuthError::ExpiredToken);
    }
    Ok(())
}

pub(crate) fn subject(claims: &TokenClaims) -> AuthResult<LoginId> {
    match claims.sub.as_deref() {
        Some(sub) if !sub.is_empty() => Ok(LoginId::from_trusted(sub)),
        _ => Err(AuthError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::with_random_secret())
    }

    fn alice() -> LoginId {
        LoginId::new("alice").unwrap()
    }

    #[test]
    fn test_access_token_roundtrip_within_hour() {
        let codec = codec();
        let now = Utc::now();
        let pair = codec.issue_tokens_at(&alice(), now).unwrap();

        let at_edge = now + Duration::seconds(3600);
        assert_eq!(codec.validate_access_token_at(&pair.access_token, at_edge).unwrap(), alice());
    }

    #[test]
    fn test_access_token_expired_after_hour_and_one_second() {
        let codec = codec();
        let now = Utc::now();
        let pair = codec.issue_tokens_at(&alice(), now).unwrap();

        let later = now + Duration::seconds(3601);
        assert!(matches!(
            codec.validate_access_token_at(&pair.access_token, later),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let codec = codec();
        let pair = codec.issue_tokens(&alice()).unwrap();
        assert!(matches!(
            codec.validate_access_token(&pair.refresh_token),
            Err(AuthError::NotAccessToken)
        ));
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let codec = codec();
        let pair = codec.issue_tokens(&alice()).unwrap();
        assert!(matches!(
            codec.decode_refresh_at(&pair.access_token, Utc::now()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_refresh_tokens_carry_distinct_jti() {
        let codec = codec();
        let now = Utc::now();
        let a = codec.issue_tokens_at(&alice(), now).unwrap();
        let b = codec.issue_tokens_at(&alice(), now).unwrap();

        let ja = codec.decode_refresh_at(&a.refresh_token, now).unwrap().jti;
        let jb = codec.decode_refresh_at(&b.refresh_token, now).unwrap().jti;
        assert!(ja.is_some());
        assert_ne!(ja, jb);
    }

    #[test]
    fn test_refresh_token_lives_seven_days() {
        let codec = codec();
        let now = Utc::now();
        let pair = codec.issue_tokens_at(&alice(), now).unwrap();

        assert!(codec.decode_refresh_at(&pair.refresh_token, now + Duration::days(7)).is_ok());
        assert!(matches!(
            codec.decode_refresh_at(&pair.refresh_token, now + Duration::days(7) + Duration::seconds(1)),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let pair = codec.issue_tokens(&alice()).unwrap();

        let forged_claims = TokenClaims {
            sub: Some("mallory".to_string()),
            typ: TokenType::Access,
            exp: Utc::now().timestamp() + 3600,
            jti: None,
        };
        let forged_payload = to_base64url(&serde_json::to_vec(&forged_claims).unwrap());
        let parts: Vec<&str> = pair.access_token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(codec.validate_access_token(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_expired_token_is_invalid_not_expired() {
        let codec = codec();
        let past = Utc::now() - Duration::hours(2);
        let pair = codec.issue_tokens_at(&alice(), past).unwrap();
        let tampered = format!("{}x", pair.access_token);

        assert!(matches!(codec.validate_access_token(&tampered), Err(AuthError::InvalidToken)));
        assert!(matches!(
            codec.validate_access_token(&pair.access_token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_other_secret_rejected() {
        let pair = codec().issue_tokens(&alice()).unwrap();
        assert!(matches!(
            codec().validate_access_token(&pair.access_token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_missing_subject_rejected() {
        let codec = codec();
        let token = codec
            .encode(&TokenClaims {
                sub: None,
                typ: TokenType::Access,
                exp: Utc::now().timestamp() + 60,
                jti: None,
            })
            .unwrap();
        assert!(matches!(codec.validate_access_token(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();
        for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.###"] {
            assert!(matches!(codec.validate_access_token(token), Err(AuthError::InvalidToken)));
        }
    }
}
