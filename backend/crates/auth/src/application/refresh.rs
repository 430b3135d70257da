//! Refresh Token Use Case
//!
//! Single-use rotation: a refresh token mints at most one new pair. The
//! blocklist insert is the commit point, so two racing reissues of the
//! same token end with one success and one `BlockedRefreshToken`.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::application::token::{TokenCodec, subject};
use crate::domain::entity::token::{BlockedRefreshToken, TokenClaims, TokenPair, TokenType};
use crate::domain::repository::BlockedRefreshTokenRepository;
use crate::domain::value_object::login_id::LoginId;
use crate::error::{AuthError, AuthResult};

pub struct RefreshTokenUseCase<B>
where
    B: BlockedRefreshTokenRepository,
{
    blocklist: Arc<B>,
    codec: TokenCodec,
}

impl<B> RefreshTokenUseCase<B>
where
    B: BlockedRefreshTokenRepository,
{
    pub fn new(blocklist: Arc<B>, config: Arc<AuthConfig>) -> Self {
        Self {
            blocklist,
            codec: TokenCodec::new(&config),
        }
    }

    pub async fn validate_refresh_token(&self, token: &str) -> AuthResult<LoginId> {
        self.validate_refresh_token_at(token, Utc::now()).await
    }

    pub async fn validate_refresh_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<LoginId> {
        let claims = self.validated_claims(token, now).await?;
        subject(&claims)
    }

    /// Spend a refresh token.
    ///
    /// Only structure and signature are required; an expired token can
    /// still be blocked.
    pub async fn block_refresh_token(&self, token: &str) -> AuthResult<()> {
        let claims = self.codec.decode(token)?;
        if claims.typ != TokenType::Refresh {
            return Err(AuthError::InvalidToken);
        }
        self.block_claims(&claims).await
    }

    pub async fn reissue_tokens(&self, token: &str) -> AuthResult<TokenPair> {
        self.reissue_tokens_at(token, Utc::now()).await
    }

    /// Validate, block, then issue a new pair for the same subject.
    pub async fn reissue_tokens_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<TokenPair> {
        let claims = self.validated_claims(token, now).await?;
        let login_id = subject(&claims)?;

        self.block_claims(&claims).await?;
        let pair = self.codec.issue_tokens_at(&login_id, now)?;

        tracing::info!(login_id = %login_id, "Tokens reissued");

        Ok(pair)
    }

    /// Remove revocation rows whose original expiry has passed.
    pub async fn cleanup_expired_blocked_tokens(&self) -> AuthResult<u64> {
        let deleted = self.blocklist.delete_expired(Utc::now()).await?;
        tracing::info!(tokens_deleted = deleted, "Cleaned up expired blocked refresh tokens");
        Ok(deleted)
    }

    async fn validated_claims(&self, token: &str, now: DateTime<Utc>) -> AuthResult<TokenClaims> {
        let claims = self.codec.decode_refresh_at(token, now)?;
        let jti = claims.jti.as_deref().ok_or(AuthError::InvalidToken)?;
        if self.blocklist.is_blocked(jti).await? {
            return Err(AuthError::BlockedRefreshToken);
        }
        Ok(claims)
    }

    async fn block_claims(&self, claims: &TokenClaims) -> AuthResult<()> {
        let jti = claims.jti.clone().ok_or(AuthError::InvalidToken)?;
        let expires_at = claims.expires_at().ok_or(AuthError::InvalidToken)?;

        self.blocklist
            .block(&BlockedRefreshToken { jti, expires_at })
            .await?;

        tracing::debug!("Refresh token blocked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAuthRepository;
    use chrono::Duration;

    fn setup() -> (RefreshTokenUseCase<InMemoryAuthRepository>, TokenCodec, Arc<InMemoryAuthRepository>) {
        let config = Arc::new(AuthConfig::with_random_secret());
        let repo = Arc::new(InMemoryAuthRepository::new());
        (
            RefreshTokenUseCase::new(repo.clone(), config.clone()),
            TokenCodec::new(&config),
            repo,
        )
    }

    fn bob() -> LoginId {
        LoginId::new("bob").unwrap()
    }

    #[tokio::test]
    async fn test_reissue_blocks_presented_token() {
        let (use_case, codec, _) = setup();
        let pair = codec.issue_tokens(&bob()).unwrap();

        let new_pair = use_case.reissue_tokens(&pair.refresh_token).await.unwrap();
        assert_eq!(codec.validate_access_token(&new_pair.access_token).unwrap(), bob());

        assert!(matches!(
            use_case.validate_refresh_token(&pair.refresh_token).await,
            Err(AuthError::BlockedRefreshToken)
        ));
        assert!(matches!(
            use_case.reissue_tokens(&pair.refresh_token).await,
            Err(AuthError::BlockedRefreshToken)
        ));
    }

    #[tokio::test]
    async fn test_new_refresh_token_is_usable() {
        let (use_case, codec, _) = setup();
        let pair = codec.issue_tokens(&bob()).unwrap();

        let second = use_case.reissue_tokens(&pair.refresh_token).await.unwrap();
        let third = use_case.reissue_tokens(&second.refresh_token).await.unwrap();
        assert_eq!(use_case.validate_refresh_token(&third.refresh_token).await.unwrap(), bob());
    }

    #[tokio::test]
    async fn test_concurrent_reissue_yields_exactly_one_success() {
        let (use_case, codec, _) = setup();
        let use_case = Arc::new(use_case);
        let pair = codec.issue_tokens(&bob()).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let use_case = use_case.clone();
            let token = pair.refresh_token.clone();
            handles.push(tokio::spawn(async move { use_case.reissue_tokens(&token).await }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(AuthError::BlockedRefreshToken) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_access_token_cannot_be_reissued() {
        let (use_case, codec, _) = setup();
        let pair = codec.issue_tokens(&bob()).unwrap();
        assert!(matches!(
            use_case.reissue_tokens(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let (use_case, codec, _) = setup();
        let issued = Utc::now() - Duration::days(8);
        let pair = codec.issue_tokens_at(&bob(), issued).unwrap();

        assert!(matches!(
            use_case.reissue_tokens(&pair.refresh_token).await,
            Err(AuthError::ExpiredToken)
        ));
        // Still blockable
        use_case.block_refresh_token(&pair.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_rows() {
        let (use_case, codec, repo) = setup();
        let old = codec.issue_tokens_at(&bob(), Utc::now() - Duration::days(8)).unwrap();
        let fresh = codec.issue_tokens(&bob()).unwrap();

        use_case.block_refresh_token(&old.refresh_token).await.unwrap();
        use_case.block_refresh_token(&fresh.refresh_token).await.unwrap();

        assert_eq!(use_case.cleanup_expired_blocked_tokens().await.unwrap(), 1);
        assert_eq!(repo.blocked_count().await, 1);
        assert!(matches!(
            use_case.validate_refresh_token(&fresh.refresh_token).await,
            Err(AuthError::BlockedRefreshToken)
        ));
    }
}
