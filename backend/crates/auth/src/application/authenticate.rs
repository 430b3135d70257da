//! Authenticate Use Case
//!
//! Resolves the acting user behind an access token.

use std::sync::Arc;

use kernel::principal::Principal;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct AuthenticateUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: TokenCodec,
}

impl<U> AuthenticateUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            codec: TokenCodec::new(&config),
        }
    }

    /// Validate the token and load its user.
    ///
    /// A valid token whose user is gone or withdrawn is `InvalidToken`.
    pub async fn login_with_access_token(&self, token: &str) -> AuthResult<User> {
        let login_id = self.codec.validate_access_token(token)?;

        self.user_repo
            .find_by_login_id(&login_id)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or(AuthError::InvalidToken)
    }

    pub async fn principal(&self, token: &str) -> AuthResult<Principal> {
        let user = self.login_with_access_token(token).await?;
        Ok(Principal { user_id: user.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sign_up::{SignUpUseCase, tests::input};
    use crate::domain::value_object::{display_name::DisplayName, login_id::LoginId};
    use crate::infra::memory::InMemoryAuthRepository;

    #[tokio::test]
    async fn test_principal_and_withdrawn_user() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::with_random_secret());
        let user = SignUpUseCase::new(repo.clone(), config.clone())
            .execute(input("alice", "alice@snu.ac.kr"))
            .await
            .unwrap();

        let codec = TokenCodec::new(&config);
        let pair = codec.issue_tokens(&user.login_id).unwrap();
        let use_case = AuthenticateUseCase::new(repo.clone(), config.clone());

        let principal = use_case.principal(&pair.access_token).await.unwrap();
        assert_eq!(principal.user_id, user.id);

        repo.mark_deleted(user.id, &DisplayName::withdrawn()).await.unwrap();
        assert!(matches!(
            use_case.login_with_access_token(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_token_for_unknown_user() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::with_random_secret());
        let pair = TokenCodec::new(&config)
            .issue_tokens(&LoginId::new("ghost").unwrap())
            .unwrap();

        let use_case = AuthenticateUseCase::new(repo, config);
        assert!(matches!(
            use_case.login_with_access_token(&pair.access_token).await,
            Err(AuthError::InvalidToken)
        ));
    }
}
