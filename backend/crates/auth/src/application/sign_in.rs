//! Sign In Use Case
//!
//! Verifies a login id and password and issues a token pair.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::entity::token::TokenPair;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{login_id::LoginId, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    pub login_id: String,
    pub password: String,
}

pub struct SignInUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
    codec: TokenCodec,
}

impl<U> SignInUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        let codec = TokenCodec::new(&config);
        Self {
            user_repo,
            config,
            codec,
        }
    }

    /// Unknown user, withdrawn user and wrong password all fail with the
    /// same `InvalidUsernameOrPassword`.
    pub async fn execute(&self, input: SignInInput) -> AuthResult<TokenPair> {
        let login_id =
            LoginId::new(&input.login_id).map_err(|_| AuthError::InvalidUsernameOrPassword)?;

        let user = self
            .user_repo
            .find_by_login_id(&login_id)
            .await?
            .filter(|user| user.can_sign_in())
            .ok_or(AuthError::InvalidUsernameOrPassword)?;

        let raw_password = RawPassword::presented(input.password);
        if !user.password_hash.verify(&raw_password, self.config.pepper()) {
            return Err(AuthError::InvalidUsernameOrPassword);
        }

        let pair = self.codec.issue_tokens(&user.login_id)?;

        tracing::info!(
            user_id = %user.id,
            login_id = %user.login_id,
            "User signed in"
        );

        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sign_up::{SignUpUseCase, tests::input};
    use crate::domain::value_object::display_name::DisplayName;
    use crate::infra::memory::InMemoryAuthRepository;

    async fn setup() -> (SignInUseCase<InMemoryAuthRepository>, Arc<InMemoryAuthRepository>, Arc<AuthConfig>) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::with_random_secret());
        SignUpUseCase::new(repo.clone(), config.clone())
            .execute(input("alice", "alice@snu.ac.kr"))
            .await
            .unwrap();
        (SignInUseCase::new(repo.clone(), config.clone()), repo, config)
    }

    fn sign_in(login_id: &str, password: &str) -> SignInInput {
        SignInInput {
            login_id: login_id.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_correct_password_issues_tokens() {
        let (use_case, _, config) = setup().await;
        let pair = use_case.execute(sign_in("alice", "Snu2025vote")).await.unwrap();

        let codec = TokenCodec::new(&config);
        assert_eq!(codec.validate_access_token(&pair.access_token).unwrap().as_str(), "alice");
    }

    // A verified password must grant access and a failed one must deny it.
    #[tokio::test]
    async fn test_password_verify_polarity() {
        let (use_case, _, _) = setup().await;
        assert!(use_case.execute(sign_in("alice", "Snu2025vote")).await.is_ok());
        assert!(matches!(
            use_case.execute(sign_in("alice", "Snu2025Vote")).await,
            Err(AuthError::InvalidUsernameOrPassword)
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_is_indistinguishable() {
        let (use_case, _, _) = setup().await;
        assert!(matches!(
            use_case.execute(sign_in("nobody", "Snu2025vote")).await,
            Err(AuthError::InvalidUsernameOrPassword)
        ));
        assert!(matches!(
            use_case.execute(sign_in("x", "Snu2025vote")).await,
            Err(AuthError::InvalidUsernameOrPassword)
        ));
    }

    #[tokio::test]
    async fn test_withdrawn_user_cannot_sign_in() {
        let (use_case, repo, _) = setup().await;
        let user = repo
            .find_by_login_id(&LoginId::new("alice").unwrap())
            .await
            .unwrap()
            .unwrap();
        repo.mark_deleted(user.id, &DisplayName::withdrawn()).await.unwrap();

        assert!(matches!(
            use_case.execute(sign_in("alice", "Snu2025vote")).await,
            Err(AuthError::InvalidUsernameOrPassword)
        ));
    }
}
