//! Profile Use Cases
//!
//! `me`, password reset and withdrawal for the signed-in user.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::entity::{provider_link::OAuthProvider, user::User};
use crate::domain::repository::{ProviderLinkRepository, UserRepository};
use crate::domain::value_object::{
    display_name::DisplayName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct MyProfile {
    pub user: User,
    pub linked_providers: Vec<OAuthProvider>,
}

// ============================================================================
// Me
// ============================================================================

pub struct GetProfileUseCase<U, L>
where
    U: UserRepository,
    L: ProviderLinkRepository,
{
    user_repo: Arc<U>,
    link_repo: Arc<L>,
}

impl<U, L> GetProfileUseCase<U, L>
where
    U: UserRepository,
    L: ProviderLinkRepository,
{
    pub fn new(user_repo: Arc<U>, link_repo: Arc<L>) -> Self {
        Self {
            user_repo,
            link_repo,
        }
    }

    pub async fn execute(&self, user_id: UserId) -> AuthResult<MyProfile> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let linked_providers = self
            .link_repo
            .find_for_user(user_id)
            .await?
            .into_iter()
            .map(|link| link.provider)
            .collect();

        Ok(MyProfile {
            user,
            linked_providers,
        })
    }
}

// ============================================================================
// Reset password
// ============================================================================

pub struct ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ResetPasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Replace the stored hash. No history is kept.
    pub async fn execute(
        &self,
        user_id: UserId,
        current_password: String,
        new_password: String,
    ) -> AuthResult<()> {
        let new_password = RawPassword::new(new_password)?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let current = RawPassword::presented(current_password);
        if !user.password_hash.verify(&current, self.config.pepper()) {
            return Err(AuthError::InvalidPassword);
        }

        let password_hash = UserPassword::from_raw(&new_password, self.config.pepper())?;
        self.user_repo
            .update_password(user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %user_id, "Password reset");
        Ok(())
    }
}

// ============================================================================
// Withdraw
// ============================================================================

pub struct WithdrawUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> WithdrawUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Soft delete: the row, its votes, comments and participations stay.
    pub async fn execute(&self, user_id: UserId) -> AuthResult<()> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or(AuthError::UserNotFound)?;

        self.user_repo
            .mark_deleted(user.id, &DisplayName::withdrawn())
            .await?;

        tracing::info!(user_id = %user.id, login_id = %user.login_id, "User withdrew");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sign_in::{SignInInput, SignInUseCase};
    use crate::application::sign_up::{SignUpUseCase, tests::input};
    use crate::domain::entity::provider_link::ProviderLink;
    use crate::domain::value_object::{display_name::WITHDRAWN_USER_NAME, user_status::UserStatus};
    use crate::infra::memory::InMemoryAuthRepository;

    async fn setup() -> (Arc<InMemoryAuthRepository>, Arc<AuthConfig>, User) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::with_random_secret());
        let user = SignUpUseCase::new(repo.clone(), config.clone())
            .execute(input("alice", "alice@snu.ac.kr"))
            .await
            .unwrap();
        (repo, config, user)
    }

    fn sign_in(password: &str) -> SignInInput {
        SignInInput {
            login_id: "alice".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_reset_password_replaces_hash() {
        let (repo, config, user) = setup().await;
        let reset = ResetPasswordUseCase::new(repo.clone(), config.clone());

        reset
            .execute(user.id, "Snu2025vote".to_string(), "NewPass#2025".to_string())
            .await
            .unwrap();

        let sign_in_use_case = SignInUseCase::new(repo, config);
        assert!(sign_in_use_case.execute(sign_in("NewPass#2025")).await.is_ok());
        assert!(matches!(
            sign_in_use_case.execute(sign_in("Snu2025vote")).await,
            Err(AuthError::InvalidUsernameOrPassword)
        ));
    }

    #[tokio::test]
    async fn test_reset_password_wrong_current() {
        let (repo, config, user) = setup().await;
        let reset = ResetPasswordUseCase::new(repo, config);
        assert!(matches!(
            reset
                .execute(user.id, "WrongPass1".to_string(), "NewPass#2025".to_string())
                .await,
            Err(AuthError::InvalidPassword)
        ));
    }

    #[tokio::test]
    async fn test_withdraw_anonymises_and_keeps_row() {
        let (repo, _, user) = setup().await;
        WithdrawUseCase::new(repo.clone()).execute(user.id).await.unwrap();

        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.status, UserStatus::Deleted);
        assert_eq!(stored.name.as_str(), WITHDRAWN_USER_NAME);

        assert!(matches!(
            WithdrawUseCase::new(repo).execute(user.id).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_profile_lists_linked_providers() {
        let (repo, _, user) = setup().await;
        repo.link(&ProviderLink {
            user_id: user.id,
            provider: OAuthProvider::Kakao,
            provider_user_id: "k-1".to_string(),
        })
        .await
        .unwrap();

        let profile = GetProfileUseCase::new(repo.clone(), repo)
            .execute(user.id)
            .await
            .unwrap();
        assert_eq!(profile.user.login_id.as_str(), "alice");
        assert_eq!(profile.linked_providers, vec![OAuthProvider::Kakao]);
    }
}
