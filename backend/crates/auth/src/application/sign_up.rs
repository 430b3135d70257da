//! Sign Up Use Case
//!
//! Creates a new user account.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    display_name::DisplayName,
    email::Email,
    login_id::LoginId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub login_id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub college: i32,
}

pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        let login_id = LoginId::new(&input.login_id)?;
        let email = Email::new(&input.email)?;
        let raw_password = RawPassword::new(input.password)?;
        let name = DisplayName::new(&input.name)?;

        // Login id is checked before email
        if self.user_repo.exists_by_login_id(&login_id).await? {
            return Err(AuthError::UserIdAlreadyExists);
        }
        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        // The store maps a racing duplicate to the same two errors
        let user = self
            .user_repo
            .create(NewUser {
                login_id,
                email,
                password_hash,
                name,
                college: input.college,
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            login_id = %user.login_id,
            "User signed up"
        );

        Ok(user)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAuthRepository;

    pub(crate) fn input(login_id: &str, email: &str) -> SignUpInput {
        SignUpInput {
            login_id: login_id.to_string(),
            email: email.to_string(),
            password: "Snu2025vote".to_string(),
            name: "김서울".to_string(),
            college: 3,
        }
    }

    fn use_case() -> SignUpUseCase<InMemoryAuthRepository> {
        SignUpUseCase::new(
            Arc::new(InMemoryAuthRepository::new()),
            Arc::new(AuthConfig::with_random_secret()),
        )
    }

    #[tokio::test]
    async fn test_sign_up_succeeds_once() {
        let use_case = use_case();
        let user = use_case.execute(input("alice", "alice@snu.ac.kr")).await.unwrap();
        assert_eq!(user.login_id.as_str(), "alice");
        assert_eq!(user.college, 3);
        assert!(user.can_sign_in());
    }

    #[tokio::test]
    async fn test_duplicate_login_id_any_email() {
        let use_case = use_case();
        use_case.execute(input("alice", "alice@snu.ac.kr")).await.unwrap();
        assert!(matches!(
            use_case.execute(input("alice", "other@snu.ac.kr")).await,
            Err(AuthError::UserIdAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_other_login_id() {
        let use_case = use_case();
        use_case.execute(input("alice", "alice@snu.ac.kr")).await.unwrap();
        assert!(matches!(
            use_case.execute(input("alice2", "ALICE@snu.ac.kr")).await,
            Err(AuthError::EmailAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_of_both_reports_login_id() {
        let use_case = use_case();
        use_case.execute(input("alice", "alice@snu.ac.kr")).await.unwrap();
        assert!(matches!(
            use_case.execute(input("alice", "alice@snu.ac.kr")).await,
            Err(AuthError::UserIdAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_invalid_fields_rejected() {
        let use_case = use_case();
        assert!(matches!(
            use_case.execute(input("a!", "alice@snu.ac.kr")).await,
            Err(AuthError::InvalidFieldFormat(_))
        ));

        let mut weak = input("alice", "alice@snu.ac.kr");
        weak.password = "alllowercase".to_string();
        assert!(matches!(use_case.execute(weak).await, Err(AuthError::InvalidFieldFormat(_))));
    }
}
