//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entity::{
    provider_link::{OAuthProvider, ProviderLink},
    token::BlockedRefreshToken,
    user::{NewUser, User},
};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, login_id::LoginId, user_password::UserPassword,
};
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and return it with its assigned id.
    ///
    /// A unique violation on login id or email surfaces as
    /// `UserIdAlreadyExists` / `EmailAlreadyExists`.
    async fn create(&self, user: NewUser) -> AuthResult<User>;

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>>;

    /// Includes withdrawn users.
    async fn find_by_login_id(&self, login_id: &LoginId) -> AuthResult<Option<User>>;

    async fn exists_by_login_id(&self, login_id: &LoginId) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn update_password(&self, id: UserId, password_hash: &UserPassword) -> AuthResult<()>;

    /// Set status `Deleted` and replace the display name.
    async fn mark_deleted(&self, id: UserId, name: &DisplayName) -> AuthResult<()>;
}

#[trait_variant::make(BlockedRefreshTokenRepository: Send)]
pub trait LocalBlockedRefreshTokenRepository {
    async fn is_blocked(&self, jti: &str) -> AuthResult<bool>;

    /// Record a spent refresh token.
    ///
    /// The `jti` is unique: inserting one that is already present fails
    /// with `BlockedRefreshToken` instead of being ignored.
    async fn block(&self, token: &BlockedRefreshToken) -> AuthResult<()>;

    /// Drop rows whose original expiry is before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

#[trait_variant::make(ProviderLinkRepository: Send)]
pub trait LocalProviderLinkRepository {
    async fn find_user_id(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> AuthResult<Option<UserId>>;

    async fn find_for_user(&self, user_id: UserId) -> AuthResult<Vec<ProviderLink>>;

    /// Record a link. Either side already linked fails with
    /// `LinkAlreadyExists`.
    async fn link(&self, link: &ProviderLink) -> AuthResult<()>;
}

/// Everything the auth handlers need from one store.
pub trait AuthStore:
    UserRepository
    + BlockedRefreshTokenRepository
    + ProviderLinkRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + BlockedRefreshTokenRepository
        + ProviderLinkRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
