//! In-memory auth store
//!
//! Tables keyed by id behind one `RwLock`, with the same uniqueness rules
//! the PostgreSQL schema enforces. Used by tests and local runs without a
//! database.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use tokio::sync::RwLock;

use crate::domain::entity::{
    provider_link::{OAuthProvider, ProviderLink},
    token::BlockedRefreshToken,
    user::{NewUser, User},
};
use crate::domain::repository::{
    BlockedRefreshTokenRepository, ProviderLinkRepository, UserRepository,
};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, login_id::LoginId, user_password::UserPassword,
    user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Tables {
    next_user_id: i64,
    users: BTreeMap<UserId, User>,
    blocked: HashMap<String, DateTime<Utc>>,
    links: Vec<ProviderLink>,
}

#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn blocked_count(&self) -> usize {
        self.tables.read().await.blocked.len()
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.login_id == user.login_id) {
            return Err(AuthError::UserIdAlreadyExists);
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists);
        }

        tables.next_user_id += 1;
        let id = UserId::from_i64(tables.next_user_id);
        let user = user.into_user(id, Utc::now());
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_login_id(&self, login_id: &LoginId) -> AuthResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| &u.login_id == login_id)
            .cloned())
    }

    async fn exists_by_login_id(&self, login_id: &LoginId) -> AuthResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| &u.login_id == login_id))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| &u.email == email))
    }

    async fn update_password(&self, id: UserId, password_hash: &UserPassword) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        user.password_hash = password_hash.clone();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_deleted(&self, id: UserId, name: &DisplayName) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        user.status = UserStatus::Deleted;
        user.name = name.clone();
        user.updated_at = Utc::now();
        Ok(())
    }
}

impl BlockedRefreshTokenRepository for InMemoryAuthRepository {
    async fn is_blocked(&self, jti: &str) -> AuthResult<bool> {
        Ok(self.tables.read().await.blocked.contains_key(jti))
    }

    async fn block(&self, token: &BlockedRefreshToken) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        if tables.blocked.contains_key(&token.jti) {
            return Err(AuthError::BlockedRefreshToken);
        }
        tables.blocked.insert(token.jti.clone(), token.expires_at);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.blocked.len();
        tables.blocked.retain(|_, expires_at| *expires_at >= now);
        Ok((before - tables.blocked.len()) as u64)
    }
}

impl ProviderLinkRepository for InMemoryAuthRepository {
    async fn find_user_id(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> AuthResult<Option<UserId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .links
            .iter()
            .find(|l| l.provider == provider && l.provider_user_id == provider_user_id)
            .map(|l| l.user_id))
    }

    async fn find_for_user(&self, user_id: UserId) -> AuthResult<Vec<ProviderLink>> {
        let tables = self.tables.read().await;
        Ok(tables
            .links
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn link(&self, link: &ProviderLink) -> AuthResult<()> {
        let mut tables = self.tables.write().await;
        let taken = tables.links.iter().any(|l| {
            l.provider == link.provider
                && (l.user_id == link.user_id || l.provider_user_id == link.provider_user_id)
        });
        if taken {
            return Err(AuthError::LinkAlreadyExists);
        }
        tables.links.push(link.clone());
        Ok(())
    }
}
