//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::{is_unique_violation, violated_constraint};
use kernel::id::UserId;
use sqlx::PgPool;

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

const USERS_USERID_KEY: &str = "users_userid_key";
const USERS_EMAIL_KEY: &str = "users_email_key";

const USER_COLUMNS: &str = r#"
    id,
    userid,
    email,
    hashed_password,
    name,
    college,
    status,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: NewUser) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (userid, email, hashed_password, name, college, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.login_id.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.name.as_str())
        .bind(user.college)
        .bind(UserStatus::Active.id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                match violated_constraint(&e) {
                    Some(USERS_USERID_KEY) => return AuthError::UserIdAlreadyExists,
                    Some(USERS_EMAIL_KEY) => return AuthError::EmailAlreadyExists,
                    _ => {}
                }
            }
            AuthError::Database(e)
        })?;

        row.into_user()
    }

    async fn find_by_id(&self, id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_login_id(&self, login_id: &LoginId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE userid = $1"
        ))
        .bind(login_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_login_id(&self, login_id: &LoginId) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE userid = $1)")
                .bind(login_id.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update_password(&self, id: UserId, password_hash: &UserPassword) -> AuthResult<()> {
        let updated = sqlx::query(
            "UPDATE users SET hashed_password = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_i64())
        .bind(password_hash.as_phc_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn mark_deleted(&self, id: UserId, name: &DisplayName) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                status = $2,
                name = $3,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(UserStatus::Deleted.id())
        .bind(name.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

// ============================================================================
// Blocked Refresh Token Repository Implementation
// ============================================================================

impl BlockedRefreshTokenRepository for PgAuthRepository {
    async fn is_blocked(&self, jti: &str) -> AuthResult<bool> {
        let blocked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM blocked_refresh_tokens WHERE token_id = $1)",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await?;

        Ok(blocked)
    }

    async fn block(&self, token: &BlockedRefreshToken) -> AuthResult<()> {
        // No ON CONFLICT: the racing loser must see the violation
        sqlx::query("INSERT INTO blocked_refresh_tokens (token_id, expires_at) VALUES ($1, $2)")
            .bind(&token.jti)
            .bind(token.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::BlockedRefreshToken
                } else {
                    AuthError::Database(e)
                }
            })?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM blocked_refresh_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Provider Link Repository Implementation
// ============================================================================

impl ProviderLinkRepository for PgAuthRepository {
    async fn find_user_id(
        &self,
        provider: OAuthProvider,
        provider_user_id: &str,
    ) -> AuthResult<Option<UserId>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM provider_links WHERE provider = $1 AND provider_user_id = $2",
        )
        .bind(provider.code())
        .bind(provider_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id.map(UserId::from_i64))
    }

    async fn find_for_user(&self, user_id: UserId) -> AuthResult<Vec<ProviderLink>> {
        let rows = sqlx::query_as::<_, ProviderLinkRow>(
            r#"
            SELECT user_id, provider, provider_user_id
            FROM provider_links
            WHERE user_id = $1
            ORDER BY provider
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ProviderLinkRow::into_link).collect()
    }

    async fn link(&self, link: &ProviderLink) -> AuthResult<()> {
        sqlx::query(
            "INSERT INTO provider_links (user_id, provider, provider_user_id) VALUES ($1, $2, $3)",
        )
        .bind(link.user_id.as_i64())
        .bind(link.provider.code())
        .bind(&link.provider_user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::LinkAlreadyExists
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    userid: String,
    email: String,
    hashed_password: String,
    name: String,
    college: i32,
    status: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let status = UserStatus::from_id(self.status)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user status: {}", self.status)))?;

        Ok(User {
            id: UserId::from_i64(self.id),
            login_id: LoginId::from_trusted(self.userid),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_phc_string(self.hashed_password)?,
            name: DisplayName::from_db(self.name),
            college: self.college,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProviderLinkRow {
    user_id: i64,
    provider: String,
    provider_user_id: String,
}

impl ProviderLinkRow {
    fn into_link(self) -> AuthResult<ProviderLink> {
        let provider = OAuthProvider::from_code(&self.provider)
            .ok_or_else(|| AuthError::Internal(format!("Invalid provider: {}", self.provider)))?;

        Ok(ProviderLink {
            user_id: UserId::from_i64(self.user_id),
            provider,
            provider_user_id: self.provider_user_id,
        })
    }
}
