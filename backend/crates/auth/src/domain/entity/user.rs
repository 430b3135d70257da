//! User Entity
//!
//! Identity record for one account. `id` is assigned by storage on insert,
//! so a user that has not been persisted yet is a [`NewUser`].

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, login_id::LoginId, user_password::UserPassword,
    user_status::UserStatus,
};

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub login_id: LoginId,
    pub email: Email,
    pub password_hash: UserPassword,
    pub name: DisplayName,
    /// College category code
    pub college: i32,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn can_sign_in(&self) -> bool {
        self.status.can_sign_in()
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.status == UserStatus::Deleted
    }
}

/// Validated sign-up data waiting for an id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login_id: LoginId,
    pub email: Email,
    pub password_hash: UserPassword,
    pub name: DisplayName,
    pub college: i32,
}

impl NewUser {
    /// Attach the storage-assigned id.
    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            login_id: self.login_id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            college: self.college,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}
