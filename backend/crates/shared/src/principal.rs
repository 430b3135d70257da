//! Authenticated principal
//!
//! Produced by the access-token middleware in `auth` and read by every
//! handler that needs to know who is calling.

use crate::id::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Internal numeric id (`users.id`)
    pub user_id: UserId,
}
