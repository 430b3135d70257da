//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary shared by
//! the `auth` and `vote` crates:
//! - Common error types and result aliases
//! - Typed numeric identifiers (users, votes, choices, comments, images)
//! - The authenticated principal handed from auth to the vote handlers
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod principal;
