//! Vote Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, rules, repository and storage traits
//! - `application/` - One use case per vote operation
//! - `infra/` - PostgreSQL, in-memory and filesystem implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Votes with choices and ordered images, optional participation code
//! - Replace-on-resubmit participation, single or multiple choice
//! - Early close by the writer, soft-deleted comments
//! - Keyset pagination for ongoing / ended / hot / made / participated lists
//!
//! ## Consistency
//! - A vote, its choices and its image rows become visible together
//! - Participation writes for one (vote, user) pair are serialized
//! - List pages never repeat or skip rows when votes are created mid-walk

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::VoteConfig;
pub use error::{VoteError, VoteResult};
pub use infra::{FsImageStorage, InMemoryVoteRepository, PgVoteRepository};
pub use presentation::router::vote_router;

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
