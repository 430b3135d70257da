//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Vote, Choice, Comment, VoteImage)
//! - Domain value objects (ListCategory, ListCursor, ImageUpload)
//! - Domain services (creation, participation and visibility rules, paging)
//! - Repository and storage traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod storage;
pub mod value_objects;

pub use repository::{
    CommentRepository, ParticipationRepository, UserDirectory, VoteListRepository,
    VoteRepository, VoteStore,
};
pub use storage::ImageStorage;
