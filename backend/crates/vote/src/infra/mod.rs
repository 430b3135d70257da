//! Infrastructure Layer - External systems integration
//!
//! - `postgres`: sqlx repositories for votes, participations and comments
//! - `memory`: in-process store with the same contracts, used by tests
//! - `storage`: local filesystem image storage

pub mod memory;
pub mod postgres;
pub mod storage;

pub use memory::InMemoryVoteRepository;
pub use postgres::PgVoteRepository;
pub use storage::FsImageStorage;
