//! Presentation Layer - HTTP handlers and routing

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::VoteAppState;
pub use router::vote_router;
