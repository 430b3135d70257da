//! Application Layer - Use Cases
//!
//! One use case per vote operation. Each is generic over the repository
//! traits it needs and takes `now` explicitly through its `_at` variant.

pub mod close_vote;
pub mod comment;
pub mod config;
pub mod create_vote;
pub mod get_vote;
pub mod list_votes;
pub mod participate;

pub use close_vote::CloseVoteUseCase;
pub use comment::{CreateCommentUseCase, DeleteCommentUseCase, EditCommentUseCase};
pub use config::VoteConfig;
pub use create_vote::CreateVoteUseCase;
pub use get_vote::{ChoiceDetail, CommentDetail, GetVoteUseCase, VoteDetail};
pub use list_votes::ListVotesUseCase;
pub use participate::{ParticipateInput, ParticipateVoteUseCase};
