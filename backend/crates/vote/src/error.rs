//! Vote Error Types
//!
//! Vote-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Vote-specific result type alias
pub type VoteResult<T> = Result<T, VoteError>;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Invalid field format: {0}")]
    InvalidFieldFormat(String),

    /// Creation asked for a participation code but supplied none
    #[error("Participation code is required but not provided")]
    ParticipationCodeRequired,

    #[error("End datetime must be in the future")]
    InvalidEndDatetime,

    #[error("Invalid file extension: {0}")]
    InvalidFileExtension(String),

    /// Only one of the two cursor parts was supplied
    #[error("Cursor time and cursor id must be given together")]
    CursorError,

    #[error("Vote not found")]
    VoteNotFound,

    #[error("Choice not found")]
    ChoiceNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Not the writer of this vote")]
    VoteNotYours,

    #[error("Not the writer of this comment")]
    CommentNotYours,

    #[error("Vote has ended")]
    EndedVote,

    #[error("Vote has already ended")]
    AlreadyEnded,

    /// Participating in a code-protected vote without a code
    #[error("Participation code not provided")]
    ParticipationCodeNotProvided,

    #[error("Wrong participation code")]
    WrongParticipationCode,

    #[error("Multiple choices are not allowed")]
    MultipleChoicesNotAllowed,

    #[error("Comment does not belong to this vote")]
    CommentNotInThisVote,

    #[error("Image storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VoteError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VoteError::InvalidFieldFormat(_)
            | VoteError::ParticipationCodeRequired
            | VoteError::InvalidEndDatetime
            | VoteError::InvalidFileExtension(_)
            | VoteError::CursorError => ErrorKind::BadRequest,
            VoteError::VoteNotYours | VoteError::CommentNotYours => ErrorKind::Forbidden,
            VoteError::VoteNotFound | VoteError::ChoiceNotFound | VoteError::CommentNotFound => {
                ErrorKind::NotFound
            }
            VoteError::EndedVote
            | VoteError::AlreadyEnded
            | VoteError::ParticipationCodeNotProvided
            | VoteError::WrongParticipationCode
            | VoteError::MultipleChoicesNotAllowed
            | VoteError::CommentNotInThisVote => ErrorKind::Conflict,
            VoteError::Storage(_) | VoteError::Database(_) | VoteError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            VoteError::Storage(_) | VoteError::Database(_) | VoteError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            VoteError::ParticipationCodeRequired => AppError::new(self.kind(), self.to_string())
                .with_action("Supply a 6 character participation code"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            VoteError::Database(e) => {
                tracing::error!(error = %e, "Vote database error");
            }
            VoteError::Storage(msg) => {
                tracing::error!(message = %msg, "Vote image storage error");
            }
            VoteError::Internal(msg) => {
                tracing::error!(message = %msg, "Vote internal error");
            }
            VoteError::WrongParticipationCode => {
                tracing::warn!("Wrong participation code");
            }
            _ => {
                tracing::debug!(error = %self, "Vote error");
            }
        }
    }
}

impl From<VoteError> for AppError {
    fn from(err: VoteError) -> Self {
        let app_error = err.to_app_error();
        match err {
            VoteError::Database(e) => app_error.with_source(e),
            _ => app_error,
        }
    }
}

impl IntoResponse for VoteError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
