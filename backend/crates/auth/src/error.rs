//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// A request field failed validation
    #[error("Invalid field format: {0}")]
    InvalidFieldFormat(String),

    #[error("User id already exists")]
    UserIdAlreadyExists,

    #[error("Email already exists")]
    EmailAlreadyExists,

    /// Unknown user, withdrawn user or wrong password. Never distinguished.
    #[error("Invalid username or password")]
    InvalidUsernameOrPassword,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Expired token")]
    ExpiredToken,

    #[error("Not an access token")]
    NotAccessToken,

    #[error("Blocked refresh token")]
    BlockedRefreshToken,

    /// Current password did not verify on reset
    #[error("Invalid password")]
    InvalidPassword,

    #[error("User not found")]
    UserNotFound,

    #[error("Provider account already linked")]
    LinkAlreadyExists,

    #[error("Invalid provider access token")]
    InvalidProviderToken,

    #[error("Identity provider request failed: {0}")]
    ProviderApiError(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidFieldFormat(_) => ErrorKind::BadRequest,
            AuthError::InvalidUsernameOrPassword
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::NotAccessToken
            | AuthError::BlockedRefreshToken
            | AuthError::InvalidPassword
            | AuthError::InvalidProviderToken => ErrorKind::Unauthorized,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::UserIdAlreadyExists
            | AuthError::EmailAlreadyExists
            | AuthError::LinkAlreadyExists => ErrorKind::Conflict,
            AuthError::ProviderApiError(_) => ErrorKind::BadGateway,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            // Keep driver and provider details out of the response body
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            AuthError::ProviderApiError(_) => {
                AppError::new(self.kind(), "Identity provider request failed")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::ProviderApiError(msg) => {
                tracing::error!(message = %msg, "Identity provider error");
            }
            AuthError::InvalidUsernameOrPassword => {
                tracing::warn!("Invalid sign-in attempt");
            }
            AuthError::BlockedRefreshToken => {
                tracing::warn!("Blocked refresh token presented");
            }
            AuthError::InvalidToken | AuthError::InvalidProviderToken => {
                tracing::warn!(error = %self, "Rejected token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let app_error = err.to_app_error();
        match err {
            AuthError::Database(e) => app_error.with_source(e),
            _ => app_error,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<platform::client::BearerError> for AuthError {
    fn from(_: platform::client::BearerError) -> Self {
        AuthError::InvalidToken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidFieldFormat("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::ExpiredToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::BlockedRefreshToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::EmailAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::LinkAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::ProviderApiError("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AuthError::Internal("pool poisoned at 0xdead".into());
        assert_eq!(err.to_app_error().message(), "Internal server error");
    }
}
