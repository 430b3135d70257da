//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and the token codec
//! - `infra/` - PostgreSQL, in-memory and identity provider implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - User signup/signin with userid + password
//! - Access / refresh bearer tokens (HMAC-SHA256 signed)
//! - Single-use refresh tokens backed by a revocation blocklist
//! - Naver / Kakao account linking and sign-in
//! - Soft withdrawal with display name anonymisation
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, NFKC-normalised first
//! - Unknown user, withdrawn user and wrong password are indistinguishable
//! - A refresh token mints at most one new pair

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::refresh::RefreshTokenUseCase;
pub use error::{AuthError, AuthResult};
pub use infra::{HttpIdentityProvider, InMemoryAuthRepository, PgAuthRepository};
pub use presentation::middleware::{AuthMiddlewareState, require_access_token};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
