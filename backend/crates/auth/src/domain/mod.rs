//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the identity
//! provider collaborator.

pub mod entity;
pub mod identity_provider;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    provider_link::{OAuthProvider, ProviderLink},
    token::{BlockedRefreshToken, TokenClaims, TokenPair, TokenType},
    user::{NewUser, User},
};
pub use identity_provider::IdentityProvider;
pub use repository::{
    AuthStore, BlockedRefreshTokenRepository, ProviderLinkRepository, UserRepository,
};
