//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod profile;
pub mod provider;
pub mod refresh;
pub mod sign_in;
pub mod sign_up;
pub mod token;

// Re-exports
pub use authenticate::AuthenticateUseCase;
pub use config::AuthConfig;
pub use profile::{GetProfileUseCase, MyProfile, ResetPasswordUseCase, WithdrawUseCase};
pub use provider::{LinkProviderUseCase, ProviderSignInUseCase};
pub use refresh::RefreshTokenUseCase;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use token::TokenCodec;
