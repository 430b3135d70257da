//! Auth Middleware
//!
//! Resolves the bearer access token to a `Principal` for protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::extract_bearer;
use std::sync::Arc;

use crate::application::AuthenticateUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;

/// Middleware state
pub struct AuthMiddlewareState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

/// Middleware that requires a valid access token.
///
/// On success the `Principal` is inserted into request extensions so
/// handlers can take `Extension<Principal>`.
pub async fn require_access_token<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
{
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token.to_string(),
        Err(e) => return AuthError::from(e).into_response(),
    };

    let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());

    let principal = match use_case.principal(&token).await {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(user_id = %principal.user_id, "Access token accepted");
    req.extensions_mut().insert(principal);

    next.run(req).await
}
