//! HTTP Handlers

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use kernel::principal::Principal;
use platform::client::extract_bearer;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    GetProfileUseCase, LinkProviderUseCase, ProviderSignInUseCase, RefreshTokenUseCase,
    ResetPasswordUseCase, SignInInput, SignInUseCase, SignUpInput, SignUpUseCase,
    WithdrawUseCase,
};
use crate::domain::entity::provider_link::OAuthProvider;
use crate::domain::identity_provider::IdentityProvider;
use crate::domain::repository::AuthStore;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    MyProfileResponse, ProviderTokenRequest, ResetPasswordRequest, SignInRequest,
    SignUpRequest, SignUpResponse, TokenResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, P> {
    pub repo: Arc<R>,
    pub identity: Arc<P>,
    pub config: Arc<AuthConfig>,
}

impl<R, P> Clone for AuthAppState<R, P> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            identity: self.identity.clone(),
            config: self.config.clone(),
        }
    }
}

fn parse_provider(provider: &str) -> AuthResult<OAuthProvider> {
    OAuthProvider::from_code(provider)
        .ok_or_else(|| AuthError::InvalidFieldFormat(format!("unknown provider: {provider}")))
}

// ============================================================================
// Sign Up / Sign In
// ============================================================================

/// POST /api/users/signup
pub async fn sign_up<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<SignUpResponse>)>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let user = use_case
        .execute(SignUpInput {
            login_id: req.userid,
            email: req.email,
            password: req.password,
            name: req.name,
            college: req.college,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            id: user.id.as_i64(),
            userid: user.login_id.as_str().to_string(),
            email: user.email.as_str().to_string(),
        }),
    ))
}

/// POST /api/users/signin
pub async fn sign_in<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Json(req): Json<SignInRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(state.repo.clone(), state.config.clone());

    let pair = use_case
        .execute(SignInInput {
            login_id: req.userid,
            password: req.password,
        })
        .await?;

    Ok(Json(pair.into()))
}

/// GET /api/users/refresh
///
/// The bearer credential is the refresh token. It is spent by this call.
pub async fn refresh<R, P>(
    State(state): State<AuthAppState<R, P>>,
    headers: HeaderMap,
) -> AuthResult<Json<TokenResponse>>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let token = extract_bearer(&headers)?;

    let use_case = RefreshTokenUseCase::new(state.repo.clone(), state.config.clone());
    let pair = use_case.reissue_tokens(token).await?;

    Ok(Json(pair.into()))
}

/// POST /api/users/signin/{provider}
pub async fn provider_sign_in<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Path(provider): Path<String>,
    Json(req): Json<ProviderTokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let provider = parse_provider(&provider)?;

    let use_case = ProviderSignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.identity.clone(),
        state.config.clone(),
    );
    let pair = use_case.execute(provider, &req.access_token).await?;

    Ok(Json(pair.into()))
}

// ============================================================================
// Signed-in user (behind `require_access_token`)
// ============================================================================

/// GET /api/users/me
pub async fn me<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(principal): Extension<Principal>,
) -> AuthResult<Json<MyProfileResponse>>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let use_case = GetProfileUseCase::new(state.repo.clone(), state.repo.clone());
    let profile = use_case.execute(principal.user_id).await?;

    Ok(Json(profile.into()))
}

/// PATCH /api/users/reset_pw
pub async fn reset_password<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(state.repo.clone(), state.config.clone());
    use_case
        .execute(principal.user_id, req.current_password, req.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/me
pub async fn withdraw<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(principal): Extension<Principal>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    WithdrawUseCase::new(state.repo.clone())
        .execute(principal.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/link/{provider}
pub async fn link_provider<R, P>(
    State(state): State<AuthAppState<R, P>>,
    Extension(principal): Extension<Principal>,
    Path(provider): Path<String>,
    Json(req): Json<ProviderTokenRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let provider = parse_provider(&provider)?;

    LinkProviderUseCase::new(state.repo.clone(), state.identity.clone())
        .execute(principal.user_id, provider, &req.access_token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
