//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::MyProfile;
use crate::domain::entity::{provider_link::OAuthProvider, token::TokenPair};

// ============================================================================
// Sign Up
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub userid: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub college: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub id: i64,
    pub userid: String,
    pub email: String,
}

// ============================================================================
// Sign In / Tokens
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub userid: String,
    pub password: String,
}

/// Provider access token obtained by the client from Naver / Kakao
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderTokenRequest {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

// ============================================================================
// Me
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MyProfileResponse {
    pub id: i64,
    pub userid: String,
    pub email: String,
    pub name: String,
    pub college: i32,
    pub naver_linked: bool,
    pub kakao_linked: bool,
}

impl From<MyProfile> for MyProfileResponse {
    fn from(profile: MyProfile) -> Self {
        let linked = |provider| profile.linked_providers.contains(&provider);
        Self {
            naver_linked: linked(OAuthProvider::Naver),
            kakao_linked: linked(OAuthProvider::Kakao),
            id: profile.user.id.as_i64(),
            userid: profile.user.login_id.as_str().to_string(),
            email: profile.user.email.as_str().to_string(),
            name: profile.user.name.as_str().to_string(),
            college: profile.user.college,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
