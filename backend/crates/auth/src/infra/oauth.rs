//! Identity provider HTTP client
//!
//! Calls the Naver / Kakao profile endpoints with the caller's provider
//! access token and returns the provider-scoped account id.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::application::config::AuthConfig;
use crate::domain::entity::provider_link::OAuthProvider;
use crate::domain::identity_provider::IdentityProvider;
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    naver_url: String,
    kakao_url: String,
}

impl HttpIdentityProvider {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.oauth_timeout)
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            naver_url: config.naver_profile_url.clone(),
            kakao_url: config.kakao_profile_url.clone(),
        })
    }

    fn profile_url(&self, provider: OAuthProvider) -> &str {
        match provider {
            OAuthProvider::Naver => &self.naver_url,
            OAuthProvider::Kakao => &self.kakao_url,
        }
    }
}

/// `{"resultcode": "00", "message": "success", "response": {"id": "..."}}`
#[derive(Debug, Deserialize)]
struct NaverProfile {
    response: NaverAccount,
}

#[derive(Debug, Deserialize)]
struct NaverAccount {
    id: String,
}

/// `{"id": 1234567890, ...}`
#[derive(Debug, Deserialize)]
struct KakaoProfile {
    id: i64,
}

impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_account_id(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> AuthResult<String> {
        let response = self
            .client
            .get(self.profile_url(provider))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::ProviderApiError(format!("{provider}: {e}")))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(AuthError::InvalidProviderToken),
            status => {
                return Err(AuthError::ProviderApiError(format!(
                    "{provider} returned status: {status}"
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::ProviderApiError(format!("{provider}: {e}")))?;

        parse_account_id(provider, &body)
    }
}

fn parse_account_id(provider: OAuthProvider, body: &[u8]) -> AuthResult<String> {
    let malformed = |e: serde_json::Error| {
        AuthError::ProviderApiError(format!("{provider} profile is malformed: {e}"))
    };

    match provider {
        OAuthProvider::Naver => {
            let profile: NaverProfile = serde_json::from_slice(body).map_err(malformed)?;
            Ok(profile.response.id)
        }
        OAuthProvider::Kakao => {
            let profile: KakaoProfile = serde_json::from_slice(body).map_err(malformed)?;
            Ok(profile.id.to_string())
        }
    }
}
