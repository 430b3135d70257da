//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::identity_provider::IdentityProvider;
use crate::domain::repository::AuthStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_access_token};

/// Create the users router for any repository / identity provider pair.
///
/// Mounted under `/api/users`.
pub fn auth_router<R, P>(repo: Arc<R>, identity: Arc<P>, config: Arc<AuthConfig>) -> Router
where
    R: AuthStore,
    P: IdentityProvider + Send + Sync + 'static,
{
    let middleware_state = AuthMiddlewareState {
        repo: repo.clone(),
        config: config.clone(),
    };
    let state = AuthAppState {
        repo,
        identity,
        config,
    };

    let protected = Router::new()
        .route(
            "/me",
            get(handlers::me::<R, P>).delete(handlers::withdraw::<R, P>),
        )
        .route("/reset_pw", patch(handlers::reset_password::<R, P>))
        .route("/link/{provider}", post(handlers::link_provider::<R, P>))
        .route_layer(middleware::from_fn_with_state(
            middleware_state,
            require_access_token::<R>,
        ));

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, P>))
        .route("/signin", post(handlers::sign_in::<R, P>))
        .route("/refresh", get(handlers::refresh::<R, P>))
        .route("/signin/{provider}", post(handlers::provider_sign_in::<R, P>))
        .merge(protected)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::provider::tests::StubIdentityProvider;
    use crate::infra::memory::InMemoryAuthRepository;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        auth_router(
            Arc::new(InMemoryAuthRepository::new()),
            Arc::new(StubIdentityProvider::with("kakao-token", "K-1")),
            Arc::new(AuthConfig::with_random_secret()),
        )
    }

    fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn bare_request(method: &str, uri: &str, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn sign_up_and_in(app: &Router) -> Value {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/signup",
                json!({
                    "userid": "alice",
                    "email": "Alice@snu.ac.kr",
                    "password": "Snu2025vote",
                    "name": "김서울",
                    "college": 3
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["email"], "alice@snu.ac.kr");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/signin",
                json!({ "userid": "alice", "password": "Snu2025vote" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_me_requires_access_token() {
        let app = app();
        let tokens = sign_up_and_in(&app).await;
        let access = tokens["access_token"].as_str().unwrap();
        let refresh = tokens["refresh_token"].as_str().unwrap();

        let response = app.clone().oneshot(bare_request("GET", "/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // A refresh token is not an access token
        let response = app
            .clone()
            .oneshot(bare_request("GET", "/me", Some(refresh)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(bare_request("GET", "/me", Some(access)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["userid"], "alice");
        assert_eq!(me["naver_linked"], false);
        assert_eq!(me["kakao_linked"], false);
    }

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let app = app();
        let tokens = sign_up_and_in(&app).await;
        let refresh = tokens["refresh_token"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(bare_request("GET", "/refresh", Some(refresh)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let rotated = body_json(response).await;
        assert_ne!(rotated["refresh_token"], tokens["refresh_token"]);

        let response = app
            .clone()
            .oneshot(bare_request("GET", "/refresh", Some(refresh)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let problem = body_json(response).await;
        assert_eq!(problem["status"], 401);
    }

    #[tokio::test]
    async fn test_link_and_provider_sign_in() {
        let app = app();
        let tokens = sign_up_and_in(&app).await;
        let access = tokens["access_token"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/link/kakao",
                json!({ "access_token": "kakao-token" }),
                Some(access),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/signin/kakao",
                json!({ "access_token": "kakao-token" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/signin/github",
                json!({ "access_token": "kakao-token" }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_conflict() {
        let app = app();
        sign_up_and_in(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/signup",
                json!({
                    "userid": "alice",
                    "email": "other@snu.ac.kr",
                    "password": "Snu2025vote",
                    "name": "다른사람",
                    "college": 1
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
