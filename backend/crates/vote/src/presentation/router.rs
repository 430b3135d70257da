//! Vote Router

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::application::VoteConfig;
use crate::domain::repository::VoteStore;
use crate::domain::storage::ImageStorage;
use crate::presentation::handlers::{self, VoteAppState};

/// Create the votes router, mounted under `/api/votes`.
///
/// Handlers expect a `Principal` extension, so the caller wraps this
/// router with the access-token middleware.
pub fn vote_router<R, S>(repo: Arc<R>, storage: Arc<S>, config: Arc<VoteConfig>) -> Router
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let body_limit = config.max_upload_bytes;
    let state = VoteAppState {
        repo,
        storage,
        config,
    };

    Router::new()
        .route(
            "/create",
            post(handlers::create_vote::<R, S>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/list", get(handlers::list_votes::<R, S>))
        .route("/{vote_id}", get(handlers::get_vote::<R, S>))
        .route("/{vote_id}/participate", post(handlers::participate::<R, S>))
        .route("/{vote_id}/close", patch(handlers::close_vote::<R, S>))
        .route("/{vote_id}/comment", post(handlers::create_comment::<R, S>))
        .route(
            "/{vote_id}/comment/{comment_id}",
            patch(handlers::edit_comment::<R, S>).delete(handlers::delete_comment::<R, S>),
        )
        .with_state(state)
}
