//! HTTP Handlers
//!
//! Every handler runs behind the access-token middleware and reads the
//! caller from `Extension<Principal>`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use kernel::id::{ChoiceId, CommentId, VoteId};
use kernel::principal::Principal;
use std::sync::Arc;

use crate::application::{
    CloseVoteUseCase, CreateCommentUseCase, CreateVoteUseCase, DeleteCommentUseCase,
    EditCommentUseCase, GetVoteUseCase, ListVotesUseCase, ParticipateInput,
    ParticipateVoteUseCase, VoteConfig,
};
use crate::domain::repository::VoteStore;
use crate::domain::storage::ImageStorage;
use crate::domain::value_objects::{ImageUpload, ListCategory, ListCursor};
use crate::error::{VoteError, VoteResult};
use crate::presentation::dto::{
    CommentRequest, CreateVoteRequest, CreateVoteResponse, ListParams, ParticipateRequest,
    VoteDetailResponse, VoteListResponse,
};

/// Shared state for vote handlers
pub struct VoteAppState<R, S> {
    pub repo: Arc<R>,
    pub storage: Arc<S>,
    pub config: Arc<VoteConfig>,
}

impl<R, S> Clone for VoteAppState<R, S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            storage: self.storage.clone(),
            config: self.config.clone(),
        }
    }
}

/// Detail as seen by `principal`, returned after every mutation
async fn detail_response<R: VoteStore>(
    repo: &Arc<R>,
    vote_id: VoteId,
    principal: &Principal,
) -> VoteResult<Json<VoteDetailResponse>> {
    let detail = GetVoteUseCase::new(repo.clone())
        .execute(vote_id, principal.user_id)
        .await?;
    Ok(Json(detail.into()))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> VoteError {
    VoteError::InvalidFieldFormat(format!("multipart: {}", e.body_text()))
}

// ============================================================================
// Create / Read
// ============================================================================

/// POST /api/votes/create
///
/// Multipart body: one `data` part with the vote JSON, then zero or more
/// `images` file parts in display order.
pub async fn create_vote<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> VoteResult<(StatusCode, Json<CreateVoteResponse>)>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let mut data: Option<CreateVoteRequest> = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("data") => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                let req = serde_json::from_slice(&bytes)
                    .map_err(|e| VoteError::InvalidFieldFormat(format!("data: {e}")))?;
                data = Some(req);
            }
            Some("images") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                images.push(ImageUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    let req = data.ok_or_else(|| VoteError::InvalidFieldFormat("data".to_string()))?;

    let use_case = CreateVoteUseCase::new(
        state.repo.clone(),
        state.storage.clone(),
        state.config.clone(),
    );
    let vote = use_case
        .execute(principal.user_id, req.into(), images)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateVoteResponse {
            id: vote.id.as_i64(),
        }),
    ))
}

/// GET /api/votes/list?category=..&start_cursor_time=..&start_cursor_id=..
pub async fn list_votes<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
) -> VoteResult<Json<VoteListResponse>>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let category = ListCategory::from_code(&params.category)?;
    let cursor = ListCursor::from_parts(params.start_cursor_time, params.start_cursor_id)?;

    let use_case = ListVotesUseCase::new(state.repo.clone(), state.config.clone());
    let page = use_case
        .execute(category, principal.user_id, cursor)
        .await?;

    Ok(Json(page.into()))
}

/// GET /api/votes/{vote_id}
pub async fn get_vote<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    Path(vote_id): Path<i64>,
) -> VoteResult<Json<VoteDetailResponse>>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    detail_response(&state.repo, VoteId::from_i64(vote_id), &principal).await
}

// ============================================================================
// Participate / Close
// ============================================================================

/// POST /api/votes/{vote_id}/participate
pub async fn participate<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    Path(vote_id): Path<i64>,
    Json(req): Json<ParticipateRequest>,
) -> VoteResult<Json<VoteDetailResponse>>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let vote_id = VoteId::from_i64(vote_id);

    ParticipateVoteUseCase::new(state.repo.clone())
        .execute(
            vote_id,
            principal.user_id,
            ParticipateInput {
                choice_ids: req
                    .participated_choice_ids
                    .into_iter()
                    .map(ChoiceId::from_i64)
                    .collect(),
                participation_code: req.participation_code,
            },
        )
        .await?;

    detail_response(&state.repo, vote_id, &principal).await
}

/// PATCH /api/votes/{vote_id}/close
pub async fn close_vote<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    Path(vote_id): Path<i64>,
) -> VoteResult<Json<VoteDetailResponse>>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let vote_id = VoteId::from_i64(vote_id);

    CloseVoteUseCase::new(state.repo.clone())
        .execute(vote_id, principal.user_id)
        .await?;

    detail_response(&state.repo, vote_id, &principal).await
}

// ============================================================================
// Comments
// ============================================================================

/// POST /api/votes/{vote_id}/comment
pub async fn create_comment<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    Path(vote_id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> VoteResult<(StatusCode, Json<VoteDetailResponse>)>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let vote_id = VoteId::from_i64(vote_id);

    CreateCommentUseCase::new(state.repo.clone())
        .execute(vote_id, principal.user_id, &req.content)
        .await?;

    let detail = detail_response(&state.repo, vote_id, &principal).await?;
    Ok((StatusCode::CREATED, detail))
}

/// PATCH /api/votes/{vote_id}/comment/{comment_id}
pub async fn edit_comment<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    Path((vote_id, comment_id)): Path<(i64, i64)>,
    Json(req): Json<CommentRequest>,
) -> VoteResult<Json<VoteDetailResponse>>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let vote_id = VoteId::from_i64(vote_id);

    EditCommentUseCase::new(state.repo.clone())
        .execute(
            vote_id,
            CommentId::from_i64(comment_id),
            principal.user_id,
            &req.content,
        )
        .await?;

    detail_response(&state.repo, vote_id, &principal).await
}

/// DELETE /api/votes/{vote_id}/comment/{comment_id}
pub async fn delete_comment<R, S>(
    State(state): State<VoteAppState<R, S>>,
    Extension(principal): Extension<Principal>,
    Path((vote_id, comment_id)): Path<(i64, i64)>,
) -> VoteResult<Json<VoteDetailResponse>>
where
    R: VoteStore,
    S: ImageStorage + Send + Sync + 'static,
{
    let vote_id = VoteId::from_i64(vote_id);

    DeleteCommentUseCase::new(state.repo.clone())
        .execute(vote_id, CommentId::from_i64(comment_id), principal.user_id)
        .await?;

    detail_response(&state.repo, vote_id, &principal).await
}
