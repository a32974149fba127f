/// Comment endpoints
///
/// - `GET /api/articles/:slug/comments`
/// - `POST /api/articles/:slug/comments`
/// - `PUT /api/articles/:slug/comments/:id` (author only)
/// - `DELETE /api/articles/:slug/comments/:id` (author only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use conduit_shared::{
    models::comment::CommentView,
    service::{
        comments::{self, CommentChanges, NewComment},
        Confirmation,
    },
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, Caller};
use crate::{app::AppState, error::ApiResult};

/// `{"comment": ...}` request envelope
#[derive(Debug, Deserialize)]
pub struct CommentBody<T> {
    pub comment: T,
}

/// `{"comment": ...}` response envelope
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: CommentView,
}

/// `{"comments": [...]}` response envelope
#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentView>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(slug): Path<String>,
) -> ApiResult<Json<CommentsResponse>> {
    let comments = comments::list_comments(state.store(), caller, &slug).await?;
    Ok(Json(CommentsResponse { comments }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(slug): Path<String>,
    ApiJson(body): ApiJson<CommentBody<NewComment>>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let created = comments::create_comment(state.store(), caller, &slug, body.comment).await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse { comment: created.0 }),
    ))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((slug, id)): Path<(String, i64)>,
    ApiJson(body): ApiJson<CommentBody<CommentChanges>>,
) -> ApiResult<Json<CommentResponse>> {
    let comment =
        comments::update_comment(state.store(), caller, &slug, id, body.comment).await?;
    Ok(Json(CommentResponse { comment }))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((slug, id)): Path<(String, i64)>,
) -> ApiResult<Json<Confirmation>> {
    Ok(Json(
        comments::delete_comment(state.store(), caller, &slug, id).await?,
    ))
}
