/// Profile endpoints
///
/// - `GET /api/profiles/:username`
/// - `POST /api/profiles/:username/follow`
/// - `DELETE /api/profiles/:username/follow`

use axum::{
    extract::{Path, State},
    http::Method,
    Json,
};
use conduit_shared::{
    models::user::Profile,
    service::{
        profiles,
        toggle::{toggle, Follow, Toggle},
    },
};
use serde::Serialize;

use super::Caller;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// `{"profile": ...}` response envelope
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
}

/// A user's public profile
pub async fn get_profile(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = profiles::get_profile(state.store(), caller, &username).await?;
    Ok(Json(ProfileResponse { profile }))
}

/// Follow (POST) or unfollow (DELETE) a user
pub async fn follow(
    State(state): State<AppState>,
    Caller(caller): Caller,
    method: Method,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let direction = Toggle::from_method(&method)
        .ok_or_else(|| ApiError::BadRequest(format!("{method} does not toggle a follow")))?;

    let profile = toggle(&Follow, state.store(), caller, &username, direction).await?;
    Ok(Json(ProfileResponse { profile }))
}
