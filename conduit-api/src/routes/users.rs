/// Account endpoints
///
/// - `POST /api/users` - Register
/// - `POST /api/users/login` - Sign in
/// - `GET /api/user` - Current user
/// - `PUT /api/user` - Update current user
///
/// Every response is `{"user": {...}}` and carries a fresh token.

use axum::{extract::State, http::StatusCode, Json};
use conduit_shared::{
    models::user::UserView,
    service::users::{self, Login, Registration, UserChanges},
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, Caller};
use crate::{app::AppState, error::ApiResult};

/// `{"user": ...}` request envelope
#[derive(Debug, Deserialize)]
pub struct UserBody<T> {
    pub user: T,
}

/// `{"user": ...}` response envelope
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserView,
}

/// Register a new user
///
/// ```text
/// POST /api/users
///
/// {"user": {"username": "jake", "email": "jake@jake.jake", "password": "jakejake"}}
/// ```
///
/// # Errors
///
/// - `422`: a field is blank, the email is malformed, or the email or
///   username is taken
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserBody<Registration>>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let created = users::sign_up(state.store(), &state.credentials, body.user).await?;
    Ok((StatusCode::CREATED, Json(UserResponse { user: created.0 })))
}

/// Sign in with email and password
///
/// # Errors
///
/// - `404`: no account with that email
/// - `422`: wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UserBody<Login>>,
) -> ApiResult<Json<UserResponse>> {
    let user = users::sign_in(state.store(), &state.credentials, body.user).await?;
    Ok(Json(UserResponse { user }))
}

/// The authenticated user
pub async fn current_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> ApiResult<Json<UserResponse>> {
    let user = users::current_user(state.store(), &state.credentials, caller).await?;
    Ok(Json(UserResponse { user }))
}

/// Update the authenticated user
pub async fn update_user(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(body): ApiJson<UserBody<UserChanges>>,
) -> ApiResult<Json<UserResponse>> {
    let user = users::update_user(state.store(), &state.credentials, caller, body.user).await?;
    Ok(Json(UserResponse { user }))
}
