/// Tag endpoint
///
/// - `GET /api/tags` - `{"tags": [...]}`

use axum::{extract::State, Json};
use conduit_shared::service::tags::{self, TagList};

use crate::{app::AppState, error::ApiResult};

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<TagList>> {
    Ok(Json(tags::list_tags(state.store()).await?))
}
