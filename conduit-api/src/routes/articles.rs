/// Article endpoints
///
/// - `GET /api/articles` - List, filtered by `author`, `tag`, `favorited`
/// - `GET /api/articles/feed` - Articles by followed authors
/// - `POST /api/articles` - Create
/// - `GET /api/articles/:slug` - Read
/// - `PUT /api/articles/:slug` - Update (author only)
/// - `DELETE /api/articles/:slug` - Delete (author only)
/// - `POST /api/articles/:slug/favorite` - Favorite
/// - `DELETE /api/articles/:slug/favorite` - Unfavorite

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    Json,
};
use conduit_shared::{
    models::article::ArticleView,
    service::{
        articles::{self, ArticleChanges, NewArticle},
        listing::{self, ArticlePage, FeedParams, ListParams},
        toggle::{toggle, Favorite, Toggle},
        Confirmation,
    },
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, ApiQuery, Caller};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// `{"article": ...}` request envelope
#[derive(Debug, Deserialize)]
pub struct ArticleBody<T> {
    pub article: T,
}

/// `{"article": ...}` response envelope
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleView,
}

/// Newest articles first, `{"articles": [...], "articlesCount": n}`
///
/// ```text
/// GET /api/articles?tag=dragons&limit=10&offset=20
/// ```
pub async fn list_articles(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<ArticlePage>> {
    Ok(Json(
        listing::list_articles(state.store(), caller, params).await?,
    ))
}

/// Articles written by users the caller follows
pub async fn feed(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiQuery(params): ApiQuery<FeedParams>,
) -> ApiResult<Json<ArticlePage>> {
    Ok(Json(listing::feed(state.store(), caller, params).await?))
}

/// Publish an article
///
/// ```text
/// POST /api/articles
///
/// {"article": {"title": "How to train your dragon", "description": "Ever wonder how?",
///              "body": "You have to believe", "tagList": ["dragons", "training"]}}
/// ```
///
/// # Errors
///
/// - `401`: anonymous caller
/// - `422`: a field is blank or the title is taken
pub async fn create_article(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ApiJson(body): ApiJson<ArticleBody<NewArticle>>,
) -> ApiResult<(StatusCode, Json<ArticleResponse>)> {
    let created = articles::create_article(state.store(), caller, body.article).await?;
    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse { article: created.0 }),
    ))
}

pub async fn get_article(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = articles::get_article(state.store(), caller, &slug).await?;
    Ok(Json(ArticleResponse { article }))
}

/// Update an article; the slug does not change with the title
///
/// # Errors
///
/// - `401`: anonymous caller
/// - `403`: caller is not the author
/// - `404`: unknown slug
pub async fn update_article(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(slug): Path<String>,
    ApiJson(body): ApiJson<ArticleBody<ArticleChanges>>,
) -> ApiResult<Json<ArticleResponse>> {
    let article = articles::update_article(state.store(), caller, &slug, body.article).await?;
    Ok(Json(ArticleResponse { article }))
}

pub async fn delete_article(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(slug): Path<String>,
) -> ApiResult<Json<Confirmation>> {
    Ok(Json(
        articles::delete_article(state.store(), caller, &slug).await?,
    ))
}

/// Favorite (POST) or unfavorite (DELETE) an article
pub async fn favorite(
    State(state): State<AppState>,
    Caller(caller): Caller,
    method: Method,
    Path(slug): Path<String>,
) -> ApiResult<Json<ArticleResponse>> {
    let direction = Toggle::from_method(&method)
        .ok_or_else(|| ApiError::BadRequest(format!("{method} does not toggle a favorite")))?;

    let article = toggle(&Favorite, state.store(), caller, &slug, direction).await?;
    Ok(Json(ArticleResponse { article }))
}
