/// API route handlers
///
/// Thin adapters from HTTP to [`conduit_shared::service`]: unwrap the
/// RealWorld envelope, call the handler with the caller identity, wrap the
/// result in its envelope.
///
/// - `users`: sign-up, sign-in, current user
/// - `profiles`: profiles and follows
/// - `articles`: articles, listing, feed, favorites
/// - `comments`: comments on an article
/// - `tags`: tag list
/// - `health`: store health check

pub mod articles;
pub mod comments;
pub mod health;
pub mod profiles;
pub mod tags;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use conduit_shared::auth::middleware::AuthContext;
use std::convert::Infallible;
use uuid::Uuid;

use crate::error::ApiError;

/// Identity of the caller, None for anonymous requests
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Option<Uuid>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(
            parts.extensions.get::<AuthContext>().map(|context| context.user_id),
        ))
    }
}

/// JSON body extractor whose rejections use the API error format
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error format
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
