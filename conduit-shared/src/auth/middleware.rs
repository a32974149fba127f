/// Request authentication context
///
/// The API's auth middleware reads the `Authorization` header, verifies the
/// session token and stores an [`AuthContext`] in the request extensions.
/// Requests without the header carry no context and reach the handlers as
/// anonymous callers; the handlers decide whether that is acceptable.
///
/// Both `Token <jwt>` (the RealWorld convention) and `Bearer <jwt>` are
/// accepted.
///
/// # Example
///
/// ```
/// use conduit_shared::auth::middleware::extract_token;
///
/// assert_eq!(extract_token("Token abc.def.ghi").unwrap(), "abc.def.ghi");
/// assert_eq!(extract_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
/// assert!(extract_token("Basic dXNlcjpwYXNz").is_err());
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::Credentials;
use super::jwt::JwtError;

/// Authenticated caller attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Verified user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context for a verified user
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Authorization header present but not `Token`/`Bearer`
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::InvalidToken(err) => {
                (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
            }
        }
    }
}

/// Strips the `Token ` or `Bearer ` scheme from an Authorization value
pub fn extract_token(value: &str) -> Result<&str, AuthError> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AuthError::InvalidFormat("Expected `Token <jwt>` authorization".to_string())
        })
}

/// Resolves the caller for a request
///
/// Returns `Ok(None)` when no Authorization header is present.
pub fn authenticate(
    headers: &HeaderMap,
    credentials: &Credentials,
) -> Result<Option<AuthContext>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not ASCII".to_string()))?;

    let token = extract_token(value)?;
    let user_id = credentials.verify(token).map_err(AuthError::InvalidToken)?;

    Ok(Some(AuthContext::new(user_id)))
}
