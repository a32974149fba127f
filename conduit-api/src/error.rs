/// Error handling for the API server
///
/// Route handlers return [`ApiResult`]. Domain errors from the handler
/// layer convert with `?`; collaborator failures are logged and masked as
/// `internal_error`.
///
/// # Response Body
///
/// ```json
/// {
///   "error": "field_required",
///   "message": "title can't be blank",
///   "details": [{ "field": "title", "message": "can't be blank" }]
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use conduit_shared::{
    auth::{jwt::JwtError, middleware::AuthError},
    error::DomainError,
};
use serde::{Deserialize, Serialize};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request body (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// A write lost a race on a unique key (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Payload failed a domain rule (422)
    #[error("Unprocessable: {message}")]
    Unprocessable {
        code: &'static str,
        message: String,
        details: Vec<ValidationErrorDetail>,
    },

    /// Internal server error (500); the message is logged, never returned
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "field_required")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Offending fields, for 422 responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Unprocessable {
                code,
                message,
                details,
            } => (StatusCode::UNPROCESSABLE_ENTITY, code, message, Some(details)),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::Unauthorized => ApiError::Unauthorized(message),
            DomainError::Forbidden(_) => ApiError::Forbidden(message),
            DomainError::NotFound(_) => ApiError::NotFound(message),
            DomainError::FieldRequired(field) => unprocessable(
                "field_required",
                message,
                field.to_string(),
                "can't be blank".to_string(),
            ),
            DomainError::AlreadyTaken(field) => unprocessable(
                "already_taken",
                message,
                field.to_string(),
                "has already been taken".to_string(),
            ),
            DomainError::Validation {
                field,
                message: detail,
            } => unprocessable("validation_error", message, field, detail),
            DomainError::Store(conduit_shared::store::StoreError::Conflict(constraint)) => {
                ApiError::Conflict(format!("Constraint violation: {}", constraint))
            }
            DomainError::Store(_) | DomainError::Password(_) | DomainError::Token(_) => {
                ApiError::InternalError(message)
            }
        }
    }
}

fn unprocessable(code: &'static str, message: String, field: String, detail: String) -> ApiError {
    ApiError::Unprocessable {
        code,
        message,
        details: vec![ValidationErrorDetail {
            field,
            message: detail,
        }],
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidFormat(msg) => ApiError::Unauthorized(msg),
            AuthError::InvalidToken(err) => err.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert JSON body rejections to API errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert query string rejections to API errors
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
