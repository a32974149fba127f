/// Domain error taxonomy
///
/// Every handler in [`crate::service`] returns [`DomainResult`]. The six
/// domain kinds are constructed by the handlers themselves; the remaining
/// variants carry collaborator failures through untouched so the HTTP layer
/// can decide how much of them to expose.
///
/// # Status Mapping
///
/// | Kind | Status |
/// |---|---|
/// | `Unauthorized` | 401 |
/// | `Forbidden` | 403 |
/// | `NotFound` | 404 |
/// | `FieldRequired` | 422 |
/// | `AlreadyTaken` | 422 |
/// | `Validation` | 422 |
/// | collaborator failures | 500 (409 for store conflicts) |
///
/// # Example
///
/// ```
/// use conduit_shared::error::DomainError;
/// use axum::http::StatusCode;
///
/// let err = DomainError::FieldRequired("title");
/// assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
/// assert_eq!(err.to_string(), "title can't be blank");
/// ```

use axum::http::StatusCode;

use crate::auth::{jwt::JwtError, password::PasswordError};
use crate::store::StoreError;

/// Result alias used by every handler
pub type DomainResult<T> = Result<T, DomainError>;

/// Closed set of handler failures
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// No caller identity was attached to the request
    #[error("authentication required")]
    Unauthorized,

    /// Caller is authenticated but does not own the resource
    #[error("only the author may modify this {0}")]
    Forbidden(&'static str),

    /// Requested resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A mandatory payload field is missing or blank
    #[error("{0} can't be blank")]
    FieldRequired(&'static str),

    /// A uniqueness constraint would be violated
    #[error("{0} has already been taken")]
    AlreadyTaken(&'static str),

    /// A supplied value failed a semantic check
    #[error("{field} {message}")]
    Validation { field: String, message: String },

    /// Unexpected persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected password hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Unexpected token signing failure
    #[error(transparent)]
    Token(#[from] JwtError),
}

impl DomainError {
    /// Builds a `Validation` error for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::FieldRequired(_)
            | DomainError::AlreadyTaken(_)
            | DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            DomainError::Store(_) | DomainError::Password(_) | DomainError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Unauthorized => "unauthorized",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::NotFound(_) => "not_found",
            DomainError::FieldRequired(_) => "field_required",
            DomainError::AlreadyTaken(_) => "already_taken",
            DomainError::Validation { .. } => "validation_error",
            DomainError::Store(StoreError::Conflict(_)) => "conflict",
            DomainError::Store(_) | DomainError::Password(_) | DomainError::Token(_) => {
                "internal_error"
            }
        }
    }

    /// Payload field the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            DomainError::FieldRequired(field) | DomainError::AlreadyTaken(field) => Some(field),
            DomainError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(DomainError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(DomainError::Forbidden("article").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(DomainError::NotFound("article").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            DomainError::AlreadyTaken("email").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            DomainError::validation("email or password", "is invalid").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            DomainError::Store(StoreError::Backend("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DomainError::Store(StoreError::Conflict("users_email_key".to_string())).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_messages_name_the_field() {
        assert_eq!(DomainError::FieldRequired("body").to_string(), "body can't be blank");
        assert_eq!(
            DomainError::AlreadyTaken("username").to_string(),
            "username has already been taken"
        );
        assert_eq!(DomainError::NotFound("comment").to_string(), "comment not found");
        assert_eq!(DomainError::FieldRequired("title").field(), Some("title"));
        assert_eq!(DomainError::Unauthorized.field(), None);
    }
}
