/// Request handlers
///
/// Every handler takes the store as `&dyn Store`, the caller identity as
/// `Option<Uuid>` (None for anonymous requests) and a decoded payload, and
/// returns a serialisable representation or a [`DomainError`]. Handlers
/// never persist anything before authorization and validation have passed.
///
/// # Modules
///
/// - `ownership`: the authorize, load, check-owner, act gate
/// - `toggle`: favorite/follow add and remove
/// - `listing`: filtered article pages and the personal feed
/// - `articles`, `comments`: creation, reads, owner-only mutations
/// - `users`: sign-up, sign-in, current user
/// - `profiles`, `tags`: public reads
///
/// # Example
///
/// ```
/// use conduit_shared::auth::Credentials;
/// use conduit_shared::service::users::{sign_up, Registration};
/// use conduit_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), conduit_shared::error::DomainError> {
/// let store = MemoryStore::new();
/// let credentials = Credentials::new("your-secret-key-at-least-32-bytes");
///
/// let created = sign_up(
///     &store,
///     &credentials,
///     Registration {
///         username: Some("jake".to_string()),
///         email: Some("jake@jake.jake".to_string()),
///         password: Some("jakejake".to_string()),
///     },
/// )
/// .await?;
/// assert_eq!(created.0.username, "jake");
/// # Ok(())
/// # }
/// ```

pub mod articles;
pub mod comments;
pub mod listing;
pub mod ownership;
pub mod profiles;
pub mod tags;
pub mod toggle;
pub mod users;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{
    article::{Article, ArticleView},
    user::{Profile, User},
};
use crate::store::Store;

/// Marks a representation of a resource that was just created
#[derive(Debug, Clone, PartialEq)]
pub struct Created<T>(pub T);

/// Returned by delete handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn deleted(resource: &str) -> Self {
        Self {
            message: format!("{resource} deleted"),
        }
    }
}

/// Caller identity or `Unauthorized`
pub(crate) fn require_caller(caller: Option<Uuid>) -> DomainResult<Uuid> {
    caller.ok_or(DomainError::Unauthorized)
}

/// The trimmed value of a mandatory field, or `FieldRequired(field)` when it
/// is missing or blank
pub(crate) fn required<'a>(value: Option<&'a str>, field: &'static str) -> DomainResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::FieldRequired(field)),
    }
}

/// A mandatory secret, returned exactly as supplied; blank counts as missing
pub(crate) fn required_secret<'a>(
    value: Option<&'a str>,
    field: &'static str,
) -> DomainResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::FieldRequired(field)),
    }
}

/// Rejects a provided-but-blank optional field
pub(crate) fn not_blank(value: Option<&str>, field: &'static str) -> DomainResult<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(DomainError::FieldRequired(field)),
        _ => Ok(()),
    }
}

/// Public representation of `user` for `caller`
pub(crate) async fn profile_of(
    store: &dyn Store,
    caller: Option<Uuid>,
    user: User,
) -> DomainResult<Profile> {
    let following = match caller {
        Some(caller) => store.is_following(caller, user.id).await?,
        None => false,
    };
    Ok(Profile::new(user, following))
}

/// Loads the author of a resource; a dangling author is reported as a
/// missing user
pub(crate) async fn author_profile(
    store: &dyn Store,
    caller: Option<Uuid>,
    author_id: Uuid,
) -> DomainResult<Profile> {
    let author = store
        .find_user_by_id(author_id)
        .await?
        .ok_or(DomainError::NotFound("user"))?;
    profile_of(store, caller, author).await
}

/// Full article representation for `caller`
pub(crate) async fn article_view(
    store: &dyn Store,
    caller: Option<Uuid>,
    article: Article,
) -> DomainResult<ArticleView> {
    let author = author_profile(store, caller, article.author_id).await?;
    let favorited = match caller {
        Some(caller) => store.is_favorited(caller, article.id).await?,
        None => false,
    };
    Ok(ArticleView::new(article, author, favorited))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  hi "), "body").unwrap(), "hi");
        assert!(matches!(
            required(Some("   "), "body"),
            Err(DomainError::FieldRequired("body"))
        ));
        assert!(matches!(
            required(None, "title"),
            Err(DomainError::FieldRequired("title"))
        ));
    }

    #[test]
    fn test_required_secret_keeps_whitespace() {
        assert_eq!(required_secret(Some(" pass "), "password").unwrap(), " pass ");
        assert!(matches!(
            required_secret(Some("  "), "password"),
            Err(DomainError::FieldRequired("password"))
        ));
    }

    #[test]
    fn test_not_blank_allows_absent() {
        assert!(not_blank(None, "title").is_ok());
        assert!(not_blank(Some("x"), "title").is_ok());
        assert!(not_blank(Some(""), "title").is_err());
    }

    #[test]
    fn test_confirmation_message() {
        assert_eq!(Confirmation::deleted("article").message, "article deleted");
    }
}
