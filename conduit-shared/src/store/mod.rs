/// Resource repository
///
/// The handlers never talk to a database directly: they receive a
/// `&dyn Store` and call the operations below. The trait is split per
/// entity and joined by [`Store`], which adds the health probe.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryStore`]: process-local maps (tests, local runs)
///
/// # Example
///
/// ```
/// use conduit_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), conduit_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// assert!(store.find_user_by_username("jake").await?.is_none());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    article::{Article, ArticleQuery, CreateArticle, Page, UpdateArticle},
    comment::{Comment, CreateComment, UpdateComment},
    user::{CreateUser, UpdateUser, User},
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// Any other backend failure
    #[error("Store error: {0}")]
    Backend(String),
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Users and the follow relation
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Returns None if the user does not exist
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>>;

    async fn is_following(&self, follower: Uuid, followed: Uuid) -> StoreResult<bool>;

    /// Idempotent insert of a follow edge
    async fn follow(&self, follower: Uuid, followed: Uuid) -> StoreResult<()>;

    /// Idempotent removal of a follow edge
    async fn unfollow(&self, follower: Uuid, followed: Uuid) -> StoreResult<()>;
}

/// Articles, their tags and the favorite relation
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn find_article_by_slug(&self, slug: &str) -> StoreResult<Option<Article>>;

    async fn find_article_by_title(&self, title: &str) -> StoreResult<Option<Article>>;

    /// Persists the article, creating unknown tags
    async fn create_article(&self, data: CreateArticle) -> StoreResult<Article>;

    /// Returns None if the article does not exist
    async fn update_article(&self, id: Uuid, data: UpdateArticle) -> StoreResult<Option<Article>>;

    /// Removes the article with its comments, favorites and tag links
    async fn delete_article(&self, id: Uuid) -> StoreResult<bool>;

    /// One page of matches, newest first, plus the total match count
    async fn list_articles(&self, query: &ArticleQuery, page: Page)
        -> StoreResult<(Vec<Article>, i64)>;

    async fn is_favorited(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<bool>;

    /// Idempotent insert of a favorite
    async fn favorite(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<()>;

    /// Idempotent removal of a favorite
    async fn unfavorite(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<()>;
}

/// Comments
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment>;

    /// Finds a comment by ID within one article
    async fn find_comment(&self, article_id: Uuid, id: i64) -> StoreResult<Option<Comment>>;

    async fn update_comment(&self, id: i64, data: UpdateComment) -> StoreResult<Option<Comment>>;

    async fn delete_comment(&self, id: i64) -> StoreResult<bool>;

    /// Comments on an article, newest first
    async fn list_comments(&self, article_id: Uuid) -> StoreResult<Vec<Comment>>;
}

/// Tags
#[async_trait]
pub trait TagStore: Send + Sync {
    /// All known tag names in creation order
    async fn list_tags(&self) -> StoreResult<Vec<String>>;
}

/// The complete repository consumed by the handlers
#[async_trait]
pub trait Store: UserStore + ArticleStore + CommentStore + TagStore {
    /// Round-trips to the backend to prove it is reachable
    async fn ping(&self) -> StoreResult<()>;
}
