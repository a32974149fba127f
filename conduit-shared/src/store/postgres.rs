/// PostgreSQL store
///
/// Thin adapter from the [`Store`](super::Store) traits to the query
/// functions on the models. Unique violations are reported as
/// [`StoreError::Conflict`] so a lost race on a username, email or slug is
/// distinguishable from an outage.
///
/// # Example
///
/// ```no_run
/// use conduit_shared::db::pool::{create_pool, DatabaseConfig};
/// use conduit_shared::store::postgres::PgStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
/// let store = PgStore::new(pool);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{ArticleStore, CommentStore, Store, StoreError, StoreResult, TagStore, UserStore};
use crate::db::pool;
use crate::models::{
    article::{Article, ArticleQuery, CreateArticle, Page, UpdateArticle},
    comment::{Comment, CreateComment, UpdateComment},
    tag::Tag,
    user::{CreateUser, UpdateUser, User},
};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Classifies a sqlx error, surfacing unique violations as conflicts
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err
                .constraint()
                .map(str::to_string)
                .unwrap_or_else(|| db_err.message().to_string());
            debug!(constraint = %constraint, "Unique constraint violated");
            return StoreError::Conflict(constraint);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        User::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        User::find_by_email(&self.pool, email).await.map_err(classify)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        User::find_by_username(&self.pool, username)
            .await
            .map_err(classify)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        User::create(&self.pool, data).await.map_err(classify)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        User::update(&self.pool, id, data).await.map_err(classify)
    }

    async fn is_following(&self, follower: Uuid, followed: Uuid) -> StoreResult<bool> {
        User::is_following(&self.pool, follower, followed)
            .await
            .map_err(classify)
    }

    async fn follow(&self, follower: Uuid, followed: Uuid) -> StoreResult<()> {
        User::follow(&self.pool, follower, followed)
            .await
            .map_err(classify)
    }

    async fn unfollow(&self, follower: Uuid, followed: Uuid) -> StoreResult<()> {
        User::unfollow(&self.pool, follower, followed)
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl ArticleStore for PgStore {
    async fn find_article_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
        Article::find_by_slug(&self.pool, slug).await.map_err(classify)
    }

    async fn find_article_by_title(&self, title: &str) -> StoreResult<Option<Article>> {
        Article::find_by_title(&self.pool, title)
            .await
            .map_err(classify)
    }

    async fn create_article(&self, data: CreateArticle) -> StoreResult<Article> {
        Article::create(&self.pool, data).await.map_err(classify)
    }

    async fn update_article(&self, id: Uuid, data: UpdateArticle) -> StoreResult<Option<Article>> {
        Article::update(&self.pool, id, data).await.map_err(classify)
    }

    async fn delete_article(&self, id: Uuid) -> StoreResult<bool> {
        Article::delete(&self.pool, id).await.map_err(classify)
    }

    async fn list_articles(
        &self,
        query: &ArticleQuery,
        page: Page,
    ) -> StoreResult<(Vec<Article>, i64)> {
        Article::list(&self.pool, query, page)
            .await
            .map_err(classify)
    }

    async fn is_favorited(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<bool> {
        Article::is_favorited(&self.pool, user_id, article_id)
            .await
            .map_err(classify)
    }

    async fn favorite(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<()> {
        Article::favorite(&self.pool, user_id, article_id)
            .await
            .map_err(classify)
    }

    async fn unfavorite(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<()> {
        Article::unfavorite(&self.pool, user_id, article_id)
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        Comment::create(&self.pool, data).await.map_err(classify)
    }

    async fn find_comment(&self, article_id: Uuid, id: i64) -> StoreResult<Option<Comment>> {
        Comment::find(&self.pool, article_id, id)
            .await
            .map_err(classify)
    }

    async fn update_comment(&self, id: i64, data: UpdateComment) -> StoreResult<Option<Comment>> {
        Comment::update(&self.pool, id, data).await.map_err(classify)
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        Comment::delete(&self.pool, id).await.map_err(classify)
    }

    async fn list_comments(&self, article_id: Uuid) -> StoreResult<Vec<Comment>> {
        Comment::list_for_article(&self.pool, article_id)
            .await
            .map_err(classify)
    }
}

#[async_trait]
impl TagStore for PgStore {
    async fn list_tags(&self) -> StoreResult<Vec<String>> {
        Tag::list_names(&self.pool).await.map_err(classify)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        pool::health_check(&self.pool).await.map_err(classify)
    }
}
