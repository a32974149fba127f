/// Article model, favorites and listing queries
///
/// Articles are addressed externally by slug. The tag list and the
/// favorites count are derived columns computed by [`ARTICLE_SELECT`], so
/// every read returns a fully populated [`Article`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE articles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     slug TEXT NOT NULL UNIQUE,
///     title TEXT NOT NULL UNIQUE,
///     description TEXT NOT NULL,
///     body TEXT NOT NULL,
///     author_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE favorites (
///     user_id UUID NOT NULL REFERENCES users(id),
///     article_id UUID NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
///     PRIMARY KEY (user_id, article_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::tag::Tag;
use super::user::Profile;

/// Article row with derived tag list and favorites count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    /// Internal ID
    pub id: Uuid,

    /// External key, derived from the title at creation and never changed
    pub slug: String,

    pub title: String,
    pub description: String,
    pub body: String,

    /// Owning user
    pub author_id: Uuid,

    /// Tag names in the order they were given
    pub tag_list: Vec<String>,

    /// Number of users who favorited the article
    pub favorites_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticle {
    pub author_id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,

    /// Tag names, already de-duplicated
    pub tag_list: Vec<String>,
}

/// Input for updating an article; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

impl UpdateArticle {
    /// Applies the update to an in-memory article
    pub fn apply_to(self, article: &mut Article) {
        if let Some(title) = self.title {
            article.title = title;
        }
        if let Some(description) = self.description {
            article.description = description;
        }
        if let Some(body) = self.body {
            article.body = body;
        }
    }
}

/// Conjunctive filter for article listings
///
/// Usernames are resolved by the store; `favorited_by` and `followed_by`
/// are already-resolved user IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    /// Only articles written by this username
    pub author: Option<String>,

    /// Only articles carrying this tag
    pub tag: Option<String>,

    /// Only articles favorited by this user
    pub favorited_by: Option<Uuid>,

    /// Only articles whose author this user follows
    pub followed_by: Option<Uuid>,
}

/// Pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    /// Builds a page from optional query parameters
    ///
    /// Missing values take the defaults (20, 0); the limit is clamped to
    /// `1..=MAX_LIMIT` and negative offsets become 0.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Public representation of an article for a (possibly anonymous) caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorited: bool,
    pub favorites_count: i64,
    pub author: Profile,
}

impl ArticleView {
    pub fn new(article: Article, author: Profile, favorited: bool) -> Self {
        Self {
            slug: article.slug,
            title: article.title,
            description: article.description,
            body: article.body,
            tag_list: article.tag_list,
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited,
            favorites_count: article.favorites_count,
            author,
        }
    }
}

/// Select list shared by every article read
pub const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.slug, a.title, a.description, a.body, a.author_id,
           ARRAY(
               SELECT t.name FROM article_tags at
               JOIN tags t ON t.id = at.tag_id
               WHERE at.article_id = a.id
               ORDER BY at.position
           ) AS tag_list,
           (SELECT COUNT(*) FROM favorites f WHERE f.article_id = a.id) AS favorites_count,
           a.created_at, a.updated_at
    FROM articles a
"#;

/// Appends the WHERE clause for `query` to a builder
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ArticleQuery) {
    builder.push(" WHERE TRUE");

    if let Some(author) = &query.author {
        builder
            .push(" AND a.author_id IN (SELECT id FROM users WHERE username = ")
            .push_bind(author.clone())
            .push(")");
    }
    if let Some(tag) = &query.tag {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM article_tags at JOIN tags t ON t.id = at.tag_id \
                 WHERE at.article_id = a.id AND t.name = ",
            )
            .push_bind(tag.clone())
            .push(")");
    }
    if let Some(user_id) = query.favorited_by {
        builder
            .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.article_id = a.id AND f.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
    if let Some(user_id) = query.followed_by {
        builder
            .push(" AND a.author_id IN (SELECT followed_id FROM follows WHERE follower_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

/// Builds the page query for a listing
pub fn list_query(query: &ArticleQuery, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(ARTICLE_SELECT);
    push_filters(&mut builder, query);
    builder
        .push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset);
    builder
}

/// Builds the count query for a listing
pub fn count_query(query: &ArticleQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM articles a");
    push_filters(&mut builder, query);
    builder
}

impl Article {
    /// Finds an article by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!("{ARTICLE_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an article by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!("{ARTICLE_SELECT} WHERE a.slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Finds an article by exact title
    pub async fn find_by_title(pool: &PgPool, title: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!("{ARTICLE_SELECT} WHERE a.title = $1"))
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Inserts an article and links its tags in one transaction
    ///
    /// Unknown tag names are created on the way.
    pub async fn create(pool: &PgPool, data: CreateArticle) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO articles (slug, title, description, body, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.body)
        .bind(data.author_id)
        .fetch_one(&mut *tx)
        .await?;

        for (position, name) in data.tag_list.iter().enumerate() {
            let tag_id = Tag::upsert(&mut *tx, name).await?;

            sqlx::query(
                "INSERT INTO article_tags (article_id, tag_id, position) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(tag_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Updates an existing article
    ///
    /// Only non-None fields are written; `updated_at` is always refreshed.
    /// Returns None if the article does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateArticle,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE articles SET updated_at = NOW()");

        if let Some(title) = data.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(body) = data.body {
            builder.push(", body = ").push_bind(body);
        }
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(pool, id).await
    }

    /// Deletes an article; comments, favorites and tag links cascade
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists one page of articles matching `query`, newest first, with the
    /// total number of matches
    pub async fn list(
        pool: &PgPool,
        query: &ArticleQuery,
        page: Page,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let articles = list_query(query, page)
            .build_query_as::<Article>()
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = count_query(query)
            .build_query_as()
            .fetch_one(pool)
            .await?;

        Ok((articles, total))
    }

    /// Whether `user_id` has favorited `article_id`
    pub async fn is_favorited(
        pool: &PgPool,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND article_id = $2)",
        )
        .bind(user_id)
        .bind(article_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Adds a favorite; a no-op if it already exists
    pub async fn favorite(pool: &PgPool, user_id: Uuid, article_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, article_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, article_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(article_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a favorite; a no-op if it does not exist
    pub async fn unfavorite(
        pool: &PgPool,
        user_id: Uuid,
        article_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND article_id = $2")
            .bind(user_id)
            .bind(article_id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
