/// Comment model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id BIGSERIAL PRIMARY KEY,
///     body TEXT NOT NULL,
///     article_id UUID NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::Profile;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// External key
    pub id: i64,
    pub body: String,
    pub article_id: Uuid,

    /// Owning user
    pub author_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateComment {
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub author: Profile,
}

impl CommentView {
    pub fn new(comment: Comment, author: Profile) -> Self {
        Self {
            id: comment.id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            body: comment.body,
            author,
        }
    }
}

const COMMENT_COLUMNS: &str = "id, body, article_id, author_id, created_at, updated_at";

impl Comment {
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (body, article_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(data.body)
        .bind(data.article_id)
        .bind(data.author_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a comment by ID, scoped to its article
    pub async fn find(
        pool: &PgPool,
        article_id: Uuid,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1 AND article_id = $2"
        ))
        .bind(id)
        .bind(article_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateComment,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET body = COALESCE($2, body), updated_at = NOW()
            WHERE id = $1
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.body)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Comments on an article, newest first
    pub async fn list_for_article(
        pool: &PgPool,
        article_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE article_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(article_id)
        .fetch_all(pool)
        .await
    }
}
