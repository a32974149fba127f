/// Tag model
///
/// Tags are created implicitly the first time an article references them
/// and are never deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id BIGSERIAL PRIMARY KEY,
///     name TEXT NOT NULL UNIQUE
/// );
///
/// CREATE TABLE article_tags (
///     article_id UUID NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
///     tag_id BIGINT NOT NULL REFERENCES tags(id),
///     position INT NOT NULL,
///     PRIMARY KEY (article_id, tag_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    /// Returns the ID of the tag called `name`, creating it if needed
    pub async fn upsert(conn: &mut PgConnection, name: &str) -> Result<i64, sqlx::Error> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tags (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    /// All tag names in creation order
    pub async fn list_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let names = sqlx::query_as::<_, (String,)>("SELECT name FROM tags ORDER BY id")
            .fetch_all(pool)
            .await?;

        Ok(names.into_iter().map(|(name,)| name).collect())
    }
}

/// Trims, drops blanks and de-duplicates tag names, keeping first-seen order
pub fn normalize_tags<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref().trim();
        if !name.is_empty() && !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(["dragons", " training ", "", "dragons", "angularjs"]);
        assert_eq!(tags, vec!["dragons", "training", "angularjs"]);
    }

    #[test]
    fn test_normalize_tags_empty() {
        assert!(normalize_tags(Vec::<String>::new()).is_empty());
    }
}
