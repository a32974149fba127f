/// Article handlers
///
/// Creation derives the slug from the title once; later title changes keep
/// the slug so existing links stay valid. Update and delete go through
/// [`mutate_owned`].

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{article_view, not_blank, ownership::mutate_owned, require_caller, required};
use super::{Confirmation, Created};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    article::{Article, ArticleView, CreateArticle, UpdateArticle},
    tag::normalize_tags,
};
use crate::store::Store;

/// Payload of `POST /api/articles`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
    pub tag_list: Option<Vec<String>>,
}

/// Payload of `PUT /api/articles/:slug`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// Publishes a new article authored by the caller
pub async fn create_article(
    store: &dyn Store,
    caller: Option<Uuid>,
    input: NewArticle,
) -> DomainResult<Created<ArticleView>> {
    let author_id = require_caller(caller)?;

    let title = required(input.title.as_deref(), "title")?;
    let description = required(input.description.as_deref(), "description")?;
    let body = required(input.body.as_deref(), "body")?;

    let slug = slug::slugify(title);
    if slug.is_empty() {
        return Err(DomainError::validation(
            "title",
            "must contain at least one letter or digit",
        ));
    }

    if store.find_article_by_title(title).await?.is_some()
        || store.find_article_by_slug(&slug).await?.is_some()
    {
        return Err(DomainError::AlreadyTaken("title"));
    }

    let article = store
        .create_article(CreateArticle {
            author_id,
            slug,
            title: title.to_string(),
            description: description.to_string(),
            body: body.to_string(),
            tag_list: normalize_tags(input.tag_list.unwrap_or_default()),
        })
        .await?;

    info!(slug = %article.slug, author_id = %author_id, "Article created");

    article_view(store, caller, article).await.map(Created)
}

/// Reads one article
pub async fn get_article(
    store: &dyn Store,
    caller: Option<Uuid>,
    slug: &str,
) -> DomainResult<ArticleView> {
    let article = store
        .find_article_by_slug(slug)
        .await?
        .ok_or(DomainError::NotFound("article"))?;

    article_view(store, caller, article).await
}

/// Overwrites the provided fields of the caller's article
pub async fn update_article(
    store: &dyn Store,
    caller: Option<Uuid>,
    slug: &str,
    changes: ArticleChanges,
) -> DomainResult<ArticleView> {
    mutate_owned(
        caller,
        "article",
        || store.find_article_by_slug(slug),
        |article: &Article| article.author_id,
        |caller, article| apply_changes(store, caller, article, changes),
    )
    .await
}

async fn apply_changes(
    store: &dyn Store,
    caller: Uuid,
    article: Article,
    changes: ArticleChanges,
) -> DomainResult<ArticleView> {
    not_blank(changes.title.as_deref(), "title")?;
    not_blank(changes.description.as_deref(), "description")?;
    not_blank(changes.body.as_deref(), "body")?;

    let title = changes.title.map(|t| t.trim().to_string());
    if let Some(title) = title.as_deref() {
        if title != article.title {
            if let Some(other) = store.find_article_by_title(title).await? {
                if other.id != article.id {
                    return Err(DomainError::AlreadyTaken("title"));
                }
            }
        }
    }

    let updated = store
        .update_article(
            article.id,
            UpdateArticle {
                title,
                description: changes.description,
                body: changes.body,
            },
        )
        .await?
        .ok_or(DomainError::NotFound("article"))?;

    info!(slug = %updated.slug, "Article updated");
    article_view(store, Some(caller), updated).await
}

/// Deletes the caller's article with its comments and favorites
pub async fn delete_article(
    store: &dyn Store,
    caller: Option<Uuid>,
    slug: &str,
) -> DomainResult<Confirmation> {
    mutate_owned(
        caller,
        "article",
        || store.find_article_by_slug(slug),
        |article: &Article| article.author_id,
        |_, article| remove(store, article),
    )
    .await
}

async fn remove(store: &dyn Store, article: Article) -> DomainResult<Confirmation> {
    if !store.delete_article(article.id).await? {
        return Err(DomainError::NotFound("article"));
    }

    info!(slug = %article.slug, "Article deleted");
    Ok(Confirmation::deleted("article"))
}
