/// Comment handlers
///
/// Comments are addressed by article slug plus comment ID. A comment that
/// exists but belongs to a different article is reported as not found.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{author_profile, ownership::mutate_owned, require_caller, required};
use super::{Confirmation, Created};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    article::Article,
    comment::{Comment, CommentView, CreateComment, UpdateComment},
};
use crate::store::Store;

/// Payload of `POST /api/articles/:slug/comments`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewComment {
    pub body: Option<String>,
}

/// Payload of `PUT /api/articles/:slug/comments/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentChanges {
    pub body: Option<String>,
}

async fn find_article(store: &dyn Store, slug: &str) -> DomainResult<Article> {
    store
        .find_article_by_slug(slug)
        .await?
        .ok_or(DomainError::NotFound("article"))
}

async fn find_comment(store: &dyn Store, slug: &str, id: i64) -> DomainResult<Option<Comment>> {
    let article = find_article(store, slug).await?;
    Ok(store.find_comment(article.id, id).await?)
}

async fn comment_view(
    store: &dyn Store,
    caller: Option<Uuid>,
    comment: Comment,
) -> DomainResult<CommentView> {
    let author = author_profile(store, caller, comment.author_id).await?;
    Ok(CommentView::new(comment, author))
}

/// Adds a comment by the caller to an article
pub async fn create_comment(
    store: &dyn Store,
    caller: Option<Uuid>,
    slug: &str,
    input: NewComment,
) -> DomainResult<Created<CommentView>> {
    let author_id = require_caller(caller)?;
    let article = find_article(store, slug).await?;
    let body = required(input.body.as_deref(), "body")?;

    let comment = store
        .create_comment(CreateComment {
            article_id: article.id,
            author_id,
            body: body.to_string(),
        })
        .await?;

    info!(slug = %article.slug, comment_id = comment.id, "Comment created");

    comment_view(store, caller, comment).await.map(Created)
}

/// Comments on an article, newest first
pub async fn list_comments(
    store: &dyn Store,
    caller: Option<Uuid>,
    slug: &str,
) -> DomainResult<Vec<CommentView>> {
    let article = find_article(store, slug).await?;

    let mut views = Vec::new();
    for comment in store.list_comments(article.id).await? {
        views.push(comment_view(store, caller, comment).await?);
    }
    Ok(views)
}

/// Rewrites the body of the caller's comment
pub async fn update_comment(
    store: &dyn Store,
    caller: Option<Uuid>,
    slug: &str,
    id: i64,
    changes: CommentChanges,
) -> DomainResult<CommentView> {
    mutate_owned(
        caller,
        "comment",
        || find_comment(store, slug, id),
        |comment: &Comment| comment.author_id,
        |caller, comment| apply_changes(store, caller, comment, changes),
    )
    .await
}

async fn apply_changes(
    store: &dyn Store,
    caller: Uuid,
    comment: Comment,
    changes: CommentChanges,
) -> DomainResult<CommentView> {
    let body = match changes.body.as_deref() {
        Some(body) => Some(required(Some(body), "body")?.to_string()),
        None => None,
    };

    let updated = store
        .update_comment(comment.id, UpdateComment { body })
        .await?
        .ok_or(DomainError::NotFound("comment"))?;

    comment_view(store, Some(caller), updated).await
}

/// Deletes the caller's comment
pub async fn delete_comment(
    store: &dyn Store,
    caller: Option<Uuid>,
    slug: &str,
    id: i64,
) -> DomainResult<Confirmation> {
    mutate_owned(
        caller,
        "comment",
        || find_comment(store, slug, id),
        |comment: &Comment| comment.author_id,
        |_, comment| remove(store, comment),
    )
    .await
}

async fn remove(store: &dyn Store, comment: Comment) -> DomainResult<Confirmation> {
    if !store.delete_comment(comment.id).await? {
        return Err(DomainError::NotFound("comment"));
    }

    info!(comment_id = comment.id, "Comment deleted");
    Ok(Confirmation::deleted("comment"))
}
