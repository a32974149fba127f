/// Article listings
///
/// `list_articles` serves `GET /api/articles` with optional `author`, `tag`
/// and `favorited` filters combined with AND; `feed` serves
/// `GET /api/articles/feed` with the articles of followed authors. Both
/// return one page, newest first, and the total number of matches.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{article_view, require_caller};
use crate::error::DomainResult;
use crate::models::article::{Article, ArticleQuery, ArticleView, Page};
use crate::store::Store;

/// Query string of the public listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    pub author: Option<String>,
    pub tag: Option<String>,

    /// Username whose favorites to list
    pub favorited: Option<String>,

    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query string of the feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FeedParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of articles and the count of all matches
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<ArticleView>,
    pub articles_count: i64,
}

impl ArticlePage {
    fn empty() -> Self {
        Self {
            articles: Vec::new(),
            articles_count: 0,
        }
    }
}

/// Lists articles matching every supplied filter
///
/// An unknown `favorited` username matches nothing; unknown authors and
/// tags fall out of the query naturally.
pub async fn list_articles(
    store: &dyn Store,
    caller: Option<Uuid>,
    params: ListParams,
) -> DomainResult<ArticlePage> {
    let favorited_by = match params.favorited.as_deref() {
        Some(username) => match store.find_user_by_username(username).await? {
            Some(user) => Some(user.id),
            None => return Ok(ArticlePage::empty()),
        },
        None => None,
    };

    let query = ArticleQuery {
        author: params.author,
        tag: params.tag,
        favorited_by,
        followed_by: None,
    };

    page_of(store, caller, &query, Page::new(params.limit, params.offset)).await
}

/// Lists articles written by users the caller follows
pub async fn feed(
    store: &dyn Store,
    caller: Option<Uuid>,
    params: FeedParams,
) -> DomainResult<ArticlePage> {
    let caller = require_caller(caller)?;

    let query = ArticleQuery {
        followed_by: Some(caller),
        ..Default::default()
    };

    page_of(store, Some(caller), &query, Page::new(params.limit, params.offset)).await
}

async fn page_of(
    store: &dyn Store,
    caller: Option<Uuid>,
    query: &ArticleQuery,
    page: Page,
) -> DomainResult<ArticlePage> {
    let (rows, total): (Vec<Article>, i64) = store.list_articles(query, page).await?;

    let mut articles = Vec::with_capacity(rows.len());
    for article in rows {
        articles.push(article_view(store, caller, article).await?);
    }

    Ok(ArticlePage {
        articles,
        articles_count: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_serialises_count_in_camel_case() {
        let json = serde_json::to_value(ArticlePage::empty()).unwrap();
        assert_eq!(json["articlesCount"], 0);
        assert!(json["articles"].as_array().unwrap().is_empty());
    }
}
