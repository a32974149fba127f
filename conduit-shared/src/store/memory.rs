/// In-memory store
///
/// Keeps every table in process-local collections behind a single
/// `RwLock`. Unique keys and cascades behave like the PostgreSQL schema so
/// handler tests exercise the same rules as production.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ArticleStore, CommentStore, Store, StoreError, StoreResult, TagStore, UserStore};
use crate::models::{
    article::{Article, ArticleQuery, CreateArticle, Page, UpdateArticle},
    comment::{Comment, CreateComment, UpdateComment},
    user::{CreateUser, UpdateUser, User},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,

    /// Insertion order, oldest first
    articles: Vec<Article>,

    comments: Vec<Comment>,
    tags: Vec<String>,

    /// (user, article)
    favorites: HashSet<(Uuid, Uuid)>,

    /// (follower, followed)
    follows: HashSet<(Uuid, Uuid)>,

    next_comment_id: i64,
}

impl Tables {
    fn with_favorites(&self, article: &Article) -> Article {
        let count = self
            .favorites
            .iter()
            .filter(|(_, article_id)| *article_id == article.id)
            .count();

        let mut article = article.clone();
        article.favorites_count = count as i64;
        article
    }

    /// Unique-key check for a user write; `id` is the row being updated
    fn user_conflict(
        &self,
        id: Option<Uuid>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Option<StoreError> {
        let others = || self.users.iter().filter(move |u| Some(u.id) != id);

        if let Some(username) = username {
            if others().any(|u| u.username == username) {
                return Some(StoreError::Conflict("users_username_key".to_string()));
            }
        }
        if let Some(email) = email {
            if others().any(|u| u.email == email) {
                return Some(StoreError::Conflict("users_email_key".to_string()));
            }
        }
        None
    }

    fn matches(&self, article: &Article, query: &ArticleQuery) -> bool {
        if let Some(author) = &query.author {
            let written_by = self
                .users
                .iter()
                .any(|u| u.id == article.author_id && &u.username == author);
            if !written_by {
                return false;
            }
        }
        if let Some(tag) = &query.tag {
            if !article.tag_list.contains(tag) {
                return false;
            }
        }
        if let Some(user_id) = query.favorited_by {
            if !self.favorites.contains(&(user_id, article.id)) {
                return false;
            }
        }
        if let Some(user_id) = query.followed_by {
            if !self.follows.contains(&(user_id, article.author_id)) {
                return false;
            }
        }
        true
    }
}

/// Store holding all data in memory; cloning is not supported, share it
/// behind an `Arc`
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if let Some(conflict) =
            tables.user_conflict(None, Some(&data.username), Some(&data.email))
        {
            return Err(conflict);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            bio: None,
            image: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;

        if let Some(conflict) =
            tables.user_conflict(Some(id), data.username.as_deref(), data.email.as_deref())
        {
            return Err(conflict);
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        data.apply_to(user);
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn is_following(&self, follower: Uuid, followed: Uuid) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.follows.contains(&(follower, followed)))
    }

    async fn follow(&self, follower: Uuid, followed: Uuid) -> StoreResult<()> {
        self.tables.write().await.follows.insert((follower, followed));
        Ok(())
    }

    async fn unfollow(&self, follower: Uuid, followed: Uuid) -> StoreResult<()> {
        self.tables.write().await.follows.remove(&(follower, followed));
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn find_article_by_slug(&self, slug: &str) -> StoreResult<Option<Article>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.slug == slug)
            .map(|a| tables.with_favorites(a)))
    }

    async fn find_article_by_title(&self, title: &str) -> StoreResult<Option<Article>> {
        let tables = self.tables.read().await;
        Ok(tables
            .articles
            .iter()
            .find(|a| a.title == title)
            .map(|a| tables.with_favorites(a)))
    }

    async fn create_article(&self, data: CreateArticle) -> StoreResult<Article> {
        let mut tables = self.tables.write().await;

        if tables.articles.iter().any(|a| a.slug == data.slug) {
            return Err(StoreError::Conflict("articles_slug_key".to_string()));
        }
        if tables.articles.iter().any(|a| a.title == data.title) {
            return Err(StoreError::Conflict("articles_title_key".to_string()));
        }

        for name in &data.tag_list {
            if !tables.tags.contains(name) {
                tables.tags.push(name.clone());
            }
        }

        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            slug: data.slug,
            title: data.title,
            description: data.description,
            body: data.body,
            author_id: data.author_id,
            tag_list: data.tag_list,
            favorites_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.articles.push(article.clone());

        Ok(article)
    }

    async fn update_article(&self, id: Uuid, data: UpdateArticle) -> StoreResult<Option<Article>> {
        let mut tables = self.tables.write().await;

        if let Some(title) = &data.title {
            if tables.articles.iter().any(|a| a.id != id && &a.title == title) {
                return Err(StoreError::Conflict("articles_title_key".to_string()));
            }
        }

        let Some(article) = tables.articles.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        data.apply_to(article);
        article.updated_at = Utc::now();

        let article = article.clone();
        Ok(Some(tables.with_favorites(&article)))
    }

    async fn delete_article(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.articles.len();
        tables.articles.retain(|a| a.id != id);
        if tables.articles.len() == before {
            return Ok(false);
        }

        tables.comments.retain(|c| c.article_id != id);
        tables.favorites.retain(|(_, article_id)| *article_id != id);

        Ok(true)
    }

    async fn list_articles(
        &self,
        query: &ArticleQuery,
        page: Page,
    ) -> StoreResult<(Vec<Article>, i64)> {
        let tables = self.tables.read().await;

        let matching: Vec<&Article> = tables
            .articles
            .iter()
            .rev()
            .filter(|a| tables.matches(a, query))
            .collect();
        let total = matching.len() as i64;

        let articles = matching
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .map(|a| tables.with_favorites(a))
            .collect();

        Ok((articles, total))
    }

    async fn is_favorited(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.favorites.contains(&(user_id, article_id)))
    }

    async fn favorite(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<()> {
        self.tables.write().await.favorites.insert((user_id, article_id));
        Ok(())
    }

    async fn unfavorite(&self, user_id: Uuid, article_id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .favorites
            .remove(&(user_id, article_id));
        Ok(())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;

        tables.next_comment_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: tables.next_comment_id,
            body: data.body,
            article_id: data.article_id,
            author_id: data.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn find_comment(&self, article_id: Uuid, id: i64) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .find(|c| c.id == id && c.article_id == article_id)
            .cloned())
    }

    async fn update_comment(&self, id: i64, data: UpdateComment) -> StoreResult<Option<Comment>> {
        let mut tables = self.tables.write().await;

        let Some(comment) = tables.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(body) = data.body {
            comment.body = body;
        }
        comment.updated_at = Utc::now();

        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);

        Ok(tables.comments.len() < before)
    }

    async fn list_comments(&self, article_id: Uuid) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .rev()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TagStore for MemoryStore {
    async fn list_tags(&self) -> StoreResult<Vec<String>> {
        Ok(self.tables.read().await.tags.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> CreateUser {
        CreateUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "digest".to_string(),
        }
    }

    fn new_article(author_id: Uuid, title: &str, tags: &[&str]) -> CreateArticle {
        CreateArticle {
            author_id,
            slug: slug::slugify(title),
            title: title.to_string(),
            description: "description".to_string(),
            body: "body".to_string(),
            tag_list: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("jake")).await.unwrap();

        let mut other = new_user("jake");
        other.email = "other@example.com".to_string();

        assert!(matches!(
            store.create_user(other).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_user_may_keep_own_email() {
        let store = MemoryStore::new();
        let jake = store.create_user(new_user("jake")).await.unwrap();

        let updated = store
            .update_user(
                jake.id,
                UpdateUser {
                    email: Some(jake.email.clone()),
                    bio: Some(Some("hello".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.bio.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_total() {
        let store = MemoryStore::new();
        let jake = store.create_user(new_user("jake")).await.unwrap();

        for title in ["first", "second", "third"] {
            store
                .create_article(new_article(jake.id, title, &["rust"]))
                .await
                .unwrap();
        }

        let (page, total) = store
            .list_articles(&ArticleQuery::default(), Page::new(Some(2), Some(0)))
            .await
            .unwrap();

        assert_eq!(total, 3);
        let slugs: Vec<_> = page.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["third", "second"]);
    }

    #[tokio::test]
    async fn test_favorites_count_and_filter() {
        let store = MemoryStore::new();
        let jake = store.create_user(new_user("jake")).await.unwrap();
        let jane = store.create_user(new_user("jane")).await.unwrap();
        let article = store
            .create_article(new_article(jake.id, "dragons", &[]))
            .await
            .unwrap();
        store
            .create_article(new_article(jake.id, "unicorns", &[]))
            .await
            .unwrap();

        store.favorite(jane.id, article.id).await.unwrap();
        store.favorite(jane.id, article.id).await.unwrap();

        let query = ArticleQuery {
            favorited_by: Some(jane.id),
            ..Default::default()
        };
        let (page, total) = store.list_articles(&query, Page::default()).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(page[0].favorites_count, 1);
    }

    #[tokio::test]
    async fn test_delete_article_cascades() {
        let store = MemoryStore::new();
        let jake = store.create_user(new_user("jake")).await.unwrap();
        let article = store
            .create_article(new_article(jake.id, "dragons", &["dragons"]))
            .await
            .unwrap();
        store
            .create_comment(CreateComment {
                article_id: article.id,
                author_id: jake.id,
                body: "nice".to_string(),
            })
            .await
            .unwrap();
        store.favorite(jake.id, article.id).await.unwrap();

        assert!(store.delete_article(article.id).await.unwrap());
        assert!(store.list_comments(article.id).await.unwrap().is_empty());
        assert!(!store.is_favorited(jake.id, article.id).await.unwrap());
        // Tags outlive their articles
        assert_eq!(store.list_tags().await.unwrap(), vec!["dragons"]);
    }

    #[tokio::test]
    async fn test_find_comment_is_scoped_to_article() {
        let store = MemoryStore::new();
        let jake = store.create_user(new_user("jake")).await.unwrap();
        let first = store
            .create_article(new_article(jake.id, "first", &[]))
            .await
            .unwrap();
        let second = store
            .create_article(new_article(jake.id, "second", &[]))
            .await
            .unwrap();
        let comment = store
            .create_comment(CreateComment {
                article_id: first.id,
                author_id: jake.id,
                body: "hi".to_string(),
            })
            .await
            .unwrap();

        assert!(store.find_comment(first.id, comment.id).await.unwrap().is_some());
        assert!(store.find_comment(second.id, comment.id).await.unwrap().is_none());
    }
}
