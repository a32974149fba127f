/// Relation toggles
///
/// Favoriting an article and following a user are the same operation over
/// different relations: authorize, load the target, add or remove the edge,
/// render the target as the caller now sees it. Both edges are sets, so a
/// repeated add or remove changes nothing and still succeeds.
///
/// The direction is resolved once at the HTTP boundary with
/// [`Toggle::from_method`].

use async_trait::async_trait;
use axum::http::Method;
use tracing::debug;
use uuid::Uuid;

use super::{article_view, profile_of, require_caller};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    article::{Article, ArticleView},
    user::{Profile, User},
};
use crate::store::Store;

/// Which way to flip a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Add,
    Remove,
}

impl Toggle {
    /// POST adds, DELETE removes; any other method has no direction
    pub fn from_method(method: &Method) -> Option<Self> {
        if *method == Method::POST {
            Some(Toggle::Add)
        } else if *method == Method::DELETE {
            Some(Toggle::Remove)
        } else {
            None
        }
    }
}

/// A caller-to-target relation that can be toggled
#[async_trait]
pub trait Relation: Send + Sync {
    type Target: Send + Sync;
    type View: Send;

    /// Resource name used in `NotFound`
    const TARGET: &'static str;

    async fn load(&self, store: &dyn Store, key: &str) -> DomainResult<Option<Self::Target>>;

    async fn add(&self, store: &dyn Store, caller: Uuid, target: &Self::Target)
        -> DomainResult<()>;

    async fn remove(
        &self,
        store: &dyn Store,
        caller: Uuid,
        target: &Self::Target,
    ) -> DomainResult<()>;

    async fn render(
        &self,
        store: &dyn Store,
        caller: Uuid,
        target: Self::Target,
    ) -> DomainResult<Self::View>;
}

/// Caller favorites an article, keyed by slug
#[derive(Debug, Clone, Copy, Default)]
pub struct Favorite;

#[async_trait]
impl Relation for Favorite {
    type Target = Article;
    type View = ArticleView;

    const TARGET: &'static str = "article";

    async fn load(&self, store: &dyn Store, slug: &str) -> DomainResult<Option<Article>> {
        Ok(store.find_article_by_slug(slug).await?)
    }

    async fn add(&self, store: &dyn Store, caller: Uuid, article: &Article) -> DomainResult<()> {
        Ok(store.favorite(caller, article.id).await?)
    }

    async fn remove(&self, store: &dyn Store, caller: Uuid, article: &Article) -> DomainResult<()> {
        Ok(store.unfavorite(caller, article.id).await?)
    }

    async fn render(
        &self,
        store: &dyn Store,
        caller: Uuid,
        article: Article,
    ) -> DomainResult<ArticleView> {
        // Reload so the favorites count reflects the edge just written
        let article = store
            .find_article_by_slug(&article.slug)
            .await?
            .ok_or(DomainError::NotFound(Self::TARGET))?;
        article_view(store, Some(caller), article).await
    }
}

/// Caller follows a user, keyed by username
#[derive(Debug, Clone, Copy, Default)]
pub struct Follow;

#[async_trait]
impl Relation for Follow {
    type Target = User;
    type View = Profile;

    const TARGET: &'static str = "profile";

    async fn load(&self, store: &dyn Store, username: &str) -> DomainResult<Option<User>> {
        Ok(store.find_user_by_username(username).await?)
    }

    async fn add(&self, store: &dyn Store, caller: Uuid, user: &User) -> DomainResult<()> {
        Ok(store.follow(caller, user.id).await?)
    }

    async fn remove(&self, store: &dyn Store, caller: Uuid, user: &User) -> DomainResult<()> {
        Ok(store.unfollow(caller, user.id).await?)
    }

    async fn render(&self, store: &dyn Store, caller: Uuid, user: User) -> DomainResult<Profile> {
        profile_of(store, Some(caller), user).await
    }
}

/// Adds or removes the `relation` edge from `caller` to the target at `key`
pub async fn toggle<R: Relation>(
    relation: &R,
    store: &dyn Store,
    caller: Option<Uuid>,
    key: &str,
    direction: Toggle,
) -> DomainResult<R::View> {
    let caller = require_caller(caller)?;

    let target = relation
        .load(store, key)
        .await?
        .ok_or(DomainError::NotFound(R::TARGET))?;

    match direction {
        Toggle::Add => relation.add(store, caller, &target).await?,
        Toggle::Remove => relation.remove(store, caller, &target).await?,
    }
    debug!(caller = %caller, target = R::TARGET, key, ?direction, "Relation toggled");

    relation.render(store, caller, target).await
}
