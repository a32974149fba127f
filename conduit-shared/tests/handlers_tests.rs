/// Integration tests for the request handlers
///
/// Every handler runs against the in-memory store, so these tests need no
/// external services.

use conduit_shared::{
    auth::Credentials,
    error::DomainError,
    service::{
        articles::{self, ArticleChanges, NewArticle},
        comments::{self, CommentChanges, NewComment},
        listing::{self, FeedParams, ListParams},
        profiles,
        tags,
        toggle::{toggle, Favorite, Follow, Toggle},
        users::{self, Login, Registration, UserChanges},
    },
    store::{memory::MemoryStore, ArticleStore, UserStore},
};
use uuid::Uuid;

const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Helper to register a user and return its ID
async fn register(store: &MemoryStore, credentials: &Credentials, username: &str) -> Uuid {
    let created = users::sign_up(
        store,
        credentials,
        Registration {
            username: Some(username.to_string()),
            email: Some(format!("{username}@example.com")),
            password: Some("password123".to_string()),
        },
    )
    .await
    .unwrap();

    store
        .find_user_by_username(&created.0.username)
        .await
        .unwrap()
        .unwrap()
        .id
}

/// Helper to publish an article and return its slug
async fn publish(store: &MemoryStore, author: Uuid, title: &str, tags: &[&str]) -> String {
    articles::create_article(
        store,
        Some(author),
        NewArticle {
            title: Some(title.to_string()),
            description: Some("description".to_string()),
            body: Some("body".to_string()),
            tag_list: Some(tags.iter().map(|t| t.to_string()).collect()),
        },
    )
    .await
    .unwrap()
    .0
    .slug
}

fn setup() -> (MemoryStore, Credentials) {
    (MemoryStore::new(), Credentials::new(SECRET))
}

#[tokio::test]
async fn test_mutations_require_a_caller() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let slug = publish(&store, jake, "Dragons", &[]).await;

    let create = articles::create_article(&store, None, NewArticle::default()).await;
    assert!(matches!(create, Err(DomainError::Unauthorized)));

    let delete = articles::delete_article(&store, None, &slug).await;
    assert!(matches!(delete, Err(DomainError::Unauthorized)));

    let favorite = toggle(&Favorite, &store, None, &slug, Toggle::Add).await;
    assert!(matches!(favorite, Err(DomainError::Unauthorized)));

    let feed = listing::feed(&store, None, FeedParams::default()).await;
    assert!(matches!(feed, Err(DomainError::Unauthorized)));

    let me = users::current_user(&store, &credentials, None).await;
    assert!(matches!(me, Err(DomainError::Unauthorized)));
}

#[tokio::test]
async fn test_missing_resource_is_reported_before_ownership() {
    let (store, credentials) = setup();
    let jane = register(&store, &credentials, "jane").await;

    let result = articles::update_article(
        &store,
        Some(jane),
        "no-such-article",
        ArticleChanges::default(),
    )
    .await;

    assert!(matches!(result, Err(DomainError::NotFound("article"))));
}

#[tokio::test]
async fn test_non_author_is_forbidden_and_nothing_changes() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let jane = register(&store, &credentials, "jane").await;
    let slug = publish(&store, jake, "Dragons", &[]).await;

    let update = articles::update_article(
        &store,
        Some(jane),
        &slug,
        ArticleChanges {
            body: Some("hijacked".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(update, Err(DomainError::Forbidden("article"))));

    let delete = articles::delete_article(&store, Some(jane), &slug).await;
    assert!(matches!(delete, Err(DomainError::Forbidden("article"))));

    let article = articles::get_article(&store, None, &slug).await.unwrap();
    assert_eq!(article.body, "body");
}

#[tokio::test]
async fn test_deleted_article_is_gone() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let slug = publish(&store, jake, "Dragons", &[]).await;

    let confirmation = articles::delete_article(&store, Some(jake), &slug)
        .await
        .unwrap();
    assert_eq!(confirmation.message, "article deleted");

    let result = articles::get_article(&store, None, &slug).await;
    assert!(matches!(result, Err(DomainError::NotFound("article"))));
}

#[tokio::test]
async fn test_create_article_requires_title() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;

    let result = articles::create_article(
        &store,
        Some(jake),
        NewArticle {
            title: Some("   ".to_string()),
            description: Some("d".to_string()),
            body: Some("b".to_string()),
            tag_list: None,
        },
    )
    .await;

    assert!(matches!(result, Err(DomainError::FieldRequired("title"))));
}

#[tokio::test]
async fn test_duplicate_title_persists_nothing() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    publish(&store, jake, "Dragons", &["a"]).await;

    let result = articles::create_article(
        &store,
        Some(jake),
        NewArticle {
            title: Some("Dragons".to_string()),
            description: Some("other".to_string()),
            body: Some("other".to_string()),
            tag_list: Some(vec!["b".to_string()]),
        },
    )
    .await;
    assert!(matches!(result, Err(DomainError::AlreadyTaken("title"))));

    let page = listing::list_articles(&store, None, ListParams::default())
        .await
        .unwrap();
    assert_eq!(page.articles_count, 1);
    assert_eq!(tags::list_tags(&store).await.unwrap().tags, vec!["a"]);
}

#[tokio::test]
async fn test_favorite_toggle_is_idempotent() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let jane = register(&store, &credentials, "jane").await;
    let slug = publish(&store, jake, "Dragons", &[]).await;

    for _ in 0..2 {
        let view = toggle(&Favorite, &store, Some(jane), &slug, Toggle::Add)
            .await
            .unwrap();
        assert!(view.favorited);
        assert_eq!(view.favorites_count, 1);
    }

    for _ in 0..2 {
        let view = toggle(&Favorite, &store, Some(jane), &slug, Toggle::Remove)
            .await
            .unwrap();
        assert!(!view.favorited);
        assert_eq!(view.favorites_count, 0);
    }

    let missing = toggle(&Favorite, &store, Some(jane), "nope", Toggle::Add).await;
    assert!(matches!(missing, Err(DomainError::NotFound("article"))));
}

#[tokio::test]
async fn test_follow_toggle_and_profile() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let jane = register(&store, &credentials, "jane").await;

    let profile = toggle(&Follow, &store, Some(jane), "jake", Toggle::Add)
        .await
        .unwrap();
    assert!(profile.following);
    assert!(store.is_following(jane, jake).await.unwrap());

    let seen_by_jane = profiles::get_profile(&store, Some(jane), "jake").await.unwrap();
    assert!(seen_by_jane.following);

    let anonymous = profiles::get_profile(&store, None, "jake").await.unwrap();
    assert!(!anonymous.following);

    let profile = toggle(&Follow, &store, Some(jane), "jake", Toggle::Remove)
        .await
        .unwrap();
    assert!(!profile.following);

    let missing = profiles::get_profile(&store, None, "nobody").await;
    assert!(matches!(missing, Err(DomainError::NotFound("profile"))));
}

#[tokio::test]
async fn test_listing_without_filters_counts_everything() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    for i in 0..5 {
        publish(&store, jake, &format!("Article {i}"), &[]).await;
    }

    let page = listing::list_articles(
        &store,
        None,
        ListParams {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(page.articles_count, 5);
    let titles: Vec<_> = page.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Article 3", "Article 2"]);
}

#[tokio::test]
async fn test_listing_filters_compose() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let jane = register(&store, &credentials, "jane").await;
    let one = publish(&store, jake, "One", &["rust"]).await;
    publish(&store, jake, "Two", &["go"]).await;
    publish(&store, jane, "Three", &["rust"]).await;
    toggle(&Favorite, &store, Some(jane), &one, Toggle::Add)
        .await
        .unwrap();

    let page = listing::list_articles(
        &store,
        Some(jane),
        ListParams {
            tag: Some("rust".to_string()),
            favorited: Some("jane".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.articles_count, 1);
    assert_eq!(page.articles[0].slug, one);
    assert!(page.articles[0].favorited);

    let unknown = listing::list_articles(
        &store,
        None,
        ListParams {
            favorited: Some("nobody".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(unknown.articles_count, 0);
    assert!(unknown.articles.is_empty());
}

#[tokio::test]
async fn test_feed_lists_followed_authors_only() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let jane = register(&store, &credentials, "jane").await;
    publish(&store, jake, "Dragons", &[]).await;
    publish(&store, jane, "Unicorns", &[]).await;

    let empty = listing::feed(&store, Some(jane), FeedParams::default())
        .await
        .unwrap();
    assert_eq!(empty.articles_count, 0);

    store.follow(jane, jake).await.unwrap();
    let page = listing::feed(&store, Some(jane), FeedParams::default())
        .await
        .unwrap();
    assert_eq!(page.articles_count, 1);
    assert_eq!(page.articles[0].title, "Dragons");
    assert!(page.articles[0].author.following);
}

#[tokio::test]
async fn test_comment_ownership_and_scope() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let jane = register(&store, &credentials, "jane").await;
    let dragons = publish(&store, jake, "Dragons", &[]).await;
    let unicorns = publish(&store, jake, "Unicorns", &[]).await;

    let missing_body =
        comments::create_comment(&store, Some(jane), &dragons, NewComment::default()).await;
    assert!(matches!(missing_body, Err(DomainError::FieldRequired("body"))));

    let comment = comments::create_comment(
        &store,
        Some(jane),
        &dragons,
        NewComment {
            body: Some("Nice".to_string()),
        },
    )
    .await
    .unwrap()
    .0;

    let other_article =
        comments::delete_comment(&store, Some(jane), &unicorns, comment.id).await;
    assert!(matches!(other_article, Err(DomainError::NotFound("comment"))));

    let not_author = comments::update_comment(
        &store,
        Some(jake),
        &dragons,
        comment.id,
        CommentChanges {
            body: Some("Edited".to_string()),
        },
    )
    .await;
    assert!(matches!(not_author, Err(DomainError::Forbidden("comment"))));

    let listed = comments::list_comments(&store, None, &dragons).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].body, "Nice");

    comments::delete_comment(&store, Some(jane), &dragons, comment.id)
        .await
        .unwrap();
    assert!(comments::list_comments(&store, None, &dragons)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_sign_up_rejects_duplicates() {
    let (store, credentials) = setup();
    register(&store, &credentials, "jake").await;

    let same_email = users::sign_up(
        &store,
        &credentials,
        Registration {
            username: Some("other".to_string()),
            email: Some("jake@example.com".to_string()),
            password: Some("password123".to_string()),
        },
    )
    .await;
    assert!(matches!(same_email, Err(DomainError::AlreadyTaken("email"))));

    let same_username = users::sign_up(
        &store,
        &credentials,
        Registration {
            username: Some("jake".to_string()),
            email: Some("other@example.com".to_string()),
            password: Some("password123".to_string()),
        },
    )
    .await;
    assert!(matches!(same_username, Err(DomainError::AlreadyTaken("username"))));
    assert!(store.find_user_by_email("other@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sign_in() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;

    let login = |email: &str, password: &str| Login {
        email: Some(email.to_string()),
        password: Some(password.to_string()),
    };

    let user = users::sign_in(&store, &credentials, login("jake@example.com", "password123"))
        .await
        .unwrap();
    assert_eq!(user.username, "jake");
    assert_eq!(credentials.verify(&user.token).unwrap(), jake);

    let wrong = users::sign_in(&store, &credentials, login("jake@example.com", "nope")).await;
    assert!(matches!(wrong, Err(DomainError::Validation { ref field, .. }) if field == "email or password"));

    let unknown = users::sign_in(&store, &credentials, login("nobody@example.com", "x")).await;
    assert!(matches!(unknown, Err(DomainError::NotFound("user"))));

    let blank = users::sign_in(&store, &credentials, Login::default()).await;
    assert!(matches!(blank, Err(DomainError::FieldRequired("email"))));
}

#[tokio::test]
async fn test_article_store_is_shared_with_handlers() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    let slug = publish(&store, jake, "Dragons", &["b", "a", "b"]).await;

    let stored = store.find_article_by_slug(&slug).await.unwrap().unwrap();
    assert_eq!(stored.author_id, jake);
    assert_eq!(stored.tag_list, vec!["b", "a"]);
}

#[tokio::test]
async fn test_update_user() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;
    register(&store, &credentials, "jane").await;

    let taken = users::update_user(
        &store,
        &credentials,
        Some(jake),
        UserChanges {
            username: Some("jane".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(taken, Err(DomainError::AlreadyTaken("username"))));

    let updated = users::update_user(
        &store,
        &credentials,
        Some(jake),
        UserChanges {
            bio: Some("I like dragons".to_string()),
            password: Some("new-password".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("I like dragons"));
    assert_eq!(updated.username, "jake");

    let signed_in = users::sign_in(
        &store,
        &credentials,
        Login {
            email: Some("jake@example.com".to_string()),
            password: Some("new-password".to_string()),
        },
    )
    .await;
    assert!(signed_in.is_ok());

    let cleared = users::update_user(
        &store,
        &credentials,
        Some(jake),
        UserChanges {
            bio: Some(String::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.bio, None);
}

#[tokio::test]
async fn test_password_whitespace_is_preserved() {
    let (store, credentials) = setup();
    let jake = register(&store, &credentials, "jake").await;

    users::update_user(
        &store,
        &credentials,
        Some(jake),
        UserChanges {
            password: Some(" new pass ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let login = |password: &str| Login {
        email: Some("jake@example.com".to_string()),
        password: Some(password.to_string()),
    };

    let user = users::sign_in(&store, &credentials, login(" new pass "))
        .await
        .unwrap();
    assert_eq!(user.username, "jake");

    let trimmed = users::sign_in(&store, &credentials, login("new pass")).await;
    assert!(matches!(trimmed, Err(DomainError::Validation { .. })));
}
