/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use conduit_api::{app::{build_router, AppState}, config::Config};
/// use conduit_shared::{auth::Credentials, store::memory::MemoryStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let credentials = Credentials::new(config.jwt.secret.clone());
/// let state = AppState::new(Arc::new(MemoryStore::new()), credentials, config);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, build_router(state)).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use conduit_shared::{
    auth::{middleware::authenticate, Credentials},
    store::Store,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor; all fields
/// are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Resource store (PostgreSQL in production, in-memory in tests)
    pub store: Arc<dyn Store>,

    /// Password hashing and session tokens
    pub credentials: Arc<Credentials>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, credentials: Credentials, config: Config) -> Self {
        Self {
            store,
            credentials: Arc::new(credentials),
            config: Arc::new(config),
        }
    }

    /// Store as a trait object reference, the form the handlers take
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /api/
///     ├── POST   /users              sign up
///     ├── POST   /users/login        sign in
///     ├── GET    /user               current user
///     ├── PUT    /user               update user
///     ├── GET    /profiles/:username
///     ├── POST   /profiles/:username/follow
///     ├── DELETE /profiles/:username/follow
///     ├── GET    /articles           list
///     ├── POST   /articles           create
///     ├── GET    /articles/feed
///     ├── GET    /articles/:slug
///     ├── PUT    /articles/:slug
///     ├── DELETE /articles/:slug
///     ├── POST   /articles/:slug/favorite
///     ├── DELETE /articles/:slug/favorite
///     ├── GET    /articles/:slug/comments
///     ├── POST   /articles/:slug/comments
///     ├── PUT    /articles/:slug/comments/:id
///     ├── DELETE /articles/:slug/comments/:id
///     └── GET    /tags
/// ```
///
/// Every `/api` request passes through [`auth_layer`]; whether a caller is
/// required is decided per handler.
pub fn build_router(state: AppState) -> Router {
    use crate::routes::{articles, comments, health, profiles, tags, users};

    let api_routes = Router::new()
        .route("/users", post(users::register))
        .route("/users/login", post(users::login))
        .route("/user", get(users::current_user).put(users::update_user))
        .route("/profiles/:username", get(profiles::get_profile))
        .route(
            "/profiles/:username/follow",
            post(profiles::follow).delete(profiles::follow),
        )
        .route(
            "/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route("/articles/feed", get(articles::feed))
        .route(
            "/articles/:slug",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route(
            "/articles/:slug/favorite",
            post(articles::favorite).delete(articles::favorite),
        )
        .route(
            "/articles/:slug/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/articles/:slug/comments/:id",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .route("/tags", get(tags::list_tags))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Optional authentication middleware
///
/// A valid token puts an `AuthContext` into the request extensions; no
/// Authorization header leaves the request anonymous; a malformed or
/// invalid token is rejected with 401 before any handler runs.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(context) = authenticate(req.headers(), &state.credentials)? {
        tracing::debug!(user_id = %context.user_id, "Request authenticated");
        req.extensions_mut().insert(context);
    }

    Ok(next.run(req).await)
}
