//! # Conduit API Server
//!
//! RealWorld-compatible blogging API: users, profiles, articles, comments,
//! favorites, follows and tags over JSON.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/conduit \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p conduit-api
//! ```

use std::sync::Arc;

use conduit_api::{
    app::{build_router, AppState},
    config::Config,
};
use conduit_shared::{
    auth::Credentials,
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::postgres::PgStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "conduit_api=debug,conduit_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Conduit API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    if !config.api.production {
        ensure_database_exists(&config.database.url).await?;
    }
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let credentials = Credentials::new(config.jwt.secret.clone())
        .with_token_ttl(chrono::Duration::hours(config.jwt.ttl_hours));

    let bind_address = config.bind_address();
    let store = PgStore::new(pool.clone());
    let app = build_router(AppState::new(Arc::new(store), credentials, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
