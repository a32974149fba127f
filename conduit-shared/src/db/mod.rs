/// Database layer for Conduit
///
/// Connection pooling and schema migrations. Queries live next to the
/// models in [`crate::models`] and are reached through
/// [`crate::store::postgres::PgStore`].
///
/// # Example
///
/// ```no_run
/// use conduit_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
