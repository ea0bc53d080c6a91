/// Database access layer
///
/// Repositories are free functions over a `PgPool` or an open transaction,
/// returning `sqlx::Error` for the service layer to map.
pub mod comment_repo;
pub mod post_repo;
pub mod tag_repo;

use crate::config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Create the shared connection pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}
