//! Entity store for the workplan backend: sqlx models and repositories
//! over PostgreSQL.
//!
//! Every write goes through full-entity validation from `workplan-core`
//! before it commits, and every scoped read filters by the acting
//! organization in SQL. Uniqueness is enforced by unique indexes, never by
//! read-then-write checks.

pub mod error;
pub mod models;
pub mod repositories;

pub use error::{StoreError, StoreResult};

/// Shared connection pool type used across the workspace.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
