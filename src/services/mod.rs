//! Service layer: capacity accounting and the image pipeline.

pub mod image_service;
pub mod ledger;

#[cfg(test)]
pub(crate) mod testutil {
    use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
    use std::sync::Arc;

    /// Fresh in-memory database initialized from the real migration file.
    ///
    /// A single connection keeps every query on the same in-memory instance.
    pub(crate) async fn test_pool() -> Arc<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite");

        let sql = include_str!("../../migrations/0001_init.sql");
        for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(stmt).execute(&pool).await.expect("apply migration");
        }

        Arc::new(pool)
    }
}
