//! Database access layer for blackout-svc
//!
//! Both the structural store and the weather store are maintained by the
//! ingestion pipeline; this service only ever opens them read-only.

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;

/// Connect to a database in read-only mode
///
/// Uses SQLite `mode=ro&immutable=1`, so no write (not even SQLite's own
/// journal bookkeeping) can happen through this pool.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!("Database not found: {}", db_path.display());
    }

    let db_url = format!("sqlite://{}?mode=ro&immutable=1", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(&db_url)
        .await
        .with_context(|| format!("Failed to open {} read-only", db_path.display()))?;

    // Verify read-only by attempting a write (should fail)
    #[cfg(debug_assertions)]
    {
        let write_test = sqlx::query("CREATE TABLE _test_write (id INTEGER)")
            .execute(&pool)
            .await;
        if write_test.is_ok() {
            anyhow::bail!("Database connection to {} is not read-only", db_path.display());
        }
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackout_common::db::init_database;

    #[tokio::test]
    async fn test_readonly_connection_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("dataset.db");
        init_database(&db_path).await.unwrap().close().await;

        let pool = connect_readonly(&db_path)
            .await
            .expect("Should connect in read-only mode");

        let result = sqlx::query("INSERT INTO cities (id, name) VALUES ('c', 'x')")
            .execute(&pool)
            .await;

        assert!(result.is_err(), "Write operation should fail in read-only mode");
    }

    #[tokio::test]
    async fn test_missing_database_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = connect_readonly(&dir.path().join("absent.db"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Database not found"));
    }
}
