//! Database connection management.
//!
//! Builds the `SQLx` connection pool the rest of the store layer runs on.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Open (or create) the `SQLite` database at `path` and return a pool.
///
/// # Arguments
/// * `path` - Path to the `SQLite` database file (or `:memory:` for in-memory)
///
/// # Errors
/// Returns `DatabaseError::Open` if the database file cannot be opened.
pub async fn connect(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path_str = path
        .as_ref()
        .to_str()
        .ok_or_else(|| DatabaseError::Open("invalid database path: not valid UTF-8".to_string()))?;

    let connect_options = SqliteConnectOptions::from_str(path_str)
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

    tracing::info!("Database pool created at {}", path_str);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory() {
        let pool = connect(":memory:").await.expect("create pool");

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .expect("simple query");
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let db_path = tmp.path().join("test.db");

        let pool = connect(&db_path).await.expect("create pool");
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .expect("simple query");

        assert!(db_path.exists());
    }
}
