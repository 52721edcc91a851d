//! nycdomains Database Layer
//!
//! Provides `SQLite` access for the enriched-domain store. Uses `SQLx`
//! with embedded migrations and a small per-table operations module.
//!
//! # Architecture
//!
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **Connection pooling**: Configurable pool with automatic cleanup
//! - **Conflict resolution**: All writes upsert on the `domain` primary key
//!
//! # Example
//!
//! ```ignore
//! use nycdomains_db::Database;
//!
//! let db = Database::new("nycdomains.db").await?;
//! db.run_migrations().await?;
//! let input = nycdomains_db::enriched_domains::fetch_stalest(db.pool(), 100).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod enriched_domains;
pub mod error;
pub mod migrations;

// Re-export commonly used types
pub use error::{DatabaseError, Result};

use std::path::Path;

/// High-level database interface with pooling and migrations.
#[derive(Debug)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open (or create) the database at the specified path.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::connect(path).await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    ///
    /// This should be called after creating a new database instance to
    /// ensure the schema is up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// Returns the number of applied migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    ///
    /// This allows direct access to the `SQLx` pool for custom queries.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation() {
        let db = Database::new(":memory:").await.expect("create database");

        sqlx::query("SELECT 1")
            .execute(db.pool())
            .await
            .expect("simple query");
    }

    #[tokio::test]
    async fn test_database_schema() {
        let db = Database::new(":memory:").await.expect("create database");
        db.run_migrations().await.expect("run migrations");

        let columns: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM pragma_table_info('enriched_domains') ORDER BY cid",
        )
        .fetch_all(db.pool())
        .await
        .expect("query columns");

        assert_eq!(
            columns,
            vec![
                "domain",
                "registration_date",
                "category",
                "status_code",
                "final_address",
                "title",
                "description",
                "image_url",
                "is_address_found",
                "is_title_found",
                "is_image_found",
                "website_status",
                "last_updated_at"
            ]
        );
    }

    #[tokio::test]
    async fn test_database_close() {
        let db = Database::new(":memory:").await.expect("create database");
        db.close().await; // Should not panic
    }
}
