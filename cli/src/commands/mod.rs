//! Command implementations.

pub mod enrich;
pub mod ingest;
pub mod probe;

use anyhow::Context;
use nycdomains_core::AppConfig;
use nycdomains_db::Database;

/// Open the store at its configured path, creating directories and
/// running migrations as needed.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Database> {
    let path = config.database_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let db = Database::new(&path).await?;
    db.run_migrations().await?;
    Ok(db)
}
