//! SQLite pool initialization and migrations

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Busy timeout before a locked write fails. Writers are short (one status
/// update or one batch append), so five seconds is plenty.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the SQLite pool, creating the database file if missing.
pub async fn init_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    if let Some(dir) = database_parent_dir(&config.url) {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create database directory '{}'", dir))?;
    }

    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database URL '{}'", config.url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .context("Failed to open database")?;

    Ok(pool)
}

/// Apply embedded migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;

    info!("Database migrations completed");
    Ok(())
}

fn database_parent_dir(url: &str) -> Option<String> {
    let path = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    if path.starts_with(':') {
        // e.g. sqlite::memory:
        return None;
    }
    let parent = std::path::Path::new(path).parent()?;
    if parent.as_os_str().is_empty() {
        return None;
    }
    Some(parent.to_string_lossy().to_string())
}
