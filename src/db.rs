use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::StoreConfig;

pub async fn connect(store: &StoreConfig) -> Result<SqlitePool> {
    // The store directory is created on first use
    std::fs::create_dir_all(&store.dir).with_context(|| {
        format!("Failed to create store directory: {}", store.dir.display())
    })?;

    let db_path = store.db_path();
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open store: {}", db_path.display()))?;

    Ok(pool)
}
