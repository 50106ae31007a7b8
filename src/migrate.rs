use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::StoreConfig;
use crate::db;

/// Create the store schema on an open pool. Idempotent.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio_entries (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            techstack TEXT NOT NULL,
            link TEXT NOT NULL,
            embedding BLOB NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (collection) REFERENCES collections(name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_portfolio_entries_collection ON portfolio_entries(collection)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn run_migrations(store: &StoreConfig) -> Result<()> {
    let pool = db::connect(store).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}
