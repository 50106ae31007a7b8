//! Portfolio Index: a persistent embedding collection of portfolio entries.
//!
//! Entries come from a two-column CSV (technology stack, link). Each
//! techstack is embedded once and stored with a UUID in the SQLite store.
//! Loading is idempotent: a collection that already holds entries is not
//! reloaded unless a rebuild is requested.
//!
//! Queries embed every query text and score each entry by its best cosine
//! similarity across them; results are ordered by score descending, then id.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, EmbeddingConfig, PortfolioConfig, StoreConfig};
use crate::db;
use crate::embedding;
use crate::migrate;
use crate::models::{PortfolioEntry, PortfolioMatch};

/// Outcome of a load or rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries written by this call.
    pub inserted: usize,
    /// The collection was already populated, so nothing was read.
    pub skipped_existing: bool,
    /// CSV rows dropped because their techstack was empty.
    pub skipped_rows: usize,
    /// Entries in the collection after the call.
    pub total: i64,
}

/// Summary printed by `outreach portfolio status`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub db_path: PathBuf,
    pub collection: String,
    pub model: String,
    pub dims: usize,
    pub entries: i64,
}

pub struct PortfolioIndex {
    pool: SqlitePool,
    db_path: PathBuf,
    collection: String,
    embedding: EmbeddingConfig,
    model_name: String,
    dims: usize,
}

impl PortfolioIndex {
    /// Open (creating if needed) the store and the configured collection.
    pub async fn open(store: &StoreConfig, embedding_config: &EmbeddingConfig) -> Result<Self> {
        if embedding_config.batch_size == 0 {
            bail!("embedding.batch_size must be > 0");
        }
        let provider = embedding::create_provider(embedding_config)?;
        let pool = db::connect(store).await?;
        migrate::apply_schema(&pool).await?;

        sqlx::query(
            "INSERT OR IGNORE INTO collections (name, model, dims, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&store.collection)
        .bind(provider.model_name())
        .bind(provider.dims() as i64)
        .bind(Utc::now().timestamp())
        .execute(&pool)
        .await?;

        debug!(
            "Opened collection '{}' in {}",
            store.collection,
            store.db_path().display()
        );

        Ok(Self {
            pool,
            db_path: store.db_path(),
            collection: store.collection.clone(),
            embedding: embedding_config.clone(),
            model_name: provider.model_name().to_string(),
            dims: provider.dims(),
        })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Number of entries in the collection.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM portfolio_entries WHERE collection = ?")
                .bind(&self.collection)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Populate the collection from `csv_path` unless it already holds data.
    pub async fn load_csv(&self, csv_path: &Path, columns: &PortfolioConfig) -> Result<LoadReport> {
        let existing = self.count().await?;
        if existing > 0 {
            info!(
                "Collection '{}' already holds {} entries; skipping load",
                self.collection, existing
            );
            return Ok(LoadReport {
                inserted: 0,
                skipped_existing: true,
                skipped_rows: 0,
                total: existing,
            });
        }

        let (entries, skipped_rows) = read_portfolio_csv(csv_path, columns)?;
        let inserted = self.write_entries(&entries, false).await?;

        Ok(LoadReport {
            inserted,
            skipped_existing: false,
            skipped_rows,
            total: self.count().await?,
        })
    }

    /// Replace the collection's entries with the contents of `csv_path`.
    ///
    /// The CSV is read and embedded before anything is deleted, so a bad file
    /// leaves the existing collection untouched.
    pub async fn rebuild(&self, csv_path: &Path, columns: &PortfolioConfig) -> Result<LoadReport> {
        let (entries, skipped_rows) = read_portfolio_csv(csv_path, columns)?;
        let inserted = self.write_entries(&entries, true).await?;

        Ok(LoadReport {
            inserted,
            skipped_existing: false,
            skipped_rows,
            total: self.count().await?,
        })
    }

    async fn write_entries(&self, entries: &[PortfolioEntry], replace: bool) -> Result<usize> {
        let mut vectors = Vec::with_capacity(entries.len());
        for batch in entries.chunks(self.embedding.batch_size) {
            let texts: Vec<String> = batch.iter().map(|e| e.techstack.clone()).collect();
            vectors.extend(embedding::embed_texts(&self.embedding, &texts).await?);
        }

        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        if replace {
            sqlx::query("DELETE FROM portfolio_entries WHERE collection = ?")
                .bind(&self.collection)
                .execute(&mut *tx)
                .await?;
        }

        // The collection records the model its vectors were built with
        sqlx::query("UPDATE collections SET model = ?, dims = ? WHERE name = ?")
            .bind(&self.model_name)
            .bind(self.dims as i64)
            .bind(&self.collection)
            .execute(&mut *tx)
            .await?;

        for (entry, vector) in entries.iter().zip(vectors.iter()) {
            sqlx::query(
                r#"
                INSERT INTO portfolio_entries (id, collection, techstack, link, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&self.collection)
            .bind(&entry.techstack)
            .bind(&entry.link)
            .bind(embedding::vec_to_blob(vector))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Wrote {} portfolio entries to collection '{}'",
            entries.len(),
            self.collection
        );
        Ok(entries.len())
    }

    /// Return up to `k` entries nearest to any of `texts`.
    pub async fn query(&self, texts: &[String], k: usize) -> Result<Vec<PortfolioMatch>> {
        let texts: Vec<String> = texts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if texts.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        self.ensure_model_matches().await?;

        let query_vecs = embedding::embed_texts(&self.embedding, &texts).await?;

        let rows = sqlx::query(
            "SELECT id, techstack, link, embedding FROM portfolio_entries WHERE collection = ?",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut matches: Vec<PortfolioMatch> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let vec = embedding::blob_to_vec(&blob);
                let score = query_vecs
                    .iter()
                    .map(|q| embedding::cosine_similarity(q, &vec) as f64)
                    .fold(f64::NEG_INFINITY, f64::max);
                PortfolioMatch {
                    id: row.get("id"),
                    techstack: row.get("techstack"),
                    link: row.get("link"),
                    score,
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        matches.truncate(k);

        debug!(
            "Query with {} texts matched {} entries",
            texts.len(),
            matches.len()
        );
        Ok(matches)
    }

    /// Collection metadata and entry count.
    pub async fn status(&self) -> Result<IndexStatus> {
        let row = sqlx::query("SELECT model, dims FROM collections WHERE name = ?")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        let dims: i64 = row.get("dims");

        Ok(IndexStatus {
            db_path: self.db_path.clone(),
            collection: self.collection.clone(),
            model: row.get("model"),
            dims: dims as usize,
            entries: self.count().await?,
        })
    }

    async fn ensure_model_matches(&self) -> Result<()> {
        let status = self.status().await?;
        if status.entries > 0 && (status.model != self.model_name || status.dims != self.dims) {
            bail!(
                "Collection '{}' was built with model {} ({} dims) but the configured provider \
                 uses {} ({} dims). Run `outreach portfolio load --rebuild`.",
                self.collection,
                status.model,
                status.dims,
                self.model_name,
                self.dims
            );
        }
        Ok(())
    }
}

/// Read (techstack, link) rows from a CSV with a header line.
///
/// Returns the entries and the number of rows skipped for an empty techstack.
pub fn read_portfolio_csv(
    path: &Path,
    columns: &PortfolioConfig,
) -> Result<(Vec<PortfolioEntry>, usize)> {
    if !path.exists() {
        bail!("Portfolio CSV not found at: {}", path.display());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open portfolio CSV: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let column = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            anyhow::anyhow!(
                "Portfolio CSV {} has no '{}' column (found: {})",
                path.display(),
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            )
        })
    };
    let techstack_idx = column(&columns.techstack_column)?;
    let link_idx = column(&columns.link_column)?;

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV row {}", i + 2))?;
        let techstack = record.get(techstack_idx).unwrap_or_default();
        let link = record.get(link_idx).unwrap_or_default();

        if techstack.is_empty() {
            warn!("Skipping portfolio row {}: empty techstack", i + 2);
            skipped += 1;
            continue;
        }

        entries.push(PortfolioEntry {
            techstack: techstack.to_string(),
            link: link.to_string(),
        });
    }

    Ok((entries, skipped))
}

/// Open the index, populate it on first use, and query it with `skills`.
pub async fn retrieve_for_skills(config: &Config, skills: &[String]) -> Result<Vec<PortfolioMatch>> {
    let index = PortfolioIndex::open(&config.store, &config.embedding).await?;

    let result: Result<Vec<PortfolioMatch>> = async {
        index
            .load_csv(&config.portfolio.csv, &config.portfolio)
            .await?;
        index.query(skills, config.retrieval.n_results).await
    }
    .await;

    index.close().await;
    result
}

// ============ CLI commands ============

pub async fn run_load(config: &Config, csv_override: Option<PathBuf>, rebuild: bool) -> Result<()> {
    let csv_path = csv_override.unwrap_or_else(|| config.portfolio.csv.clone());
    let index = PortfolioIndex::open(&config.store, &config.embedding).await?;

    let result = if rebuild {
        index.rebuild(&csv_path, &config.portfolio).await
    } else {
        index.load_csv(&csv_path, &config.portfolio).await
    };
    index.close().await;
    let report = result?;

    println!("portfolio load");
    if report.skipped_existing {
        println!("  collection already populated, skipped");
    } else {
        println!("  source: {}", csv_path.display());
        println!("  inserted: {}", report.inserted);
        println!("  skipped rows: {}", report.skipped_rows);
    }
    println!("  total entries: {}", report.total);
    println!("ok");
    Ok(())
}

pub async fn run_query(config: &Config, skills: &[String], limit: Option<usize>) -> Result<()> {
    let k = limit.unwrap_or(config.retrieval.n_results);
    let index = PortfolioIndex::open(&config.store, &config.embedding).await?;
    let result = index.query(skills, k).await;
    index.close().await;
    let matches = result?;

    if matches.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, m) in matches.iter().enumerate() {
        println!("{}. [{:.2}] {}", i + 1, m.score, m.techstack);
        println!("    link: {}", m.link);
        println!("    id: {}", m.id);
    }
    Ok(())
}

pub async fn run_status(config: &Config) -> Result<()> {
    let index = PortfolioIndex::open(&config.store, &config.embedding).await?;
    let result = index.status().await;
    index.close().await;
    let status = result?;

    println!("Portfolio Index");
    println!("===============");
    println!("  Store:       {}", status.db_path.display());
    println!("  Collection:  {}", status.collection);
    println!("  Model:       {} ({} dims)", status.model, status.dims);
    println!("  Entries:     {}", status.entries);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PORTFOLIO_CSV: &str = "\
Techstack,Links
\"React, Node.js, MongoDB\",https://example.com/react-portfolio
\"CAD, 3D Modeling, Rendering\",https://example.com/cad-portfolio
\"Blender, 3D Modeling, Prototyping\",https://example.com/blender-portfolio
\"Kotlin, Android, Firebase\",https://example.com/android-portfolio
,https://example.com/missing-stack
";

    fn setup() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        let csv_path = tmp.path().join("my_portfolio.csv");
        fs::write(&csv_path, PORTFOLIO_CSV).unwrap();

        let mut config = Config::minimal();
        config.store.dir = tmp.path().join("vectorstore");
        config.portfolio.csv = csv_path;
        config.embedding = EmbeddingConfig {
            provider: "hashing".to_string(),
            dims: Some(256),
            ..EmbeddingConfig::default()
        };
        (tmp, config)
    }

    async fn open(config: &Config) -> PortfolioIndex {
        PortfolioIndex::open(&config.store, &config.embedding)
            .await
            .unwrap()
    }

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_read_csv_skips_empty_techstack() {
        let (_tmp, config) = setup();
        let (entries, skipped) = read_portfolio_csv(&config.portfolio.csv, &config.portfolio).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(skipped, 1);
        assert_eq!(entries[1].techstack, "CAD, 3D Modeling, Rendering");
        assert_eq!(entries[1].link, "https://example.com/cad-portfolio");
    }

    #[test]
    fn test_read_csv_missing_file() {
        let (_tmp, config) = setup();
        let err = read_portfolio_csv(Path::new("/nonexistent/p.csv"), &config.portfolio).unwrap_err();
        assert!(err.to_string().contains("Portfolio CSV not found"));
    }

    #[test]
    fn test_read_csv_missing_column() {
        let (tmp, config) = setup();
        let path = tmp.path().join("bad.csv");
        fs::write(&path, "Stack,Url\nRust,https://x\n").unwrap();
        let err = read_portfolio_csv(&path, &config.portfolio).unwrap_err();
        assert!(err.to_string().contains("no 'Techstack' column"));
    }

    #[tokio::test]
    async fn test_load_twice_does_not_duplicate() {
        let (_tmp, config) = setup();

        let index = open(&config).await;
        let first = index.load_csv(&config.portfolio.csv, &config.portfolio).await.unwrap();
        assert_eq!(first.inserted, 4);
        assert!(!first.skipped_existing);
        index.close().await;

        // A fresh process opening the same store
        let index = open(&config).await;
        let second = index.load_csv(&config.portfolio.csv, &config.portfolio).await.unwrap();
        assert!(second.skipped_existing);
        assert_eq!(second.inserted, 0);
        assert_eq!(index.count().await.unwrap(), 4);
        index.close().await;
    }

    #[tokio::test]
    async fn test_rebuild_replaces_entries() {
        let (tmp, config) = setup();
        let index = open(&config).await;
        index.load_csv(&config.portfolio.csv, &config.portfolio).await.unwrap();

        let smaller = tmp.path().join("smaller.csv");
        fs::write(&smaller, "Techstack,Links\nRust,https://example.com/rust\n").unwrap();
        let report = index.rebuild(&smaller, &config.portfolio).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.total, 1);
        index.close().await;
    }

    #[tokio::test]
    async fn test_rebuild_with_missing_csv_keeps_entries() {
        let (_tmp, config) = setup();
        let index = open(&config).await;
        index.load_csv(&config.portfolio.csv, &config.portfolio).await.unwrap();

        assert!(index.rebuild(Path::new("/nonexistent.csv"), &config.portfolio).await.is_err());
        assert_eq!(index.count().await.unwrap(), 4);
        index.close().await;
    }

    #[tokio::test]
    async fn test_query_returns_at_most_two() {
        let (_tmp, config) = setup();
        let index = open(&config).await;
        index.load_csv(&config.portfolio.csv, &config.portfolio).await.unwrap();

        let matches = index.query(&skills(&["CAD", "3D Modeling"]), 2).await.unwrap();
        assert!(matches.len() <= 2);
        assert!(!matches.is_empty());
        assert!(matches.iter().any(|m| m.link == "https://example.com/cad-portfolio"));
        assert!(matches.iter().all(|m| m.link != "https://example.com/android-portfolio"));
        assert!(matches[0].score >= matches[matches.len() - 1].score);
        index.close().await;
    }

    #[tokio::test]
    async fn test_query_empty_skills_or_zero_k() {
        let (_tmp, config) = setup();
        let index = open(&config).await;
        index.load_csv(&config.portfolio.csv, &config.portfolio).await.unwrap();

        assert!(index.query(&[], 2).await.unwrap().is_empty());
        assert!(index.query(&skills(&["  "]), 2).await.unwrap().is_empty());
        assert!(index.query(&skills(&["CAD"]), 0).await.unwrap().is_empty());
        index.close().await;
    }

    #[tokio::test]
    async fn test_open_rejects_zero_batch_size() {
        let (_tmp, mut config) = setup();
        config.embedding.batch_size = 0;
        let err = PortfolioIndex::open(&config.store, &config.embedding)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("batch_size"));
        // Rejected before the store is touched
        assert!(!config.store.dir.exists());
    }

    #[tokio::test]
    async fn test_query_on_empty_collection() {
        let (_tmp, config) = setup();
        let index = open(&config).await;
        assert!(index.query(&skills(&["CAD"]), 2).await.unwrap().is_empty());
        index.close().await;
    }

    #[tokio::test]
    async fn test_query_with_other_model_requires_rebuild() {
        let (_tmp, mut config) = setup();
        let index = open(&config).await;
        index.load_csv(&config.portfolio.csv, &config.portfolio).await.unwrap();
        index.close().await;

        config.embedding.dims = Some(64);
        let index = open(&config).await;
        let err = index.query(&skills(&["CAD"]), 2).await.unwrap_err();
        assert!(err.to_string().contains("--rebuild"));

        index.rebuild(&config.portfolio.csv, &config.portfolio).await.unwrap();
        assert!(!index.query(&skills(&["CAD"]), 2).await.unwrap().is_empty());
        index.close().await;
    }

    #[tokio::test]
    async fn test_retrieve_for_skills_populates_on_first_use() {
        let (_tmp, config) = setup();
        let matches = retrieve_for_skills(&config, &skills(&["Prototyping"])).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].link, "https://example.com/blender-portfolio");

        let index = open(&config).await;
        assert_eq!(index.count().await.unwrap(), 4);
        index.close().await;
    }
}
