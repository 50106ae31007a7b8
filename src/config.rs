//! TOML configuration parsing.
//!
//! Every section is optional; a missing section (or a missing file, via
//! [`Config::minimal`]) falls back to the defaults below. The model API
//! credential is never read from this file: [`LlmConfig::api_key_env`] names
//! the environment variable that holds it.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// All-defaults configuration, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Persistent embedding store location.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            collection: default_collection(),
        }
    }
}

impl StoreConfig {
    /// Path of the SQLite database inside the store directory.
    pub fn db_path(&self) -> PathBuf {
        self.dir.join("index.sqlite")
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("vectorstore")
}
fn default_collection() -> String {
    "portfolio".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortfolioConfig {
    #[serde(default = "default_portfolio_csv")]
    pub csv: PathBuf,
    #[serde(default = "default_techstack_column")]
    pub techstack_column: String,
    #[serde(default = "default_link_column")]
    pub link_column: String,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            csv: default_portfolio_csv(),
            techstack_column: default_techstack_column(),
            link_column: default_link_column(),
        }
    }
}

fn default_portfolio_csv() -> PathBuf {
    PathBuf::from("my_portfolio.csv")
}
fn default_techstack_column() -> String {
    "Techstack".to_string()
}
fn default_link_column() -> String {
    "Links".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// URL used by `fetch`, `extract` and `generate` when none is given.
    #[serde(default)]
    pub default_url: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            default_url: None,
        }
    }
}

fn default_fetch_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

/// Remote chat model settings (OpenAI-compatible chat completions API).
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: 0.0,
            timeout_secs: default_llm_timeout(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_llm_model() -> String {
    "llama3-70b-8192".to_string()
}
fn default_llm_timeout() -> u64 {
    60
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_embedding_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_n_results")]
    pub n_results: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            n_results: default_n_results(),
        }
    }
}

fn default_n_results() -> usize {
    2
}

/// Persona the email is written as.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_sender_title")]
    pub sender_title: String,
    #[serde(default = "default_company")]
    pub company: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender_name: default_sender_name(),
            sender_title: default_sender_title(),
            company: default_company(),
        }
    }
}

fn default_sender_name() -> String {
    "Mohan".to_string()
}
fn default_sender_title() -> String {
    "BDE".to_string()
}
fn default_company() -> String {
    "AtliQ".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_file_prefix() -> String {
    "email".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }

    if config.llm.timeout_secs == 0 {
        anyhow::bail!("llm.timeout_secs must be > 0");
    }

    if config.llm.model.trim().is_empty() {
        anyhow::bail!("llm.model must not be empty");
    }

    if config.llm.base_url.trim().is_empty() {
        anyhow::bail!("llm.base_url must not be empty");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    if config.retrieval.n_results < 1 {
        anyhow::bail!("retrieval.n_results must be >= 1");
    }

    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }

    if config.store.collection.trim().is_empty() {
        anyhow::bail!("store.collection must not be empty");
    }

    match config.embedding.provider.as_str() {
        "local" | "openai" | "ollama" => {}
        "hashing" => {
            if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
                anyhow::bail!("embedding.dims must be > 0 when provider is 'hashing'");
            }
        }
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be local, openai, ollama, or hashing.",
            other
        ),
    }

    if matches!(config.embedding.provider.as_str(), "openai" | "ollama") {
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    Ok(())
}
