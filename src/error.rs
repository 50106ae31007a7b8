//! Error types for the pipeline stages.
//!
//! Each stage returns its own error; [`RunError`] joins them for a whole run.
//! Store, CSV and embedding code report failures through `anyhow` instead.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain page text.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to load job page {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to load job page {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Job page {url} has no visible text")]
    Empty { url: String },
}

/// Failure talking to the chat model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,
}

/// The Extraction Stage could not produce a [`JobInfo`](crate::models::JobInfo).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No page content to extract from")]
    EmptyInput,

    #[error("Extraction error: {0}")]
    Model(#[from] LlmError),

    #[error("Invalid JSON format received: {preview}...")]
    NotJson { preview: String },

    #[error("The AI returned invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),
}

/// The Email Generation Stage failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Email generation failed: {0}")]
    Model(#[from] LlmError),

    #[error("Email generation failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Any failure that terminates a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to save email to {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
