//! One outreach run: fetch → extract → retrieve → generate → save.
//!
//! Every stage is awaited in turn. A fetch, extraction or generation failure
//! ends the run with a [`RunError`] and nothing is written. Portfolio
//! retrieval is best-effort: if the index cannot be opened, loaded or
//! queried, the run continues with no links.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::email::generate_email;
use crate::error::RunError;
use crate::extract::extract_job_info;
use crate::fetch::fetch_page_text;
use crate::index;
use crate::llm::{ChatModel, OpenAiCompatibleClient};
use crate::models::{EmailDraft, JobInfo, PortfolioMatch};
use crate::output;

/// Where the job details come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    /// Fetch and extract from a job posting page.
    Url(String),
    /// Use [`JobInfo::sample`], skipping fetch and extraction.
    TestData,
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub job: JobInfo,
    pub links: Vec<PortfolioMatch>,
    pub draft: EmailDraft,
    pub saved_to: Option<PathBuf>,
}

/// Fetch the page at `url` and extract its job details.
pub async fn job_from_url(
    config: &Config,
    model: &dyn ChatModel,
    url: &str,
) -> Result<JobInfo, RunError> {
    let page_text = fetch_page_text(&config.fetch, url).await?;
    Ok(extract_job_info(model, &page_text).await?)
}

/// Portfolio entries for `job`; empty when it lists no skills or the index
/// is unavailable.
pub async fn retrieve_links(config: &Config, job: &JobInfo) -> Vec<PortfolioMatch> {
    if job.skills.is_empty() {
        info!("Job lists no skills; skipping portfolio retrieval");
        return Vec::new();
    }

    match index::retrieve_for_skills(config, &job.skills).await {
        Ok(links) => links,
        Err(e) => {
            warn!("Portfolio lookup failed, continuing without links: {:#}", e);
            Vec::new()
        }
    }
}

/// Run the whole pipeline. The draft is saved into `save_dir` when given.
pub async fn run(
    config: &Config,
    model: &dyn ChatModel,
    source: &JobSource,
    save_dir: Option<&Path>,
) -> Result<RunOutcome, RunError> {
    let job = match source {
        JobSource::Url(url) => job_from_url(config, model, url).await?,
        JobSource::TestData => {
            info!("Using built-in test job");
            JobInfo::sample()
        }
    };

    let links = retrieve_links(config, &job).await;
    let draft = generate_email(model, &config.email, &job, &links).await?;

    let saved_to = match save_dir {
        Some(dir) => Some(output::write_email(
            dir,
            &config.output.file_prefix,
            &job.role,
            &draft,
        )?),
        None => None,
    };

    Ok(RunOutcome {
        job,
        links,
        draft,
        saved_to,
    })
}

/// Pick the URL argument, falling back to `fetch.default_url`.
pub fn resolve_url(config: &Config, url: Option<String>) -> Result<String> {
    match url.or_else(|| config.fetch.default_url.clone()) {
        Some(url) if !url.trim().is_empty() => Ok(url),
        _ => bail!("No job URL given and fetch.default_url is not configured"),
    }
}

// ============ CLI commands ============

pub async fn run_fetch(config: &Config, url: Option<String>) -> Result<()> {
    let url = resolve_url(config, url)?;
    let text = fetch_page_text(&config.fetch, &url).await?;
    println!("{}", text);
    Ok(())
}

pub async fn run_extract(config: &Config, url: Option<String>) -> Result<()> {
    let url = resolve_url(config, url)?;
    let model = OpenAiCompatibleClient::from_config(&config.llm)?;
    let job = job_from_url(config, &model, &url).await?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

pub async fn run_generate(
    config: &Config,
    url: Option<String>,
    test_data: bool,
    out_dir: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let source = if test_data {
        JobSource::TestData
    } else {
        JobSource::Url(resolve_url(config, url)?)
    };
    let model = OpenAiCompatibleClient::from_config(&config.llm)?;

    let save_dir = if no_save {
        None
    } else {
        Some(out_dir.unwrap_or_else(|| config.output.dir.clone()))
    };

    let outcome = run(config, &model, &source, save_dir.as_deref()).await?;

    println!("{}", outcome.draft);
    if let Some(path) = &outcome.saved_to {
        eprintln!("Saved email to {}", path.display());
    }
    Ok(())
}
