//! Extraction Stage: job page text → [`JobInfo`].
//!
//! One model call with [`EXTRACT_JOB_TEMPLATE`]. The reply may be wrapped in
//! markdown code fences; after unwrapping it must be a JSON object of the
//! `JobInfo` shape. Malformed replies fail immediately without a second call.

use std::collections::HashMap;
use tracing::{info, warn};

use crate::error::ParseError;
use crate::llm::ChatModel;
use crate::models::JobInfo;
use crate::prompts::{fill_template, EXTRACT_JOB_TEMPLATE};

/// Number of reply characters quoted in a [`ParseError::NotJson`].
const PREVIEW_CHARS: usize = 100;

/// Ask the model for the job's role, experience, skills and description.
pub async fn extract_job_info(
    model: &dyn ChatModel,
    page_text: &str,
) -> Result<JobInfo, ParseError> {
    if page_text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let prompt = fill_template(
        EXTRACT_JOB_TEMPLATE,
        &HashMap::from([("page_data", page_text.to_string())]),
    );

    let reply = model.complete(&prompt).await?;
    let job = parse_job_reply(&reply).inspect_err(|e| warn!("{}", e))?;

    info!(
        "Extracted role {:?} with {} skills",
        job.role,
        job.skills.len()
    );
    Ok(job)
}

/// Parse a raw model reply into a [`JobInfo`].
pub fn parse_job_reply(reply: &str) -> Result<JobInfo, ParseError> {
    let json_text = strip_code_fences(reply);

    if json_text.is_empty() || !json_text.starts_with('{') {
        return Err(ParseError::NotJson {
            preview: json_text.chars().take(PREVIEW_CHARS).collect(),
        });
    }

    Ok(serde_json::from_str(json_text)?)
}

/// Return the content of the first fenced block, or the trimmed reply when
/// there is none.
///
/// A `json`-tagged fence takes precedence over an untagged one.
pub fn strip_code_fences(reply: &str) -> &str {
    let text = reply.trim();

    let fenced = if let Some((_, after)) = text.split_once("```json") {
        Some(after)
    } else {
        text.split_once("```").map(|(_, after)| after)
    };

    match fenced {
        Some(after) => after
            .split_once("```")
            .map_or(after, |(inner, _)| inner)
            .trim(),
        None => text,
    }
}
