//! Job page fetching and HTML-to-text reduction.
//!
//! The page is requested with a browser-like `User-Agent` and
//! `Accept-Language`, then reduced to its visible text: every text node
//! outside `<script>` and `<style>` is trimmed, empty nodes are dropped, and
//! the rest are joined with newlines.

use reqwest::header::ACCEPT_LANGUAGE;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::error::FetchError;

/// Elements whose text never reaches the output.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style"];

/// GET `url` and return its visible text.
///
/// Fails on transport errors, timeouts, non-2xx statuses, and pages with
/// no visible text.
pub async fn fetch_page_text(config: &FetchConfig, url: &str) -> Result<String, FetchError> {
    let request_error = |source: reqwest::Error| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(request_error)?;

    info!("Fetching job page: {}", url);

    let response = client
        .get(url)
        .header(ACCEPT_LANGUAGE, config.accept_language.as_str())
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let html = response.text().await.map_err(request_error)?;
    let text = html_to_text(&html);
    debug!(
        "Reduced {} bytes of HTML to {} bytes of text",
        html.len(),
        text.len()
    );

    if text.is_empty() {
        return Err(FetchError::Empty {
            url: url.to_string(),
        });
    }

    Ok(text)
}

/// Reduce an HTML document to its visible text, one text node per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join("\n")
}
