//! Email Generation Stage: job details and portfolio links → cold email.

use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::config::EmailConfig;
use crate::error::GenerationError;
use crate::llm::ChatModel;
use crate::models::{EmailDraft, JobInfo, PortfolioMatch};
use crate::prompts::{fill_template, COLD_EMAIL_TEMPLATE};

/// Portfolio link as shown to the model.
#[derive(Serialize)]
struct LinkView<'a> {
    techstack: &'a str,
    link: &'a str,
}

/// Render the email prompt for `job` and `links`.
pub fn build_email_prompt(
    persona: &EmailConfig,
    job: &JobInfo,
    links: &[PortfolioMatch],
) -> Result<String, serde_json::Error> {
    let link_views: Vec<LinkView> = links
        .iter()
        .map(|m| LinkView {
            techstack: &m.techstack,
            link: &m.link,
        })
        .collect();

    let values = HashMap::from([
        ("job_info", serde_json::to_string_pretty(job)?),
        ("links", serde_json::to_string_pretty(&link_views)?),
        ("skills", job.skills.join(", ")),
        ("sender_name", persona.sender_name.clone()),
        ("sender_title", persona.sender_title.clone()),
        ("company", persona.company.clone()),
    ]);

    Ok(fill_template(COLD_EMAIL_TEMPLATE, &values))
}

/// One model call; the reply is returned verbatim.
pub async fn generate_email(
    model: &dyn ChatModel,
    persona: &EmailConfig,
    job: &JobInfo,
    links: &[PortfolioMatch],
) -> Result<EmailDraft, GenerationError> {
    let prompt = build_email_prompt(persona, job, links)?;
    let text = model.complete(&prompt).await?;

    info!(
        "Generated email for {:?} with {} portfolio links",
        job.role,
        links.len()
    );
    Ok(EmailDraft(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use async_trait::async_trait;

    /// Replies with the prompt it received.
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            Ok(prompt.to_string())
        }
    }

    struct DownModel;

    #[async_trait]
    impl ChatModel for DownModel {
        fn model_name(&self) -> &str {
            "down"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        }
    }

    fn cad_match() -> PortfolioMatch {
        PortfolioMatch {
            id: "a".to_string(),
            techstack: "CAD, 3D Modeling".to_string(),
            link: "https://example.com/cad-portfolio".to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_prompt_contains_job_links_and_persona() {
        let prompt =
            build_email_prompt(&EmailConfig::default(), &JobInfo::sample(), &[cad_match()])
                .unwrap();
        assert!(prompt.contains("\"role\": \"3D Footwear Designer II\""));
        assert!(prompt.contains("https://example.com/cad-portfolio"));
        assert!(prompt.contains("match skills: CAD, 3D Modeling, Prototyping"));
        assert!(prompt.contains("as Mohan (BDE at AtliQ)"));
    }

    #[test]
    fn test_prompt_with_no_links() {
        let prompt =
            build_email_prompt(&EmailConfig::default(), &JobInfo::sample(), &[]).unwrap();
        assert!(prompt.contains("### RELEVANT PORTFOLIO:\n[]"));
    }

    #[test]
    fn test_custom_persona() {
        let persona = EmailConfig {
            sender_name: "Priya".to_string(),
            sender_title: "Account Lead".to_string(),
            company: "Acme".to_string(),
        };
        let prompt = build_email_prompt(&persona, &JobInfo::default(), &[]).unwrap();
        assert!(prompt.contains("as Priya (Account Lead at Acme)"));
    }

    #[tokio::test]
    async fn test_sample_job_without_links_produces_text() {
        let draft = generate_email(&EchoModel, &EmailConfig::default(), &JobInfo::sample(), &[])
            .await
            .unwrap();
        assert!(!draft.as_str().is_empty());
        assert!(draft.as_str().contains("3D Footwear Designer II"));
    }

    #[tokio::test]
    async fn test_model_failure_message() {
        let err = generate_email(&DownModel, &EmailConfig::default(), &JobInfo::sample(), &[])
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Email generation failed:"));
        assert!(err.to_string().contains("service unavailable"));
    }
}
