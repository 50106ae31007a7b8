//! Core data models used throughout the outreach pipeline.
//!
//! These types carry a job posting from extraction, through portfolio
//! retrieval, to the drafted email.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Structured fields extracted from a job posting.
///
/// Every field defaults to empty when the model omits it or sends `null`.
/// A field of the wrong JSON type is a deserialization error, never a
/// partial value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl JobInfo {
    /// Fixed job used by `generate --test-data`, bypassing fetch and extraction.
    pub fn sample() -> Self {
        Self {
            role: "3D Footwear Designer II".to_string(),
            experience: "5+ years in footwear design".to_string(),
            skills: vec![
                "CAD".to_string(),
                "3D Modeling".to_string(),
                "Prototyping".to_string(),
            ],
            description: "Design innovative footwear products using 3D tools".to_string(),
        }
    }
}

/// One row of the portfolio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioEntry {
    pub techstack: String,
    pub link: String,
}

/// A portfolio entry returned by a similarity query.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioMatch {
    pub id: String,
    pub techstack: String,
    pub link: String,
    pub score: f64,
}

/// Email text exactly as the model produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft(pub String);

impl EmailDraft {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let job: JobInfo = serde_json::from_str(r#"{"role": "Engineer"}"#).unwrap();
        assert_eq!(job.role, "Engineer");
        assert!(job.experience.is_empty());
        assert!(job.skills.is_empty());
        assert!(job.description.is_empty());
    }

    #[test]
    fn test_wrong_field_type_is_an_error() {
        let result = serde_json::from_str::<JobInfo>(r#"{"role": "Engineer", "skills": "Rust"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_null_fields_become_empty() {
        let job: JobInfo = serde_json::from_str(
            r#"{"role": "Designer", "experience": null, "skills": null, "description": null}"#,
        )
        .unwrap();
        assert_eq!(job.role, "Designer");
        assert!(job.experience.is_empty());
        assert!(job.skills.is_empty());
        assert!(job.description.is_empty());
    }

    #[test]
    fn test_null_role_becomes_empty() {
        let job: JobInfo = serde_json::from_str(r#"{"role": null, "skills": ["CAD"]}"#).unwrap();
        assert!(job.role.is_empty());
        assert_eq!(job.skills, vec!["CAD"]);
    }

    #[test]
    fn test_sample_job() {
        let job = JobInfo::sample();
        assert_eq!(job.role, "3D Footwear Designer II");
        assert_eq!(job.skills.len(), 3);
    }
}
