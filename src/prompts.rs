//! Prompt templates for the extraction and email stages.
//!
//! Placeholders are written `{name}`; literal braces are escaped as `{{` and
//! `}}`. [`fill_template`] substitutes in a single pass, so text inserted
//! for one placeholder is never scanned for another.

use std::collections::HashMap;

/// Job extraction prompt. Placeholder: `page_data`.
pub const EXTRACT_JOB_TEMPLATE: &str = r#"
### WEBPAGE CONTENT:
{page_data}

### TASK:
Extract exactly these fields as VALID JSON:
{{
    "role": "<job_title>",
    "experience": "<years_requirements>",
    "skills": ["<skill1>", "<skill2>"],
    "description": "<job_summary>"
}}

### RULES:
- Return ONLY the JSON object
- No additional text/comments
- Empty array for skills if none found
- Empty strings for missing fields
"#;

/// Cold email prompt. Placeholders: `job_info`, `links`, `skills`,
/// `sender_name`, `sender_title`, `company`.
pub const COLD_EMAIL_TEMPLATE: &str = r#"
### JOB DETAILS:
{job_info}

### RELEVANT PORTFOLIO:
{links}

### INSTRUCTIONS:
Write a professional email as {sender_name} ({sender_title} at {company}):
1. Start with personalized greeting
2. Highlight relevant experience (match skills: {skills})
3. Include 1-2 portfolio examples
4. Keep concise (3 paragraphs max)
5. Professional closing

### EMAIL:
"#;

/// Substitute `{key}` placeholders from `values`.
///
/// Unknown placeholders are left as written, braces included.
pub fn fill_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if tail.starts_with('{') {
            match tail[1..].find('}') {
                Some(end) => {
                    let key = &tail[1..=end];
                    match values.get(key) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&tail[..end + 2]),
                    }
                    rest = &tail[end + 2..];
                }
                None => {
                    out.push_str(tail);
                    rest = "";
                }
            }
        } else {
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_fill_simple() {
        let out = fill_template("Hello {name}!", &values(&[("name", "Ada")]));
        assert_eq!(out, "Hello Ada!");
    }

    #[test]
    fn test_escaped_braces() {
        let out = fill_template("{{\"role\": \"{role}\"}}", &values(&[("role", "Dev")]));
        assert_eq!(out, "{\"role\": \"Dev\"}");
    }

    #[test]
    fn test_inserted_text_not_rescanned() {
        let out = fill_template(
            "{a} / {b}",
            &values(&[("a", "{b} and {{x}}"), ("b", "B")]),
        );
        assert_eq!(out, "{b} and {{x}} / B");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let out = fill_template("keep {this}", &values(&[]));
        assert_eq!(out, "keep {this}");
    }

    #[test]
    fn test_unclosed_brace_kept() {
        let out = fill_template("open { brace", &values(&[]));
        assert_eq!(out, "open { brace");
    }

    #[test]
    fn test_extract_template_renders_json_skeleton() {
        let out = fill_template(
            EXTRACT_JOB_TEMPLATE,
            &values(&[("page_data", "Senior Designer at Nike")]),
        );
        assert!(out.contains("Senior Designer at Nike"));
        assert!(out.contains("\"skills\": [\"<skill1>\", \"<skill2>\"]"));
        assert!(!out.contains("{{"));
        assert!(!out.contains("{page_data}"));
    }

    #[test]
    fn test_email_template_has_no_leftover_placeholders() {
        let out = fill_template(
            COLD_EMAIL_TEMPLATE,
            &values(&[
                ("job_info", "{}"),
                ("links", "[]"),
                ("skills", "CAD"),
                ("sender_name", "Mohan"),
                ("sender_title", "BDE"),
                ("company", "AtliQ"),
            ]),
        );
        assert!(out.contains("Write a professional email as Mohan (BDE at AtliQ):"));
        assert!(out.contains("match skills: CAD"));
        assert!(!out.contains("{skills}"));
    }
}
