//! Saving drafted emails as markdown files.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::RunError;
use crate::models::EmailDraft;

/// File name for a draft: `<prefix>_<role>.md`.
///
/// Spaces and path separators in the role become `_`; an empty role is
/// written as `untitled`.
pub fn email_file_name(prefix: &str, role: &str) -> String {
    let role = role.trim();
    let stem: String = if role.is_empty() {
        "untitled".to_string()
    } else {
        role.chars()
            .map(|c| match c {
                ' ' | '/' | '\\' => '_',
                other => other,
            })
            .collect()
    };
    format!("{}_{}.md", prefix, stem)
}

/// Write `draft` into `dir`, creating the directory if needed.
pub fn write_email(
    dir: &Path,
    prefix: &str,
    role: &str,
    draft: &EmailDraft,
) -> Result<PathBuf, RunError> {
    let path = dir.join(email_file_name(prefix, role));

    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&path, draft.as_str()))
        .map_err(|source| RunError::Save {
            path: path.clone(),
            source,
        })?;

    info!("Saved email to {}", path.display());
    Ok(path)
}
