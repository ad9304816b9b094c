use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("NotFound: {0}")]
    NotFound(String),
    #[error("UnsupportedType: {path} (allowed: {allowed})")]
    UnsupportedType { path: String, allowed: String },
}

/// Check that a comparison source exists and carries one of the allowed extensions
/// (matched case-insensitively, with or without the leading dot).
pub fn validate_source(path: &Path, allowed_extensions: &[String]) -> Result<(), SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound(path.display().to_string()));
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
    let ok = allowed_extensions
        .iter()
        .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&ext));
    if ext.is_empty() || !ok {
        return Err(SourceError::UnsupportedType {
            path: path.display().to_string(),
            allowed: allowed_extensions.join(", "),
        });
    }
    Ok(())
}

/// Display title of a source: its last path (or URL path) segment.
pub fn derive_title(source: &str) -> String {
    let no_query = source.split(&['?', '#'][..]).next().unwrap_or(source);
    no_query
        .trim_end_matches(&['/', '\\'][..])
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or("")
        .to_string()
}
