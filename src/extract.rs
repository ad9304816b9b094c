use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepsResult {
    pub ok: bool,
    pub missing: Vec<String>,
}

/// Check the external extraction tool.
/// - Required: pdftotext (Poppler)
/// `ok` is true iff required deps are present.
pub fn check_deps() -> DepsResult {
    let mut missing = Vec::new();
    let has_pdftotext = which::which("pdftotext").is_ok();
    if !has_pdftotext {
        missing.push("pdftotext".to_string());
    }
    DepsResult { ok: has_pdftotext, missing }
}

/// Render Nala installation help for missing deps.
pub fn install_help_for(missing: &[String]) -> String {
    if !missing.iter().any(|m| m == "pdftotext") {
        return String::new();
    }
    "Dependency missing. Install via Nala:\n  sudo nala install poppler-utils".to_string()
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    #[error("EncryptedPDF: {0}")]
    EncryptedPdf(String),
    #[error("ToolMissing: pdftotext")]
    ToolMissing,
    #[error("ExtractFailed: {0}")]
    Failed(String),
}

/// Whether `path` needs pdftotext, as opposed to being read as already-extracted text.
pub fn needs_pdftotext(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("pdf")).unwrap_or(false)
}

/// Extract the raw text of one document version.
/// `.pdf` files go through `pdftotext [-layout] -q <file> -`; anything else is read as UTF-8 text.
pub fn extract_text(path: &Path, layout: bool) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound(path.display().to_string()));
    }
    if !needs_pdftotext(path) {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::Failed(e.to_string()))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }
    if which::which("pdftotext").is_err() {
        return Err(ExtractError::ToolMissing);
    }

    let mut cmd = Command::new("pdftotext");
    if layout {
        cmd.arg("-layout");
    }
    cmd.arg("-q");
    cmd.arg(path);
    cmd.arg("-"); // write to stdout

    let out = cmd.output().map_err(|e| ExtractError::Failed(e.to_string()))?;
    if !out.status.success() {
        let err = String::from_utf8_lossy(&out.stderr).to_lowercase();
        if err.contains("encrypt") || err.contains("password") {
            return Err(ExtractError::EncryptedPdf(path.display().to_string()));
        }
        return Err(ExtractError::Failed(format!("pdftotext exited with {}", out.status.code().unwrap_or(-1))));
    }
    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}
