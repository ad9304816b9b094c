//! Clause-level comparison of two versions of an Indonesian regulation.
//!
//! Pipeline: raw `pdftotext` output -> [`normalize`] -> [`segment`] into a [`ClauseMap`]
//! keyed by "Pasal" heading -> [`diff`] old against new.

pub mod config;
pub mod diff;
pub mod extract;
pub mod normalize;
pub mod report;
pub mod segment;
pub mod source;
pub mod store;

pub use config::{load_config, parse_config, CompareConfig, ConfigError, DEFAULT_CONFIG_FILE};
pub use diff::{diff, ChangeStatus, ClauseChange, Comparison, DiffSummary};
pub use extract::{check_deps, extract_text, install_help_for, needs_pdftotext, DepsResult, ExtractError};
pub use normalize::{clean_text, isolate_headings, normalize, normalize_with_stats, CleanStats, NormalizeOutput};
pub use report::{compare_texts, run_pipeline, ComparisonReport, Meta, PipelineOutput, SideStats};
pub use segment::{clause_key, headings, segment, ClauseMap};
pub use source::{derive_title, validate_source, SourceError};
pub use store::{AuditEntry, AuditLog, ComparisonStore, StoreError};

// Utility to compute sha256 hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
