use serde::{Deserialize, Serialize};

use crate::diff::{diff, ClauseChange, Comparison, DiffSummary};
use crate::normalize::{normalize_with_stats, CleanStats};
use crate::segment::segment;
use crate::source::derive_title;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub old_title: String,
    pub new_title: String,
}

impl Meta {
    pub fn from_sources(old_source: &str, new_source: &str) -> Self {
        Self { old_title: derive_title(old_source), new_title: derive_title(new_source) }
    }
}

/// A stored comparison between two versions of one regulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub uuid: String,
    pub title: String,
    pub old_source: String,
    pub new_source: String,
    pub meta: Meta,
    pub summary: DiffSummary,
    pub changes: Vec<ClauseChange>,
    pub created_ms: u64,
}

impl ComparisonReport {
    pub fn new(title: &str, old_source: &str, new_source: &str, comparison: Comparison) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            old_source: old_source.to_string(),
            new_source: new_source.to_string(),
            meta: Meta::from_sources(old_source, new_source),
            summary: comparison.summary,
            changes: comparison.changes,
            created_ms: crate::now_ms(),
        }
    }
}

/// Per-side counters collected while running the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SideStats {
    pub clean: CleanStats,
    pub clauses: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub comparison: Comparison,
    pub old: SideStats,
    pub new: SideStats,
}

/// normalize -> segment -> diff, for two raw extracted texts.
pub fn compare_texts(old_raw: &str, new_raw: &str) -> Comparison {
    run_pipeline(old_raw, new_raw).comparison
}

/// [`compare_texts`] plus the counters the CLI logs.
pub fn run_pipeline(old_raw: &str, new_raw: &str) -> PipelineOutput {
    let old_norm = normalize_with_stats(old_raw);
    let new_norm = normalize_with_stats(new_raw);
    let old_map = segment(&old_norm.text);
    let new_map = segment(&new_norm.text);
    PipelineOutput {
        comparison: diff(&old_map, &new_map),
        old: SideStats { clean: old_norm.stats, clauses: old_map.len() },
        new: SideStats { clean: new_norm.stats, clauses: new_map.len() },
    }
}
