use serde::{Deserialize, Serialize};

use crate::segment::ClauseMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseChange {
    pub pasal: String,
    pub status: ChangeStatus,
    pub old_text: Option<String>,
    pub new_text: Option<String>,
}

impl ClauseChange {
    pub fn added(pasal: &str, new_text: &str) -> Self {
        Self { pasal: pasal.to_string(), status: ChangeStatus::Added, old_text: None, new_text: Some(new_text.to_string()) }
    }

    pub fn modified(pasal: &str, old_text: &str, new_text: &str) -> Self {
        Self {
            pasal: pasal.to_string(),
            status: ChangeStatus::Modified,
            old_text: Some(old_text.to_string()),
            new_text: Some(new_text.to_string()),
        }
    }

    pub fn removed(pasal: &str, old_text: &str) -> Self {
        Self { pasal: pasal.to_string(), status: ChangeStatus::Removed, old_text: Some(old_text.to_string()), new_text: None }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffSummary {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub changes: Vec<ClauseChange>,
    pub summary: DiffSummary,
}

/// Compare clause maps by key.
/// Added and modified clauses come first in `new` order, then removed clauses in `old` order.
/// Bodies are compared exactly after trimming.
pub fn diff(old: &ClauseMap, new: &ClauseMap) -> Comparison {
    let mut changes = Vec::new();
    let mut summary = DiffSummary::default();

    for (key, new_body) in new.iter() {
        match old.get(key) {
            None => {
                changes.push(ClauseChange::added(key, new_body));
                summary.added += 1;
            }
            Some(old_body) if old_body.trim() != new_body.trim() => {
                changes.push(ClauseChange::modified(key, old_body, new_body));
                summary.modified += 1;
            }
            Some(_) => {}
        }
    }

    for (key, old_body) in old.iter() {
        if !new.contains_key(key) {
            changes.push(ClauseChange::removed(key, old_body));
            summary.removed += 1;
        }
    }

    Comparison { changes, summary }
}
