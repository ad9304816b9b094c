use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::report::ComparisonReport;
use crate::sha256_hex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("WriteFailed: {0}")]
    WriteFailed(String),
    #[error("Duplicate: comparison {uuid} already exists")]
    Duplicate { uuid: String, title: String },
    #[error("NotFound: {0}")]
    NotFound(String),
    #[error("Corrupt: {0}")]
    Corrupt(String),
}

/// Marker recording which comparison owns an (old, new) source pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PairClaim {
    uuid: String,
    title: String,
}

/// File-backed comparison records.
///
/// Layout under `root`:
/// - `records/<uuid>.json`: one [`ComparisonReport`] each
/// - `pairs/<sha256>.json`: claim for an (old_source, new_source) pair
/// - `audit.jsonl`: see [`AuditLog`]
#[derive(Debug, Clone)]
pub struct ComparisonStore {
    root: PathBuf,
}

impl ComparisonStore {
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root.join("records")).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        fs::create_dir_all(root.join("pairs")).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(Self { root: root.to_path_buf() })
    }

    pub fn audit_log(&self) -> AuditLog {
        AuditLog::new(self.root.join("audit.jsonl"))
    }

    fn record_path(&self, uuid: &str) -> Result<PathBuf, StoreError> {
        // only well-formed ids become file names
        let id = uuid::Uuid::parse_str(uuid).map_err(|_| StoreError::NotFound(uuid.to_string()))?;
        Ok(self.root.join("records").join(format!("{}.json", id)))
    }

    fn pair_path(&self, old_source: &str, new_source: &str) -> PathBuf {
        let key = sha256_hex(format!("{}\0{}", old_source, new_source).as_bytes());
        self.root.join("pairs").join(format!("{}.json", key))
    }

    /// Look up the comparison already registered for a source pair.
    pub fn find_pair(&self, old_source: &str, new_source: &str) -> Result<Option<(String, String)>, StoreError> {
        let path = self.pair_path(old_source, new_source);
        match fs::read(&path) {
            Ok(bytes) => {
                let claim: PairClaim = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
                Ok(Some((claim.uuid, claim.title)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Corrupt(e.to_string())),
        }
    }

    /// Persist a new comparison. The pair claim is published with no-clobber semantics,
    /// so of two concurrent creates for the same pair exactly one wins.
    pub fn create(&self, report: &ComparisonReport) -> Result<PathBuf, StoreError> {
        let pair_path = self.pair_path(&report.old_source, &report.new_source);
        let claim = PairClaim { uuid: report.uuid.clone(), title: report.title.clone() };
        let claim_bytes = serde_json::to_vec(&claim).map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(self.root.join("pairs")).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        tmp.write_all(&claim_bytes).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        if let Err(e) = tmp.persist_noclobber(&pair_path) {
            if e.error.kind() == ErrorKind::AlreadyExists {
                let (uuid, title) = self
                    .find_pair(&report.old_source, &report.new_source)?
                    .unwrap_or_default();
                return Err(StoreError::Duplicate { uuid, title });
            }
            return Err(StoreError::WriteFailed(e.error.to_string()));
        }

        match self.write_record(report) {
            Ok(path) => Ok(path),
            Err(e) => match fs::remove_file(&pair_path) {
                Ok(()) => Err(e),
                // a claim without a record would report Duplicate forever; say so
                Err(rm) => Err(StoreError::WriteFailed(format!(
                    "{}; pair claim {} not released: {}",
                    e,
                    pair_path.display(),
                    rm
                ))),
            },
        }
    }

    fn write_record(&self, report: &ComparisonReport) -> Result<PathBuf, StoreError> {
        let path = self.record_path(&report.uuid)?;
        let bytes = serde_json::to_vec_pretty(report).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        let mut tmp = NamedTempFile::new_in(self.root.join("records")).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        tmp.write_all(&bytes).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        tmp.persist(&path).map_err(|e| StoreError::WriteFailed(e.error.to_string()))?;
        Ok(path)
    }

    pub fn get(&self, uuid: &str) -> Result<ComparisonReport, StoreError> {
        let path = self.record_path(uuid)?;
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(uuid.to_string())),
            Err(e) => return Err(StoreError::Corrupt(e.to_string())),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Release the source pair, then remove the comparison.
    /// A failure in between leaves a findable record with a free pair, never the reverse.
    pub fn delete(&self, uuid: &str) -> Result<ComparisonReport, StoreError> {
        let report = self.get(uuid)?;
        let path = self.record_path(uuid)?;
        let pair_path = self.pair_path(&report.old_source, &report.new_source);
        match fs::remove_file(&pair_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::WriteFailed(e.to_string())),
        }
        fs::remove_file(&path).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        Ok(report)
    }

    /// All stored comparisons, oldest first.
    pub fn list(&self) -> Result<Vec<ComparisonReport>, StoreError> {
        let records = self.root.join("records");
        let walker = GlobWalkerBuilder::from_patterns(&records, &["*.json"])
            .max_depth(1)
            .follow_links(false)
            .build()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let mut out = Vec::new();
        for entry in walker.filter_map(|e| e.ok()) {
            let bytes = fs::read(entry.path()).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let report: ComparisonReport = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            out.push(report);
        }
        out.sort_by(|a, b| a.created_ms.cmp(&b.created_ms).then_with(|| a.uuid.cmp(&b.uuid)));
        Ok(out)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub command: String,
    pub request: serde_json::Value,
    pub response: serde_json::Value,
    pub status: i32,
    pub at_ms: u64,
}

/// Append-only JSON-lines log of every create request and its outcome.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(entry).map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        line.push(b'\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        file.write_all(&line).map_err(|e| StoreError::WriteFailed(e.to_string()))
    }

    pub fn read_all(&self) -> Result<Vec<AuditEntry>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Corrupt(e.to_string())),
        };
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(|e| StoreError::Corrupt(e.to_string())))
            .collect()
    }
}
