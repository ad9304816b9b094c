use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "regcompare.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub extraction: ExtractionSection,
    #[serde(default)]
    pub sources: SourcesSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_store_dir")]
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSection {
    #[serde(default = "default_true")]
    pub layout: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesSection {
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_id() -> String {
    "regcompare".to_string()
}

fn default_store_dir() -> String {
    "./comparisons".to_string()
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "txt".to_string()]
}

impl Default for StoreSection {
    fn default() -> Self {
        Self { dir: default_store_dir() }
    }
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self { layout: default_true() }
    }
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self { allowed_extensions: default_extensions() }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            store: StoreSection::default(),
            extraction: ExtractionSection::default(),
            sources: SourcesSection::default(),
        }
    }
}

impl CompareConfig {
    pub fn store_dir(&self) -> PathBuf {
        PathBuf::from(&self.store.dir)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load and validate the YAML config.
/// With `explicit == false` a missing file means "use defaults"; a named file must exist.
pub fn load_config(path: &Path, explicit: bool) -> Result<CompareConfig, ConfigError> {
    if !path.exists() {
        if explicit {
            return Err(ConfigError::Read(format!("{} not found", path.display())));
        }
        return Ok(CompareConfig::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<CompareConfig, ConfigError> {
    // an empty document deserializes as unit, not as a defaulted struct
    if raw.trim().is_empty() {
        return Ok(CompareConfig::default());
    }
    let cfg: CompareConfig = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;

    if cfg.id.trim().is_empty() {
        return Err(ConfigError::Invalid("missing id".into()));
    }
    if cfg.store.dir.trim().is_empty() {
        return Err(ConfigError::Invalid("missing store.dir".into()));
    }
    if cfg.sources.allowed_extensions.iter().all(|e| e.trim().is_empty()) {
        return Err(ConfigError::Invalid("sources.allowed_extensions is empty".into()));
    }
    Ok(cfg)
}
