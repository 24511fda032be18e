//! Ledger configuration
//!
//! JSON file:
//!
//! ```json
//! { "data_dir": "/var/lib/quill", "journal_fsync": true, "max_tasks_per_tick": 256 }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the journal
    pub data_dir: PathBuf,

    /// Sync the journal after every committed transition
    #[serde(default = "default_journal_fsync")]
    pub journal_fsync: bool,

    /// Upper bound on tasks fired by one tick
    #[serde(default = "default_max_tasks_per_tick")]
    pub max_tasks_per_tick: usize,
}

fn default_journal_fsync() -> bool {
    true
}

fn default_max_tasks_per_tick() -> usize {
    256
}

impl Config {
    /// Config with defaults for everything but the data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            journal_fsync: default_journal_fsync(),
            max_tasks_per_tick: default_max_tasks_per_tick(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "data_dir",
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_tasks_per_tick == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tasks_per_tick",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}
