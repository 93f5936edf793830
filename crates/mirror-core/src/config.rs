//! Synchronizer configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use mirror_fs::{CaseSensitivity, ConfigStore, NormalizedPath, RobustnessConfig};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_interval_secs() -> u64 {
    60
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

/// Everything a [`Synchronizer`](crate::Synchronizer) and its drivers need.
///
/// Can be loaded from TOML, JSON or YAML:
///
/// ```toml
/// source = "/data/source"
/// replica = "/backup/replica"
/// interval_secs = 30
/// case_sensitivity = "sensitive"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Authoritative tree
    pub source: PathBuf,
    /// Tree kept identical to `source`
    pub replica: PathBuf,
    /// Log file used by the command-line driver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Seconds between scheduled runs
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// How relative paths are matched across trees
    #[serde(default)]
    pub case_sensitivity: CaseSensitivity,
    /// Whether filesystem change notifications trigger extra runs
    #[serde(default = "default_true")]
    pub watch: bool,
    /// Quiet period after a change notification before a run starts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Upper bound for acquiring a shared lock on a source file
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    /// Whether copied files are fsynced before being renamed into place
    #[serde(default = "default_true")]
    pub fsync: bool,
}

impl SyncConfig {
    /// Configuration with default settings for the given trees.
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            log_file: None,
            interval_secs: default_interval_secs(),
            case_sensitivity: CaseSensitivity::default(),
            watch: true,
            debounce_ms: default_debounce_ms(),
            lock_timeout_ms: default_lock_timeout_ms(),
            fsync: true,
        }
    }

    /// Load a configuration file; the format follows the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = ConfigStore::new().load(&NormalizedPath::new(path))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the case sensitivity used for matching.
    pub fn with_case_sensitivity(mut self, case: CaseSensitivity) -> Self {
        self.case_sensitivity = case;
        self
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::invalid_config("interval_secs must be at least 1"));
        }
        if self.source.as_os_str().is_empty() || self.replica.as_os_str().is_empty() {
            return Err(Error::invalid_config("source and replica paths must be set"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Lock and durability settings for copies.
    pub fn robustness(&self) -> RobustnessConfig {
        RobustnessConfig {
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            enable_fsync: self.fsync,
        }
    }
}
