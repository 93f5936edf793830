//! Error types for mirror-core
//!
//! Only precondition failures surface as [`Error`]. Problems with individual
//! files during a run are reported as [`LogEvent`](crate::LogEvent)s instead.

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source directory does not exist
    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Source path exists but is not a directory
    #[error("Source is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },

    /// Replica path exists but is not a directory
    #[error("Replica is not a directory: {path}")]
    ReplicaNotDirectory { path: PathBuf },

    /// Replica directory cannot be created or written
    #[error("Replica directory {path} is not writable: {reason}")]
    ReplicaNotWritable {
        path: PathBuf,
        #[source]
        reason: std::io::Error,
    },

    /// One tree lies inside the other
    #[error("Source {source_root} and replica {replica_root} must not be nested inside each other")]
    NestedTrees {
        source_root: PathBuf,
        replica_root: PathBuf,
    },

    /// A tree root could not be enumerated at all
    #[error("Cannot read tree root {path}: {message}")]
    RootUnreadable { path: PathBuf, message: String },

    /// Configuration values are out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The filesystem change notifier could not be started
    #[error("Change notifier failed: {0}")]
    Watch(#[from] notify::Error),

    // Transparent wrappers for underlying errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid-configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
