//! Filesystem primitives for the directory mirror
//!
//! Provides normalized relative paths, streaming content checksums,
//! atomic copies under advisory locks and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{CaseSensitivity, NormalizedPath};
