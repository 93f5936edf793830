//! [`TreeFixture`] builder for source/replica test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::inventory::{dir_inventory, file_inventory};

/// A temporary directory holding a `source/` and a `replica/` tree.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TreeFixture;
///
/// let fixture = TreeFixture::new();
/// fixture.write_source("docs/a.txt", "hello");
/// fixture.mkdir_replica("stale");
/// // ... run a synchronization ...
/// fixture.assert_mirrored();
/// ```
pub struct TreeFixture {
    temp_dir: TempDir,
    source: PathBuf,
    replica: PathBuf,
}

impl Default for TreeFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFixture {
    /// Create the temporary directory with both trees present and empty.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        let replica = temp_dir.path().join("replica");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&replica).unwrap();
        Self {
            temp_dir,
            source,
            replica,
        }
    }

    /// Create the fixture without a replica directory.
    pub fn without_replica() -> Self {
        let fixture = Self::new();
        fs::remove_dir(&fixture.replica).unwrap();
        fixture
    }

    /// The temporary directory containing both trees.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    /// Write `content` to `path` (relative to the source), creating parents.
    pub fn write_source(&self, path: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write(&self.source, path, content.as_ref())
    }

    /// Write `content` to `path` (relative to the replica), creating parents.
    pub fn write_replica(&self, path: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write(&self.replica, path, content.as_ref())
    }

    pub fn mkdir_source(&self, path: &str) -> PathBuf {
        mkdir(&self.source, path)
    }

    pub fn mkdir_replica(&self, path: &str) -> PathBuf {
        mkdir(&self.replica, path)
    }

    /// Remove a file or directory tree from the source.
    pub fn remove_source(&self, path: &str) {
        let full = self.source.join(path);
        if full.is_dir() {
            fs::remove_dir_all(&full).unwrap();
        } else {
            fs::remove_file(&full).unwrap();
        }
    }

    /// Read a replica file as UTF-8.
    ///
    /// # Panics
    /// Panics if the file does not exist or is not valid UTF-8.
    pub fn read_replica(&self, path: &str) -> String {
        let full = self.replica.join(path);
        fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("read_replica: cannot read {}: {e}", full.display()))
    }

    /// Assert that the replica holds exactly the source's files, contents
    /// and directories.
    ///
    /// # Panics
    /// Panics with both inventories if the trees differ.
    pub fn assert_mirrored(&self) {
        let source_files = file_inventory(&self.source);
        let replica_files = file_inventory(&self.replica);
        assert!(
            source_files == replica_files,
            "file trees differ:\n  source:  {:?}\n  replica: {:?}",
            source_files.keys().collect::<Vec<_>>(),
            replica_files.keys().collect::<Vec<_>>()
        );

        let source_dirs = dir_inventory(&self.source);
        let replica_dirs = dir_inventory(&self.replica);
        assert_eq!(source_dirs, replica_dirs, "directory trees differ");
    }
}

fn write(root: &Path, path: &str, content: &[u8]) -> PathBuf {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&full, content).unwrap();
    full
}

fn mkdir(root: &Path, path: &str) -> PathBuf {
    let full = root.join(path);
    fs::create_dir_all(&full).unwrap();
    full
}
