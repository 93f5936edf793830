//! Tree comparison and content equality
//!
//! [`compare`] turns two tree inventories into a [`SyncPlan`]. Content
//! equality uses a size check first and falls back to comparing streaming
//! digests, so files of different sizes are never read.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use mirror_fs::checksum::compute_file_checksum;
use mirror_fs::{CaseSensitivity, NormalizedPath};

use crate::Result;
use crate::event::LogEvent;
use crate::plan::{FileTransfer, SyncPlan};
use crate::scan::{DirectoryEntry, FileEntry, TreeRole, scan_tree};

/// Computes content fingerprints of files.
///
/// Two files with equal fingerprints are treated as identical. A distinct
/// pair colliding on the digest is an accepted approximation.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, path: &Path) -> std::io::Result<String>;
}

/// Streaming SHA-256 fingerprints in `sha256:<hex>` form.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Fingerprinter;

impl Fingerprinter for Sha256Fingerprinter {
    fn fingerprint(&self, path: &Path) -> std::io::Result<String> {
        compute_file_checksum(path)
    }
}

/// Decides whether two files have different content.
#[derive(Clone)]
pub struct ContentComparator {
    fingerprinter: Arc<dyn Fingerprinter>,
}

impl Default for ContentComparator {
    fn default() -> Self {
        Self::new(Arc::new(Sha256Fingerprinter))
    }
}

impl std::fmt::Debug for ContentComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentComparator").finish_non_exhaustive()
    }
}

impl ContentComparator {
    pub fn new(fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        Self { fingerprinter }
    }

    /// Returns true if `a` and `b` differ.
    ///
    /// Sizes are compared first; digests are computed only for files of
    /// equal size. A replica entry that is not a regular file always differs.
    ///
    /// # Errors
    ///
    /// Returns the first digest failure. Callers treat that as "differs".
    pub fn differs(&self, a: &FileEntry, b: &FileEntry) -> mirror_fs::Result<bool> {
        if a.special || b.special || a.size != b.size {
            return Ok(true);
        }
        let left = a.fingerprint(self.fingerprinter.as_ref())?;
        let right = b.fingerprint(self.fingerprinter.as_ref())?;
        Ok(left != right)
    }
}

/// Maps source spellings onto directory spellings already in the replica.
///
/// With case-insensitive matching, `Docs/a.txt` in the source must land in
/// an existing replica directory `docs/`, not in a new sibling `Docs/`.
struct ReplicaSpelling<'a> {
    dirs: &'a BTreeMap<String, DirectoryEntry>,
    case: CaseSensitivity,
}

impl ReplicaSpelling<'_> {
    fn resolve(&self, path: &NormalizedPath) -> NormalizedPath {
        let segments: Vec<&OsStr> = path.segments().collect();
        let Some((last, ancestors)) = segments.split_last() else {
            return path.clone();
        };

        let mut resolved = NormalizedPath::default();
        let mut prefix = NormalizedPath::default();
        for segment in ancestors {
            prefix = prefix.join(segment);
            resolved = match self.dirs.get(&prefix.key(self.case)) {
                Some(existing) => existing.path.clone(),
                None => resolved.join(segment),
            };
        }
        resolved.join(last)
    }
}

/// Compare `source_root` against `replica_root` and plan the actions that
/// make the replica identical to the source.
///
/// # Errors
///
/// Fails only if either root cannot be enumerated.
pub fn compare(
    source_root: &Path,
    replica_root: &Path,
    comparator: &ContentComparator,
    case: CaseSensitivity,
) -> Result<SyncPlan> {
    let source = scan_tree(source_root, TreeRole::Source, case)?;
    let replica = scan_tree(replica_root, TreeRole::Replica, case)?;

    let mut plan = SyncPlan::new(case);
    plan.warnings.extend(source.warnings);
    plan.warnings.extend(replica.warnings);

    let spelling = ReplicaSpelling {
        dirs: &replica.dirs,
        case,
    };

    for (key, dir) in &source.dirs {
        plan.retain_dir(&dir.path);
        if !replica.dirs.contains_key(key) {
            plan.to_create.push(spelling.resolve(&dir.path));
        }
    }

    for (key, file) in &source.files {
        let Some(existing) = replica.files.get(key) else {
            plan.to_copy.push(FileTransfer {
                source: file.path.clone(),
                target: spelling.resolve(&file.path),
            });
            continue;
        };

        let transfer = FileTransfer {
            source: file.path.clone(),
            target: existing.path.clone(),
        };
        match comparator.differs(file, existing) {
            Ok(true) => plan.to_update.push(transfer),
            Ok(false) => plan.unchanged.push(file.path.clone()),
            Err(err) => {
                let path = err.path().unwrap_or(file.absolute.as_path()).to_path_buf();
                plan.warnings.push(LogEvent::warning(
                    path,
                    format!("digest failed, treating as modified: {err}"),
                ));
                plan.to_update.push(transfer);
            }
        }
    }

    for (key, file) in &replica.files {
        if !source.files.contains_key(key) {
            plan.to_delete_files.push(file.path.clone());
        }
    }

    for (key, dir) in &replica.dirs {
        if !source.dirs.contains_key(key) {
            plan.to_delete_dirs.push(dir.path.clone());
        }
    }

    plan.finalize();
    for warning in &plan.warnings {
        warning.trace();
    }

    tracing::debug!(
        create = plan.to_create.len(),
        copy = plan.to_copy.len(),
        update = plan.to_update.len(),
        delete_files = plan.to_delete_files.len(),
        delete_dirs = plan.to_delete_dirs.len(),
        unchanged = plan.unchanged.len(),
        "comparison complete"
    );

    Ok(plan)
}
