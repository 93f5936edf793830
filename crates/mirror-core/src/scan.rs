//! Tree enumeration
//!
//! Walks a tree once and indexes every file and directory by its relative
//! path key. Problems with individual entries are collected as warnings and
//! never abort the walk.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mirror_fs::{CaseSensitivity, NormalizedPath};
use walkdir::WalkDir;

use crate::compare::Fingerprinter;
use crate::event::LogEvent;
use crate::{Error, Result};

/// Which side of the mirror a tree is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRole {
    Source,
    Replica,
}

/// A file (or, in the replica, any non-directory entry) found in a tree.
#[derive(Debug)]
pub struct FileEntry {
    pub path: NormalizedPath,
    pub absolute: PathBuf,
    pub size: u64,
    /// Not a regular file (symlink, socket, ...); only recorded in replicas
    pub special: bool,
    fingerprint: OnceCell<String>,
}

impl FileEntry {
    pub fn new(path: NormalizedPath, absolute: PathBuf, size: u64) -> Self {
        Self {
            path,
            absolute,
            size,
            special: false,
            fingerprint: OnceCell::new(),
        }
    }

    /// Content fingerprint, computed on first use and cached.
    pub fn fingerprint(&self, fingerprinter: &dyn Fingerprinter) -> mirror_fs::Result<&str> {
        if let Some(cached) = self.fingerprint.get() {
            return Ok(cached);
        }
        let computed = fingerprinter
            .fingerprint(&self.absolute)
            .map_err(|e| mirror_fs::Error::io(&self.absolute, e))?;
        Ok(self.fingerprint.get_or_init(|| computed))
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub path: NormalizedPath,
    pub absolute: PathBuf,
}

/// Indexed contents of one tree.
#[derive(Debug)]
pub struct TreeInventory {
    pub root: PathBuf,
    pub files: BTreeMap<String, FileEntry>,
    pub dirs: BTreeMap<String, DirectoryEntry>,
    pub warnings: Vec<LogEvent>,
}

impl TreeInventory {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            files: BTreeMap::new(),
            dirs: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    fn is_claimed(&self, key: &str) -> bool {
        self.files.contains_key(key) || self.dirs.contains_key(key)
    }
}

/// Enumerate every file and directory below `root`.
///
/// Symbolic links are not followed. In a source tree, entries that are
/// neither regular files nor directories are skipped with a warning; in a
/// replica they are recorded as special files so they get replaced or
/// removed.
///
/// # Errors
///
/// Fails only when the root itself cannot be read, so that an unreadable
/// source is never mistaken for an empty one.
pub fn scan_tree(root: &Path, role: TreeRole, case: CaseSensitivity) -> Result<TreeInventory> {
    let mut inventory = TreeInventory::new(root);

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                if err.depth() == 0 {
                    return Err(Error::RootUnreadable {
                        path,
                        message: err.to_string(),
                    });
                }
                inventory
                    .warnings
                    .push(LogEvent::warning(path, format!("skipped unreadable entry: {err}")));
                continue;
            }
        };

        let Some(relative) = NormalizedPath::relative_to(root, entry.path()) else {
            continue;
        };
        let key = relative.key(case);
        let absolute = entry.path().to_path_buf();

        if inventory.is_claimed(&key) {
            inventory.warnings.push(LogEvent::warning(
                absolute,
                format!("skipped: path collides with another entry under {case:?} matching"),
            ));
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            inventory.dirs.insert(
                key,
                DirectoryEntry {
                    path: relative,
                    absolute,
                },
            );
            continue;
        }

        if !file_type.is_file() && role == TreeRole::Source {
            inventory.warnings.push(LogEvent::warning(
                absolute,
                "skipped: not a regular file or directory",
            ));
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                inventory
                    .warnings
                    .push(LogEvent::warning(absolute, format!("skipped: cannot stat entry: {err}")));
                continue;
            }
        };

        let mut file = FileEntry::new(relative, absolute, metadata.len());
        file.special = !file_type.is_file();
        inventory.files.insert(key, file);
    }

    tracing::debug!(
        root = %root.display(),
        ?role,
        files = inventory.files.len(),
        dirs = inventory.dirs.len(),
        warnings = inventory.warnings.len(),
        "scanned tree"
    );

    Ok(inventory)
}
