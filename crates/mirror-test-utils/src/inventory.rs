//! Snapshots of tree contents for equality assertions.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or_else(|e| panic!("inventory: {} outside {}: {e}", path.display(), root.display()))
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Every regular file below `root`, keyed by `/`-separated relative path.
///
/// # Panics
/// Panics if the tree cannot be walked or a file cannot be read.
pub fn file_inventory(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap_or_else(|e| panic!("file_inventory: walk failed: {e}")))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let content = fs::read(entry.path()).unwrap_or_else(|e| {
                panic!("file_inventory: cannot read {}: {e}", entry.path().display())
            });
            (relative(root, entry.path()), content)
        })
        .collect()
}

/// Every directory below `root`, as `/`-separated relative paths.
///
/// # Panics
/// Panics if the tree cannot be walked.
pub fn dir_inventory(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap_or_else(|e| panic!("dir_inventory: walk failed: {e}")))
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| relative(root, entry.path()))
        .collect()
}
