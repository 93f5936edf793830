//! The immutable result of comparing two trees

use std::collections::BTreeSet;
use std::fmt;

use mirror_fs::{CaseSensitivity, NormalizedPath};
use serde::Serialize;

use crate::event::{EventKind, LogEvent};

/// A file to be written into the replica.
///
/// `source` is the relative path in the source tree, `target` the relative
/// path written in the replica. They differ only in letter case, when
/// case-insensitive matching resolved part of the path to an existing
/// replica spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransfer {
    pub source: NormalizedPath,
    pub target: NormalizedPath,
}

/// Every action needed to make a replica match its source.
///
/// Directory lists are already in execution order: `to_create` shallow
/// first, `to_delete_dirs` deepest first. File lists are sorted by path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncPlan {
    pub to_create: Vec<NormalizedPath>,
    pub to_copy: Vec<FileTransfer>,
    pub to_update: Vec<FileTransfer>,
    pub to_delete_files: Vec<NormalizedPath>,
    pub to_delete_dirs: Vec<NormalizedPath>,
    pub unchanged: Vec<NormalizedPath>,
    pub warnings: Vec<LogEvent>,
    #[serde(skip)]
    case: CaseSensitivity,
    #[serde(skip)]
    source_dirs: BTreeSet<String>,
}

impl SyncPlan {
    pub fn new(case: CaseSensitivity) -> Self {
        Self {
            case,
            ..Self::default()
        }
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case
    }

    /// Remember a source directory so the empty-directory sweep keeps its
    /// replica counterpart.
    pub fn retain_dir(&mut self, path: &NormalizedPath) {
        self.source_dirs.insert(path.key(self.case));
    }

    /// True if `path` names a directory that exists in the source tree.
    pub fn retains_dir(&self, path: &NormalizedPath) -> bool {
        self.source_dirs.contains(&path.key(self.case))
    }

    /// Number of filesystem mutations the plan calls for.
    pub fn action_count(&self) -> usize {
        self.to_create.len()
            + self.to_copy.len()
            + self.to_update.len()
            + self.to_delete_files.len()
            + self.to_delete_dirs.len()
    }

    /// True when the replica already matches the source.
    pub fn is_empty(&self) -> bool {
        self.action_count() == 0
    }

    /// Put every list into its execution order.
    pub(crate) fn finalize(&mut self) {
        self.to_create
            .sort_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));
        self.to_delete_dirs
            .sort_by(|a, b| b.depth().cmp(&a.depth()).then_with(|| a.cmp(b)));
        self.to_copy.sort_by(|a, b| a.source.cmp(&b.source));
        self.to_update.sort_by(|a, b| a.source.cmp(&b.source));
        self.to_delete_files.sort();
        self.unchanged.sort();
    }
}

fn write_transfer(f: &mut fmt::Formatter<'_>, kind: EventKind, transfer: &FileTransfer) -> fmt::Result {
    if transfer.source == transfer.target {
        writeln!(f, "{kind} {}", transfer.source)
    } else {
        writeln!(f, "{kind} {} -> {}", transfer.source, transfer.target)
    }
}

/// One line per action, in execution order.
impl fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dir in &self.to_create {
            writeln!(f, "{} {dir}", EventKind::CreateDir)?;
        }
        for transfer in &self.to_copy {
            write_transfer(f, EventKind::CopyNew, transfer)?;
        }
        for transfer in &self.to_update {
            write_transfer(f, EventKind::UpdateModified, transfer)?;
        }
        for file in &self.to_delete_files {
            writeln!(f, "{} {file}", EventKind::DeleteFile)?;
        }
        for dir in &self.to_delete_dirs {
            writeln!(f, "{} {dir}", EventKind::DeleteEmptyDir)?;
        }
        Ok(())
    }
}
