//! Applying a [`SyncPlan`] to the replica
//!
//! Operations run in a fixed order: create directories, copy new files,
//! overwrite modified files, delete files, delete directories, then sweep
//! directories left empty. Every operation is attempted on its own; a
//! failure becomes an error event and the run moves on.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mirror_fs::{NormalizedPath, RobustnessConfig, io};

use crate::event::{EventKind, EventLog, LogEvent};
use crate::plan::{FileTransfer, SyncPlan};

/// Apply `plan` and return one event per action, in execution order.
pub fn apply(
    plan: &SyncPlan,
    source_root: &Path,
    replica_root: &Path,
    robustness: RobustnessConfig,
) -> Vec<LogEvent> {
    let mut executor = Executor {
        source_root,
        replica_root,
        robustness,
        log: EventLog::new(),
    };

    for dir in &plan.to_create {
        executor.create_dir(dir);
    }
    for transfer in &plan.to_copy {
        executor.transfer(transfer, EventKind::CopyNew);
    }
    for transfer in &plan.to_update {
        executor.transfer(transfer, EventKind::UpdateModified);
    }
    for file in &plan.to_delete_files {
        executor.delete_file(file);
    }
    for dir in &plan.to_delete_dirs {
        executor.delete_dir(dir);
    }
    executor.sweep_empty_dirs(plan);

    executor.log.into_events()
}

struct Executor<'a> {
    source_root: &'a Path,
    replica_root: &'a Path,
    robustness: RobustnessConfig,
    log: EventLog,
}

impl Executor<'_> {
    fn create_dir(&mut self, dir: &NormalizedPath) {
        let target = dir.resolve(self.replica_root);
        match fs::create_dir(&target) {
            Ok(()) => self.log.record(LogEvent::action(EventKind::CreateDir, target)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists && target.is_dir() => {
                tracing::debug!(path = %target.display(), "directory appeared before creation");
            }
            Err(err) => self
                .log
                .record(LogEvent::error(target, format!("create directory: {err}"))),
        }
    }

    fn transfer(&mut self, transfer: &FileTransfer, kind: EventKind) {
        let from = transfer.source.resolve(self.source_root);
        let to = transfer.target.resolve(self.replica_root);
        match io::copy_atomic(&from, &to, self.robustness) {
            Ok(bytes) => {
                tracing::trace!(bytes, path = %to.display(), "copied");
                self.log.record(LogEvent::transfer(kind, from, to));
            }
            Err(err) => self
                .log
                .record(LogEvent::error(to, format!("{kind}: {err}"))),
        }
    }

    fn delete_file(&mut self, file: &NormalizedPath) {
        let target = file.resolve(self.replica_root);
        match fs::remove_file(&target) {
            Ok(()) => self.log.record(LogEvent::action(EventKind::DeleteFile, target)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %target.display(), "file already gone");
            }
            Err(err) => self
                .log
                .record(LogEvent::error(target, format!("delete file: {err}"))),
        }
    }

    fn delete_dir(&mut self, dir: &NormalizedPath) {
        let target = dir.resolve(self.replica_root);
        // Emptiness is re-checked here: a writer may have added a child since planning
        match io::is_dir_empty(&target) {
            Ok(true) => {
                self.remove_empty_dir(target);
            }
            Ok(false) => self.log.record(LogEvent::warning(
                target,
                "directory not empty, deletion skipped",
            )),
            Err(mirror_fs::Error::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %target.display(), "directory already gone");
            }
            Err(err) => self
                .log
                .record(LogEvent::error(target, format!("delete directory: {err}"))),
        }
    }

    fn remove_empty_dir(&mut self, target: PathBuf) -> bool {
        match fs::remove_dir(&target) {
            Ok(()) => {
                self.log
                    .record(LogEvent::action(EventKind::DeleteEmptyDir, target));
                true
            }
            Err(err) => {
                self.log
                    .record(LogEvent::error(target, format!("delete directory: {err}")));
                false
            }
        }
    }

    /// Remove replica directories that are empty and have no source
    /// counterpart, repeating until a pass removes nothing.
    fn sweep_empty_dirs(&mut self, plan: &SyncPlan) {
        loop {
            let removed = self.sweep_pass(plan);
            if removed == 0 {
                break;
            }
            tracing::debug!(removed, "empty directory sweep pass");
        }
    }

    /// One post-order pass over the replica using an explicit stack.
    fn sweep_pass(&mut self, plan: &SyncPlan) -> usize {
        let mut removed = 0;
        let mut stack = vec![(self.replica_root.to_path_buf(), false)];

        while let Some((dir, children_done)) = stack.pop() {
            if children_done {
                if dir == self.replica_root {
                    continue;
                }
                let Some(relative) = NormalizedPath::relative_to(self.replica_root, &dir) else {
                    continue;
                };
                if plan.retains_dir(&relative) || !matches!(io::is_dir_empty(&dir), Ok(true)) {
                    continue;
                }
                if self.remove_empty_dir(dir) {
                    removed += 1;
                }
                continue;
            }

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %dir.display(), error = %err, "cannot read directory during sweep");
                    continue;
                }
            };
            stack.push((dir, true));
            for entry in entries.flatten() {
                if entry.file_type().is_ok_and(|t| t.is_dir()) {
                    stack.push((entry.path(), false));
                }
            }
        }

        removed
    }
}
