//! Atomic I/O operations with file locking

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self as stdio, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::{Error, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Longest prefix of the target's file name kept in its temp file name.
const TEMP_STEM_LIMIT: usize = 32;

/// Tuning for lock acquisition and durability of writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// How long to keep retrying a contended lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync the temp file before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Copy `source` over `target` atomically.
///
/// The source is streamed under a shared advisory lock, so a writer holding
/// an exclusive lock on it makes the copy fail with [`Error::LockFailed`]
/// once `lock_timeout` elapses. The target's parent directory must already
/// exist. Returns the number of bytes copied.
pub fn copy_atomic(source: &Path, target: &Path, config: RobustnessConfig) -> Result<u64> {
    let source_file = File::open(source).map_err(|e| Error::io(source, e))?;
    acquire_shared(&source_file, source, config.lock_timeout)?;

    let mut copied = 0;
    let result = replace_via_temp(target, config, |temp| {
        let mut reader = BufReader::new(&source_file);
        copied = stdio::copy(&mut reader, temp)?;
        Ok(())
    });

    let _ = FileExt::unlock(&source_file);
    result.map(|()| copied)
}

/// Returns true if `dir` has no entries.
pub fn is_dir_empty(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    Ok(entries.next().is_none())
}

/// Temp file next to `target`, with a name of bounded length however long
/// the target's name is.
fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let mut end = name.len().min(TEMP_STEM_LIMIT);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let temp_name = format!(
        ".{}.{}.{}.tmp",
        &name[..end],
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    target.with_file_name(temp_name)
}

fn replace_via_temp<F>(target: &Path, config: RobustnessConfig, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> stdio::Result<()>,
{
    // Temp file lives in the target directory so the rename stays on one filesystem
    let temp_path = temp_path_for(target);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = (|| -> Result<()> {
        FileExt::lock_exclusive(&temp_file).map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;
        fill(&mut temp_file).map_err(|e| Error::io(&temp_path, e))?;
        temp_file.flush().map_err(|e| Error::io(&temp_path, e))?;
        if config.enable_fsync {
            temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;
        }
        let _ = FileExt::unlock(&temp_file);
        Ok(())
    })();

    drop(temp_file);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, target).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(target, e)
    })
}

fn acquire_shared(file: &File, path: &Path, timeout: Duration) -> Result<()> {
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(10))
        .with_max_interval(Duration::from_millis(250))
        .with_max_elapsed_time(Some(timeout))
        .build();

    backoff::retry(policy, || {
        FileExt::try_lock_shared(file).map_err(backoff::Error::transient)
    })
    .map_err(|_| {
        tracing::debug!(path = %path.display(), "shared lock not acquired before timeout");
        Error::LockFailed {
            path: path.to_path_buf(),
        }
    })
}
