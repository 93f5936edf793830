//! Change signals waiting for the next run

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Kind of filesystem change reported by a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
    Renamed,
    Other,
}

/// Thread-safe set of changed paths, keeping only the latest kind per path.
#[derive(Debug, Default)]
pub struct PendingChanges {
    inner: Mutex<BTreeMap<PathBuf, ChangeKind>>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, ChangeKind>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a change; a later signal for the same path replaces the earlier one.
    pub fn record(&self, path: impl Into<PathBuf>, kind: ChangeKind) {
        self.lock().insert(path.into(), kind);
    }

    /// Take every pending change, leaving the set empty.
    pub fn drain(&self) -> BTreeMap<PathBuf, ChangeKind> {
        std::mem::take(&mut *self.lock())
    }

    /// Put back changes taken by [`drain`](Self::drain) for a run that did
    /// not happen. Signals recorded since the drain take precedence.
    pub fn restore(&self, changes: BTreeMap<PathBuf, ChangeKind>) {
        let mut pending = self.lock();
        for (path, kind) in changes {
            pending.entry(path).or_insert(kind);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
