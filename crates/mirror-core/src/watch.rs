//! Filesystem change notifications feeding the pending-change set

use std::path::Path;
use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{EventKind as NotifyKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::Result;
use crate::pending::ChangeKind;
use crate::synchronizer::Synchronizer;

impl ChangeKind {
    /// Map a notify event kind; pure access events map to `None`.
    pub fn from_notify(kind: &NotifyKind) -> Option<Self> {
        match kind {
            NotifyKind::Access(_) => None,
            NotifyKind::Create(_) => Some(Self::Created),
            NotifyKind::Modify(ModifyKind::Name(_)) => Some(Self::Renamed),
            NotifyKind::Modify(_) => Some(Self::Modified),
            NotifyKind::Remove(_) => Some(Self::Removed),
            NotifyKind::Any | NotifyKind::Other => Some(Self::Other),
        }
    }
}

/// Watches a source tree and records every change on a [`Synchronizer`].
///
/// After recording, a unit wake signal is sent so the driver can schedule
/// a run. Watching stops when the notifier is dropped.
pub struct ChangeNotifier {
    _watcher: RecommendedWatcher,
}

impl ChangeNotifier {
    pub fn spawn(
        root: &Path,
        synchronizer: Arc<Synchronizer>,
        wake: mpsc::UnboundedSender<()>,
    ) -> Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let Some(kind) = ChangeKind::from_notify(&event.kind) else {
                        return;
                    };
                    for path in event.paths {
                        tracing::trace!(path = %path.display(), ?kind, "change notification");
                        synchronizer.record_change(path, kind);
                    }
                    let _ = wake.send(());
                }
                Err(err) => tracing::warn!(error = %err, "change notifier error"),
            }
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::info!(root = %root.display(), "watching for changes");
        Ok(Self { _watcher: watcher })
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, RemoveKind, RenameMode};

    #[test]
    fn maps_notify_kinds() {
        assert_eq!(
            ChangeKind::from_notify(&NotifyKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            ChangeKind::from_notify(&NotifyKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(ChangeKind::Renamed)
        );
        assert_eq!(
            ChangeKind::from_notify(&NotifyKind::Remove(RemoveKind::Folder)),
            Some(ChangeKind::Removed)
        );
        assert_eq!(
            ChangeKind::from_notify(&NotifyKind::Access(AccessKind::Read)),
            None
        );
    }
}
