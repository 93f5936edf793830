//! The run-at-a-time synchronization entry point
//!
//! A [`Synchronizer`] owns everything one mirror needs: validated roots,
//! the content comparator, the pending-change set and the run gate. Several
//! instances can coexist in one process.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use mirror_fs::path::is_within;
use serde::Serialize;

use crate::compare::{ContentComparator, Fingerprinter, compare};
use crate::config::SyncConfig;
use crate::event::{EventKind, LogEvent};
use crate::execute::apply;
use crate::pending::{ChangeKind, PendingChanges};
use crate::plan::SyncPlan;
use crate::{Error, Result};

/// Outcome of one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Change signals consumed by this run
    pub drained_changes: usize,
    /// Planning warnings followed by executor events, in order
    pub events: Vec<LogEvent>,
}

impl SyncReport {
    /// Number of events of the given kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Number of filesystem mutations performed.
    pub fn action_count(&self) -> usize {
        self.events.iter().filter(|e| e.kind().is_action()).count()
    }

    /// True when no operation failed.
    pub fn is_clean(&self) -> bool {
        self.count(EventKind::Error) == 0
    }
}

/// Validated, canonical tree roots.
#[derive(Debug, Clone)]
struct Roots {
    source: PathBuf,
    replica: PathBuf,
}

impl Roots {
    fn validate(source: &Path, replica: &Path) -> Result<Self> {
        let source = check_source(source)?;
        let replica = prepare_replica(replica)?;

        if is_within(&replica, &source) || is_within(&source, &replica) {
            return Err(Error::NestedTrees {
                source_root: source,
                replica_root: replica,
            });
        }

        Ok(Self { source, replica })
    }

    /// Re-check before each run that the trees are still usable.
    fn revalidate(&self) -> Result<()> {
        check_source(&self.source)?;
        prepare_replica(&self.replica)?;
        Ok(())
    }
}

fn check_source(source: &Path) -> Result<PathBuf> {
    if !source.exists() {
        return Err(Error::SourceNotFound {
            path: source.to_path_buf(),
        });
    }
    if !source.is_dir() {
        return Err(Error::SourceNotDirectory {
            path: source.to_path_buf(),
        });
    }
    dunce::canonicalize(source).map_err(|e| mirror_fs::Error::io(source, e).into())
}

fn prepare_replica(replica: &Path) -> Result<PathBuf> {
    if replica.exists() && !replica.is_dir() {
        return Err(Error::ReplicaNotDirectory {
            path: replica.to_path_buf(),
        });
    }
    let not_writable = |reason| Error::ReplicaNotWritable {
        path: replica.to_path_buf(),
        reason,
    };

    fs::create_dir_all(replica).map_err(not_writable)?;

    let write_check = replica.join(format!(".mirror-write-check-{}", std::process::id()));
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&write_check)
        .map_err(not_writable)?;
    fs::remove_file(&write_check).map_err(not_writable)?;

    dunce::canonicalize(replica).map_err(not_writable)
}

/// Mirrors one source tree onto one replica tree.
///
/// [`synchronize`](Self::synchronize) and [`plan`](Self::plan) hold the run
/// gate for their whole duration, so concurrent callers are serialized.
#[derive(Debug)]
pub struct Synchronizer {
    config: SyncConfig,
    roots: Roots,
    comparator: ContentComparator,
    gate: Mutex<()>,
    pending: PendingChanges,
}

impl Synchronizer {
    /// Validate the configuration and the trees it names.
    ///
    /// # Errors
    ///
    /// Fails if the source is missing or not a directory, if the replica
    /// cannot be created or written, or if one tree contains the other.
    pub fn new(config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let roots = Roots::validate(&config.source, &config.replica)?;
        tracing::debug!(
            source = %roots.source.display(),
            replica = %roots.replica.display(),
            case = ?config.case_sensitivity,
            "synchronizer ready"
        );
        Ok(Self {
            config,
            roots,
            comparator: ContentComparator::default(),
            gate: Mutex::new(()),
            pending: PendingChanges::new(),
        })
    }

    /// Replace the content fingerprinter.
    pub fn with_fingerprinter(mut self, fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        self.comparator = ContentComparator::new(fingerprinter);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Canonical source root.
    pub fn source(&self) -> &Path {
        &self.roots.source
    }

    /// Canonical replica root.
    pub fn replica(&self) -> &Path {
        &self.roots.replica
    }

    /// Record a change signal for the next run.
    pub fn record_change(&self, path: impl Into<PathBuf>, kind: ChangeKind) {
        self.pending.record(path, kind);
    }

    /// Number of distinct paths waiting for a run.
    pub fn pending_changes(&self) -> usize {
        self.pending.len()
    }

    /// Compute what a run would do, without touching the replica.
    pub fn plan(&self) -> Result<SyncPlan> {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        self.roots.revalidate()?;
        self.compare()
    }

    /// Run one full comparison and apply the result.
    ///
    /// Pending change signals are drained once the trees pass their
    /// precondition checks; signals that arrive while the run is in progress
    /// stay pending for the next run. A run that fails before planning
    /// completes leaves every signal pending.
    ///
    /// # Errors
    ///
    /// Only precondition failures are errors. Problems with individual
    /// entries are reported as events in the returned report.
    pub fn synchronize(&self) -> Result<SyncReport> {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        let started_at = Utc::now();
        self.roots.revalidate()?;
        let drained: BTreeMap<PathBuf, ChangeKind> = self.pending.drain();

        let plan = match self.compare() {
            Ok(plan) => plan,
            Err(err) => {
                self.pending.restore(drained);
                return Err(err);
            }
        };
        let mut events = plan.warnings.clone();
        events.extend(apply(
            &plan,
            &self.roots.source,
            &self.roots.replica,
            self.config.robustness(),
        ));

        let report = SyncReport {
            started_at,
            finished_at: Utc::now(),
            drained_changes: drained.len(),
            events,
        };
        tracing::debug!(
            actions = report.action_count(),
            errors = report.count(EventKind::Error),
            drained = report.drained_changes,
            "run finished"
        );
        Ok(report)
    }

    fn compare(&self) -> Result<SyncPlan> {
        compare(
            &self.roots.source,
            &self.roots.replica,
            &self.comparator,
            self.config.case_sensitivity,
        )
    }
}

/// Mirror `source` onto `replica` once with default settings.
///
/// Returns the ordered event stream of the run.
pub fn synchronize(source: impl AsRef<Path>, replica: impl AsRef<Path>) -> Result<Vec<LogEvent>> {
    let config = SyncConfig::new(source.as_ref(), replica.as_ref());
    let report = Synchronizer::new(config)?.synchronize()?;
    Ok(report.events)
}
