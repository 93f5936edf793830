//! Interval and change-driven scheduling of synchronization runs

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::Result;
use crate::config::SyncConfig;
use crate::event::EventKind;
use crate::synchronizer::{SyncReport, Synchronizer};
use crate::watch::ChangeNotifier;

/// Scheduling settings for a [`Daemon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonOptions {
    /// Time between scheduled runs
    pub interval: Duration,
    /// Whether to start a change notifier on the source tree
    pub watch: bool,
    /// Quiet period after a change signal before running
    pub debounce: Duration,
}

impl From<&SyncConfig> for DaemonOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            interval: config.interval(),
            watch: config.watch,
            debounce: config.debounce(),
        }
    }
}

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Interval,
    Change,
}

/// Totals over the lifetime of a daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonStats {
    pub runs: usize,
    pub failed_runs: usize,
    pub actions: usize,
    pub errors: usize,
}

impl DaemonStats {
    fn record(&mut self, report: &SyncReport) {
        self.runs += 1;
        self.actions += report.action_count();
        self.errors += report.count(EventKind::Error);
    }
}

/// Drives a [`Synchronizer`] from a fixed interval and, optionally, from
/// filesystem change notifications.
///
/// Runs execute on the blocking pool and are awaited before the next
/// trigger is considered, so at most one run is in flight.
#[derive(Debug)]
pub struct Daemon {
    synchronizer: Arc<Synchronizer>,
    options: DaemonOptions,
}

impl Daemon {
    pub fn new(synchronizer: Arc<Synchronizer>, options: DaemonOptions) -> Self {
        Self {
            synchronizer,
            options,
        }
    }

    /// Run immediately, then on every trigger until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Fails only if the change notifier cannot be started. Failed runs are
    /// logged and counted, and scheduling continues.
    pub async fn run<F>(self, shutdown: F) -> Result<DaemonStats>
    where
        F: Future<Output = ()>,
    {
        let (wake_tx, mut wake_rx) = mpsc::unbounded_channel();
        let _notifier = if self.options.watch {
            Some(ChangeNotifier::spawn(
                self.synchronizer.source(),
                Arc::clone(&self.synchronizer),
                wake_tx.clone(),
            )?)
        } else {
            None
        };

        // The first tick completes immediately, giving the initial run
        let mut ticker = tokio::time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut stats = DaemonStats::default();
        tracing::info!(
            source = %self.synchronizer.source().display(),
            replica = %self.synchronizer.replica().display(),
            interval_secs = self.options.interval.as_secs(),
            watch = self.options.watch,
            "mirror daemon started"
        );

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once(Trigger::Interval, &mut stats).await;
                }
                Some(()) = wake_rx.recv() => {
                    tokio::time::sleep(self.options.debounce).await;
                    while wake_rx.try_recv().is_ok() {}
                    if self.synchronizer.pending_changes() > 0 {
                        self.run_once(Trigger::Change, &mut stats).await;
                    }
                }
            }
        }

        drop(wake_tx);
        tracing::info!(runs = stats.runs, failed = stats.failed_runs, "mirror daemon stopped");
        Ok(stats)
    }

    async fn run_once(&self, trigger: Trigger, stats: &mut DaemonStats) {
        let synchronizer = Arc::clone(&self.synchronizer);
        match tokio::task::spawn_blocking(move || synchronizer.synchronize()).await {
            Ok(Ok(report)) => {
                stats.record(&report);
                tracing::info!(
                    ?trigger,
                    created = report.count(EventKind::CreateDir),
                    copied = report.count(EventKind::CopyNew),
                    updated = report.count(EventKind::UpdateModified),
                    deleted = report.count(EventKind::DeleteFile) + report.count(EventKind::DeleteEmptyDir),
                    warnings = report.count(EventKind::Warning),
                    errors = report.count(EventKind::Error),
                    changes = report.drained_changes,
                    "synchronization run complete"
                );
            }
            Ok(Err(err)) => {
                stats.failed_runs += 1;
                tracing::error!(?trigger, error = %err, "synchronization run failed");
            }
            Err(join_err) => {
                stats.failed_runs += 1;
                tracing::error!(?trigger, error = %join_err, "synchronization task aborted");
            }
        }
    }
}
