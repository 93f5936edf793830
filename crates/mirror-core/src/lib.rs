//! Synchronization engine for the one-way directory mirror
//!
//! This crate keeps a replica tree identical to a source tree:
//!
//! - **Comparison**: [`compare()`] enumerates both trees and builds a [`SyncPlan`]
//! - **Content equality**: [`ContentComparator`] checks sizes, then streaming digests
//! - **Execution**: [`apply()`] performs the plan and reports [`LogEvent`]s
//! - **Drivers**: [`Synchronizer`] serializes runs, [`Daemon`] schedules them
//!   on an interval and on [`ChangeNotifier`] signals
//!
//! # Architecture
//!
//! ```text
//!            mirror-cli
//!                |
//!             Daemon ---- ChangeNotifier
//!                |              |
//!          Synchronizer <- PendingChanges
//!           /        \
//!      compare      apply
//!           \        /
//!            mirror-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{EventKind, Result, synchronize};
//!
//! fn example() -> Result<()> {
//!     for event in synchronize("/data/source", "/backup/replica")? {
//!         if event.kind() == EventKind::Error {
//!             eprintln!("{event}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod config;
pub mod daemon;
pub mod error;
pub mod event;
pub mod execute;
pub mod pending;
pub mod plan;
pub mod scan;
pub mod synchronizer;
pub mod watch;

pub use compare::{ContentComparator, Fingerprinter, Sha256Fingerprinter, compare};
pub use config::SyncConfig;
pub use daemon::{Daemon, DaemonOptions, DaemonStats, Trigger};
pub use error::{Error, Result};
pub use event::{EventKind, EventLog, LogEvent};
pub use execute::apply;
pub use pending::{ChangeKind, PendingChanges};
pub use plan::{FileTransfer, SyncPlan};
pub use scan::{TreeInventory, TreeRole, scan_tree};
pub use synchronizer::{SyncReport, Synchronizer, synchronize};
pub use watch::ChangeNotifier;
