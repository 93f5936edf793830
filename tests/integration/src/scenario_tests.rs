//! End-to-end mirror scenarios
//!
//! Each test drives the public API the way a caller would: build a tree,
//! run, change it, run again, and check that the replica converged.

use std::sync::Arc;
use std::time::Duration;

use mirror_core::{Daemon, DaemonOptions, EventKind, SyncConfig, Synchronizer, synchronize};
use mirror_test_utils::{TreeFixture, file_inventory};
use pretty_assertions::assert_eq;

fn synchronizer(fixture: &TreeFixture) -> Synchronizer {
    Synchronizer::new(SyncConfig::new(fixture.source(), fixture.replica())).unwrap()
}

#[test]
fn test_first_copy_into_empty_replica() {
    let fixture = TreeFixture::without_replica();
    fixture.write_source("f1.txt", "X");
    fixture.write_source("dir/f2.txt", "Y");

    let events = synchronize(fixture.source(), fixture.replica()).unwrap();

    let count = |kind| events.iter().filter(|e| e.kind() == kind).count();
    assert_eq!(count(EventKind::CopyNew), 2);
    assert_eq!(count(EventKind::CreateDir), 1);
    assert_eq!(events.len(), 3);
    fixture.assert_mirrored();
}

#[test]
fn test_edits_between_runs_converge() {
    let fixture = TreeFixture::new();
    fixture.write_source("keep.txt", "unchanged");
    fixture.write_source("edit.txt", "v1");
    fixture.write_source("drop/me.txt", "bye");
    fixture.write_source("docs/readme.md", "# v1");
    let sync = synchronizer(&fixture);
    sync.synchronize().unwrap();

    fixture.write_source("edit.txt", "v2 with more bytes");
    fixture.write_source("docs/readme.md", "# v2");
    fixture.remove_source("drop");
    fixture.write_source("added/deep/file.bin", [0u8, 1, 2, 3]);
    let report = sync.synchronize().unwrap();

    assert!(report.is_clean(), "events: {:?}", report.events);
    assert_eq!(report.count(EventKind::UpdateModified), 2);
    assert_eq!(report.count(EventKind::CopyNew), 1);
    assert_eq!(report.count(EventKind::CreateDir), 2);
    assert_eq!(report.count(EventKind::DeleteFile), 1);
    assert_eq!(report.count(EventKind::DeleteEmptyDir), 1);
    fixture.assert_mirrored();

    let third = sync.synchronize().unwrap();
    assert_eq!(third.action_count(), 0);
}

#[test]
fn test_replica_drift_is_repaired() {
    let fixture = TreeFixture::new();
    fixture.write_source("a.txt", "source truth");
    let sync = synchronizer(&fixture);
    sync.synchronize().unwrap();

    // Someone edits the replica directly
    fixture.write_replica("a.txt", "tampered!!!!");
    fixture.write_replica("intruder/x.txt", "x");
    sync.synchronize().unwrap();

    fixture.assert_mirrored();
    assert_eq!(fixture.read_replica("a.txt"), "source truth");
}

#[test]
fn test_case_only_rename_keeps_replica_spelling() {
    let fixture = TreeFixture::new();
    fixture.write_source("report.txt", "same");
    let sync = synchronizer(&fixture);
    sync.synchronize().unwrap();

    std::fs::rename(
        fixture.source().join("report.txt"),
        fixture.source().join("Report.txt"),
    )
    .unwrap();
    let report = sync.synchronize().unwrap();

    assert_eq!(report.action_count(), 0);
    let replica_files: Vec<_> = file_inventory(fixture.replica()).into_keys().collect();
    assert_eq!(replica_files, vec!["report.txt".to_string()]);
}

#[test]
fn test_type_change_converges_within_two_runs() {
    let fixture = TreeFixture::new();
    fixture.write_source("thing", "a file at first");
    let sync = synchronizer(&fixture);
    sync.synchronize().unwrap();

    fixture.remove_source("thing");
    fixture.write_source("thing/inside.txt", "now a directory");
    sync.synchronize().unwrap();
    sync.synchronize().unwrap();

    fixture.assert_mirrored();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interval_only_daemon_picks_up_changes() {
    let fixture = TreeFixture::new();
    fixture.write_source("first.txt", "1");
    let synchronizer = Arc::new(synchronizer(&fixture));
    let daemon = Daemon::new(
        Arc::clone(&synchronizer),
        DaemonOptions {
            interval: Duration::from_secs(1),
            watch: false,
            debounce: Duration::from_millis(50),
        },
    );
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(daemon.run(async {
        let _ = stop_rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(200)).await;
    fixture.write_source("second.txt", "2");
    let target = fixture.replica().join("second.txt");
    for _ in 0..100 {
        if target.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    stop_tx.send(()).unwrap();
    let stats = handle.await.unwrap().unwrap();

    assert!(target.exists());
    assert!(stats.runs >= 2);
    assert_eq!(stats.failed_runs, 0);
    fixture.assert_mirrored();
}
