//! Tests for applying sync plans to a replica

use std::fs;

use mirror_core::{ContentComparator, EventKind, LogEvent, SyncPlan, apply, compare};
use mirror_fs::{CaseSensitivity, RobustnessConfig};
use mirror_test_utils::TreeFixture;
use pretty_assertions::assert_eq;

fn plan_for(fixture: &TreeFixture) -> SyncPlan {
    compare(
        fixture.source(),
        fixture.replica(),
        &ContentComparator::default(),
        CaseSensitivity::Insensitive,
    )
    .unwrap()
}

fn run(fixture: &TreeFixture, plan: &SyncPlan) -> Vec<LogEvent> {
    apply(
        plan,
        fixture.source(),
        fixture.replica(),
        RobustnessConfig::default(),
    )
}

fn kinds(events: &[LogEvent]) -> Vec<EventKind> {
    events.iter().map(LogEvent::kind).collect()
}

fn target_ends_with(event: &LogEvent, suffix: &str) -> bool {
    event.target().is_some_and(|p| p.ends_with(suffix))
}

#[test]
fn test_initial_copy_creates_dirs_before_files() {
    let fixture = TreeFixture::new();
    fixture.write_source("f1.txt", "X");
    fixture.write_source("dir/f2.txt", "Y");

    let events = run(&fixture, &plan_for(&fixture));

    assert_eq!(
        kinds(&events),
        vec![EventKind::CreateDir, EventKind::CopyNew, EventKind::CopyNew]
    );
    assert!(target_ends_with(&events[0], "dir"));
    assert!(target_ends_with(&events[1], "dir/f2.txt"));
    assert!(target_ends_with(&events[2], "f1.txt"));
    assert_eq!(fixture.read_replica("f1.txt"), "X");
    assert_eq!(fixture.read_replica("dir/f2.txt"), "Y");
    fixture.assert_mirrored();
}

#[test]
fn test_transfer_events_carry_source_and_replica_paths() {
    let fixture = TreeFixture::new();
    fixture.write_source("a.txt", "new");
    fixture.write_replica("a.txt", "older");

    let events = run(&fixture, &plan_for(&fixture));

    assert_eq!(kinds(&events), vec![EventKind::UpdateModified]);
    let paths = events[0].paths();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].starts_with(fixture.source()));
    assert!(paths[1].starts_with(fixture.replica()));
    assert_eq!(fixture.read_replica("a.txt"), "new");
}

#[test]
fn test_extraneous_entries_are_removed_deepest_first() {
    let fixture = TreeFixture::new();
    fixture.write_replica("a/b/c/file.txt", "stale");
    fixture.write_replica("top.txt", "stale");

    let events = run(&fixture, &plan_for(&fixture));

    assert_eq!(
        kinds(&events),
        vec![
            EventKind::DeleteFile,
            EventKind::DeleteFile,
            EventKind::DeleteEmptyDir,
            EventKind::DeleteEmptyDir,
            EventKind::DeleteEmptyDir,
        ]
    );
    assert!(target_ends_with(&events[2], "a/b/c"));
    assert!(target_ends_with(&events[4], "a"));
    fixture.assert_mirrored();
}

#[test]
fn test_directory_filled_after_planning_is_not_deleted() {
    let fixture = TreeFixture::new();
    fixture.mkdir_replica("gone");
    let plan = plan_for(&fixture);
    assert_eq!(plan.to_delete_dirs.len(), 1);

    // A writer adds a child between planning and execution
    fixture.write_replica("gone/new.txt", "late");
    let events = run(&fixture, &plan);

    assert_eq!(kinds(&events), vec![EventKind::Warning]);
    assert_eq!(events[0].message(), Some("directory not empty, deletion skipped"));
    assert!(fixture.replica().join("gone/new.txt").exists());
}

#[test]
fn test_failed_operation_does_not_abort_the_run() {
    let fixture = TreeFixture::new();
    fixture.write_source("a.txt", "a");
    fixture.write_source("b.txt", "b");
    let plan = plan_for(&fixture);

    fixture.remove_source("a.txt");
    let events = run(&fixture, &plan);

    assert_eq!(kinds(&events), vec![EventKind::Error, EventKind::CopyNew]);
    assert!(target_ends_with(&events[0], "a.txt"));
    assert!(events[0].message().is_some());
    assert_eq!(fixture.read_replica("b.txt"), "b");
}

#[test]
fn test_sweep_removes_directories_emptied_outside_the_plan() {
    let fixture = TreeFixture::new();
    fixture.write_source("keep.txt", "k");
    let plan = plan_for(&fixture);

    fixture.mkdir_replica("late/x/y");
    let events = run(&fixture, &plan);

    let swept: Vec<_> = events
        .iter()
        .filter(|e| e.kind() == EventKind::DeleteEmptyDir)
        .collect();
    assert_eq!(swept.len(), 3);
    assert!(target_ends_with(swept[0], "late/x/y"));
    assert!(target_ends_with(swept[2], "late"));
    fixture.assert_mirrored();
}

#[test]
fn test_empty_source_directories_survive_the_sweep() {
    let fixture = TreeFixture::new();
    fixture.mkdir_source("keep/nested");
    fixture.mkdir_replica("keep/nested");

    let events = run(&fixture, &plan_for(&fixture));

    assert!(events.is_empty(), "unexpected events: {events:?}");
    assert!(fixture.replica().join("keep/nested").is_dir());
}

#[test]
fn test_missing_items_are_ignored() {
    let fixture = TreeFixture::new();
    fixture.write_replica("stale.txt", "x");
    fixture.mkdir_replica("stale-dir");
    let plan = plan_for(&fixture);

    fs::remove_file(fixture.replica().join("stale.txt")).unwrap();
    fs::remove_dir(fixture.replica().join("stale-dir")).unwrap();
    let events = run(&fixture, &plan);

    assert!(events.is_empty(), "unexpected events: {events:?}");
}

#[cfg(unix)]
#[test]
fn test_replica_symlink_is_replaced_by_regular_file() {
    let fixture = TreeFixture::new();
    fixture.write_source("link", "data");
    let outside = fixture.root().join("outside.txt");
    fs::write(&outside, "data").unwrap();
    std::os::unix::fs::symlink(&outside, fixture.replica().join("link")).unwrap();

    let events = run(&fixture, &plan_for(&fixture));

    assert_eq!(kinds(&events), vec![EventKind::UpdateModified]);
    let metadata = fs::symlink_metadata(fixture.replica().join("link")).unwrap();
    assert!(metadata.file_type().is_file());
    assert_eq!(fs::read_to_string(&outside).unwrap(), "data");
}
