//! CLI end-to-end tests that invoke the compiled `mirror` binary.

use assert_cmd::Command;
use mirror_test_utils::TreeFixture;
use predicates::prelude::*;

fn mirror() -> Command {
    let mut cmd = Command::cargo_bin("mirror").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("MIRROR_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_exits_zero() {
    mirror()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("once"));
}

#[test]
fn test_once_mirrors_the_tree() {
    let fixture = TreeFixture::new();
    fixture.write_source("f1.txt", "X");
    fixture.write_source("dir/f2.txt", "Y");
    fixture.write_replica("stale.txt", "old");

    mirror()
        .arg("once")
        .arg(fixture.source())
        .arg(fixture.replica())
        .assert()
        .success()
        .stdout(predicate::str::contains("copy-new"))
        .stdout(predicate::str::contains("delete-file"));

    fixture.assert_mirrored();
}

#[test]
fn test_once_dry_run_leaves_replica_untouched() {
    let fixture = TreeFixture::new();
    fixture.write_source("new.txt", "n");

    mirror()
        .arg("once")
        .arg(fixture.source())
        .arg(fixture.replica())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("copy-new new.txt"));

    assert!(!fixture.replica().join("new.txt").exists());
}

#[test]
fn test_once_dry_run_reports_up_to_date() {
    let fixture = TreeFixture::new();

    mirror()
        .args(["once", "--dry-run"])
        .arg(fixture.source())
        .arg(fixture.replica())
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn test_once_json_output_is_parseable() {
    let fixture = TreeFixture::new();
    fixture.write_source("a.txt", "a");

    let output = mirror()
        .arg("once")
        .arg(fixture.source())
        .arg(fixture.replica())
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["events"][0]["kind"], "copy-new");
}

#[test]
fn test_missing_source_exits_one() {
    let fixture = TreeFixture::new();

    mirror()
        .arg("once")
        .arg(fixture.root().join("missing"))
        .arg(fixture.replica())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_nested_replica_exits_one() {
    let fixture = TreeFixture::new();

    mirror()
        .arg("once")
        .arg(fixture.source())
        .arg(fixture.source().join("copy"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nested"));
}

#[test]
fn test_run_rejects_zero_interval() {
    let fixture = TreeFixture::new();

    mirror()
        .arg("run")
        .arg(fixture.source())
        .arg(fixture.replica())
        .arg(fixture.root().join("mirror.log"))
        .arg("0")
        .assert()
        .failure();
}

#[test]
fn test_run_fails_on_unwritable_log_path() {
    let fixture = TreeFixture::new();

    mirror()
        .arg("run")
        .arg(fixture.source())
        .arg(fixture.replica())
        .arg(fixture.root().join("no/such/dir/mirror.log"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("log file"));
}

#[test]
fn test_run_rejects_log_file_inside_source() {
    let fixture = TreeFixture::new();
    let log = fixture.source().join("mirror.log");

    mirror()
        .arg("run")
        .arg(fixture.source())
        .arg(fixture.replica())
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("inside the source"));

    assert!(!log.exists());
}

#[test]
fn test_run_precondition_failure_is_logged() {
    let fixture = TreeFixture::new();
    let log = fixture.root().join("mirror.log");

    mirror()
        .arg("run")
        .arg(fixture.root().join("missing"))
        .arg(fixture.replica())
        .arg(&log)
        .assert()
        .code(1);

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("cannot start mirror"), "log: {contents}");
}

#[test]
fn test_run_without_paths_or_config_fails() {
    mirror().arg("run").assert().failure();
}
