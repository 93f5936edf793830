//! Property tests: any pair of trees converges in one run, and a second
//! run finds nothing to do.

use std::collections::{BTreeMap, BTreeSet};

use mirror_core::{SyncConfig, Synchronizer};
use mirror_test_utils::TreeFixture;
use proptest::prelude::*;

// Directory and file names never overlap, so no path is both a file and a
// directory within one tree
fn dir_path() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["d1", "d2", "d3"]), 0..3)
        .prop_map(|segments| segments.join("/"))
}

fn file_path() -> impl Strategy<Value = String> {
    (dir_path(), prop::sample::select(vec!["f1.txt", "f2.txt", "f3.bin"])).prop_map(
        |(dir, name)| {
            if dir.is_empty() {
                name.to_string()
            } else {
                format!("{dir}/{name}")
            }
        },
    )
}

fn tree() -> impl Strategy<Value = (BTreeMap<String, Vec<u8>>, BTreeSet<String>)> {
    (
        prop::collection::btree_map(
            file_path(),
            prop::collection::vec(any::<u8>(), 0..64),
            0..8,
        ),
        prop::collection::btree_set(
            dir_path().prop_filter("non-empty", |d| !d.is_empty()),
            0..3,
        ),
    )
}

fn populate(
    fixture: &TreeFixture,
    source: bool,
    files: &BTreeMap<String, Vec<u8>>,
    dirs: &BTreeSet<String>,
) {
    for dir in dirs {
        if source {
            fixture.mkdir_source(dir);
        } else {
            fixture.mkdir_replica(dir);
        }
    }
    for (path, content) in files {
        if source {
            fixture.write_source(path, content);
        } else {
            fixture.write_replica(path, content);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_run_converges_and_second_is_a_no_op(
        (source_files, source_dirs) in tree(),
        (replica_files, replica_dirs) in tree(),
    ) {
        let fixture = TreeFixture::new();
        populate(&fixture, true, &source_files, &source_dirs);
        populate(&fixture, false, &replica_files, &replica_dirs);

        let sync = Synchronizer::new(SyncConfig::new(fixture.source(), fixture.replica())).unwrap();
        let first = sync.synchronize().unwrap();
        prop_assert!(first.is_clean(), "events: {:?}", first.events);
        fixture.assert_mirrored();

        let second = sync.synchronize().unwrap();
        prop_assert_eq!(second.action_count(), 0);
    }
}
