use mirror_fs::{CaseSensitivity, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::Path;

#[rstest]
#[case("foo/bar/baz", "foo/bar/baz")]
#[case("foo//bar/./baz/", "foo/bar/baz")]
#[case("./foo", "foo")]
#[case("/abs/path", "/abs/path")]
#[case("///abs", "/abs")]
fn normalizes_separators(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[cfg(windows)]
#[rstest]
#[case("foo\\bar\\baz", "foo/bar/baz")]
#[case("foo/bar\\baz", "foo/bar/baz")]
fn backslash_separates_on_windows(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[cfg(unix)]
#[test]
fn test_backslash_is_part_of_the_name_on_unix() {
    let path = NormalizedPath::new("dir/a\\b.txt");

    assert_eq!(path.as_str(), "dir/a\\b.txt");
    assert_eq!(path.depth(), 1);
    assert_eq!(path.file_name(), Some("a\\b.txt"));
    assert_ne!(path, NormalizedPath::new("dir/a/b.txt"));
    assert_eq!(
        path.resolve(Path::new("/replica")),
        Path::new("/replica/dir").join("a\\b.txt")
    );
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("foo/bar");
    assert_eq!(base.join("baz").as_str(), "foo/bar/baz");
    assert_eq!(base.join("").as_str(), "foo/bar");
    assert_eq!(NormalizedPath::new("").join("baz").as_str(), "baz");
}

#[test]
fn test_resolve_against_root() {
    let rel = NormalizedPath::new("dir/sub/file.txt");
    let resolved = rel.resolve(Path::new("/replica"));
    assert_eq!(resolved, Path::new("/replica").join("dir").join("sub").join("file.txt"));
}

#[test]
fn test_file_name_and_extension() {
    let path = NormalizedPath::new("a/b/c.txt");
    assert_eq!(path.file_name(), Some("c.txt"));
    assert_eq!(path.extension(), Some("txt"));
    assert_eq!(NormalizedPath::new("config.YML").extension(), Some("YML"));
}

#[test]
fn test_dotfile_has_no_extension() {
    assert_eq!(NormalizedPath::new("dir/.hidden").extension(), None);
}

#[test]
fn test_keys_by_case_mode() {
    let upper = NormalizedPath::new("Dir/File.TXT");
    let lower = NormalizedPath::new("dir/file.txt");
    assert_eq!(
        upper.key(CaseSensitivity::Insensitive),
        lower.key(CaseSensitivity::Insensitive)
    );
    assert_ne!(
        upper.key(CaseSensitivity::Sensitive),
        lower.key(CaseSensitivity::Sensitive)
    );
}

#[test]
fn test_ordering_is_lexicographic() {
    let mut paths = vec![
        NormalizedPath::new("b"),
        NormalizedPath::new("a/z"),
        NormalizedPath::new("a"),
    ];
    paths.sort();
    let names: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
    assert_eq!(names, vec!["a", "a/z", "b"]);
}

#[test]
fn test_case_sensitivity_default_is_insensitive() {
    assert_eq!(CaseSensitivity::default(), CaseSensitivity::Insensitive);
}
