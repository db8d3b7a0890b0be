use std::path::Path;

use rstest::rstest;
use sync_fs::NormalizedPath;

#[rstest]
#[case("foo/bar/baz", "foo/bar/baz")]
#[case("foo\\bar\\baz", "foo/bar/baz")]
#[case("foo/bar\\baz", "foo/bar/baz")]
#[case("./folder/a.txt", "folder/a.txt")]
#[case("folder//a.txt", "folder/a.txt")]
#[case("folder/", "folder")]
#[case("", "")]
fn test_normalization(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[test]
fn test_join_paths() {
    let base = NormalizedPath::new("foo/bar");
    assert_eq!(base.join("baz").as_str(), "foo/bar/baz");
}

#[test]
fn test_join_from_root() {
    let joined = NormalizedPath::root().join("a.txt");
    assert_eq!(joined.as_str(), "a.txt");
}

#[test]
fn test_parent() {
    let path = NormalizedPath::new("foo/bar/baz");
    assert_eq!(path.parent().unwrap().as_str(), "foo/bar");
}

#[test]
fn test_file_name() {
    let path = NormalizedPath::new("foo/bar/baz.txt");
    assert_eq!(path.file_name(), Some("baz.txt"));
    assert_eq!(NormalizedPath::root().file_name(), None);
}

#[test]
fn test_relative_to_root() {
    let rel = NormalizedPath::relative_to(
        Path::new("/repo/folder/a.txt"),
        Path::new("/repo"),
    )
    .unwrap();
    assert_eq!(rel.as_str(), "folder/a.txt");
    assert_eq!(rel.file_name(), Some("a.txt"));
}

#[test]
fn test_ordering_is_bytewise() {
    let mut paths = vec![
        NormalizedPath::new("b"),
        NormalizedPath::new("B"),
        NormalizedPath::new("a.txt"),
    ];
    paths.sort();
    let names: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
    assert_eq!(names, vec!["B", "a.txt", "b"]);
}
