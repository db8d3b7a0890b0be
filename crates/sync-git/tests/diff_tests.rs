//! Diff trees between revisions of a real repository

use pretty_assertions::assert_eq;
use sync_core::{DiffKind, DiffNode, Revision};
use sync_fs::NormalizedPath;
use sync_git::{Error, SyncConfig, Synchronizer};
use sync_test_utils::GitFixture;

fn flatten(node: &DiffNode) -> Vec<(usize, String, DiffKind)> {
    let mut rows = Vec::new();
    node.walk(|depth, child| {
        rows.push((depth, child.name().to_string(), child.kind));
    });
    rows
}

fn open(fixture: &GitFixture) -> Synchronizer {
    Synchronizer::with_config(fixture.path(), SyncConfig::default()).unwrap()
}

/// main: `a.txt`, `lib/one.rs`, `lib/two.rs`; `remote` drops `a.txt`, edits
/// `lib/two.rs` and adds `lib/three.rs`.
fn diverged() -> GitFixture {
    let fixture = GitFixture::new();
    fixture
        .write("a.txt", "a")
        .write("lib/one.rs", "1")
        .write("lib/two.rs", "2");
    fixture.commit("initial");
    let main = fixture.current_branch();
    fixture.branch("remote").checkout("remote");
    fixture
        .remove("a.txt")
        .write("lib/two.rs", "2 edited")
        .write("lib/three.rs", "3");
    fixture.commit("remote work");
    fixture.checkout(&main);
    fixture
}

#[test]
fn test_head_against_branch_is_a_hierarchy() {
    let fixture = diverged();
    let sync = open(&fixture);

    let tree = sync
        .diff(&NormalizedPath::root(), &Revision::head(), &Revision::named("remote"))
        .unwrap();

    assert_eq!(tree.kind, DiffKind::Change);
    assert_eq!(
        flatten(&tree),
        vec![
            (0, "a.txt".to_string(), DiffKind::Addition),
            (0, "lib".to_string(), DiffKind::Change),
            (1, "three.rs".to_string(), DiffKind::Deletion),
            (1, "two.rs".to_string(), DiffKind::Change),
        ]
    );
}

#[test]
fn test_identical_revisions_produce_an_empty_tree() {
    let fixture = diverged();
    let sync = open(&fixture);

    let tree = sync
        .diff(&NormalizedPath::root(), &Revision::head(), &Revision::head())
        .unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_working_tree_against_head_descends_into_unchanged_folders() {
    let fixture = diverged();
    fixture.write("lib/one.rs", "1 edited").write("lib/new.rs", "new");
    let sync = open(&fixture);

    let tree = sync
        .diff(&NormalizedPath::root(), &Revision::WorkingTree, &Revision::head())
        .unwrap();
    assert_eq!(
        flatten(&tree),
        vec![
            (0, "lib".to_string(), DiffKind::Change),
            (1, "new.rs".to_string(), DiffKind::Addition),
            (1, "one.rs".to_string(), DiffKind::Change),
        ]
    );
}

#[test]
fn test_path_on_one_side_only_is_expanded() {
    let fixture = diverged();
    fixture.write("fresh/x.txt", "x").write("fresh/deep/y.txt", "y");
    let sync = open(&fixture);

    let tree = sync
        .diff(&NormalizedPath::new("fresh"), &Revision::WorkingTree, &Revision::head())
        .unwrap();
    assert_eq!(tree.kind, DiffKind::Addition);
    assert_eq!(tree.len(), 3);
    assert!(
        flatten(&tree)
            .iter()
            .all(|(_, _, kind)| *kind == DiffKind::Addition)
    );
}

#[test]
fn test_path_on_neither_side_is_an_error() {
    let fixture = diverged();
    let sync = open(&fixture);

    let err = sync
        .diff(&NormalizedPath::new("nowhere"), &Revision::head(), &Revision::named("remote"))
        .unwrap_err();
    assert!(matches!(err, Error::PathNotFound { .. }));
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn test_tracked_files_matching_ignore_rules_stay_in_the_working_tree() {
    let fixture = GitFixture::new();
    fixture
        .write("a.txt", "a")
        .write("keep.log", "kept")
        .write("build/kept.txt", "kept");
    fixture.commit("initial");
    fixture.write(".gitignore", "*.log\nbuild/\ntmp/\n");
    fixture.commit("ignore generated files");
    fixture.write("scratch.log", "untracked").write("tmp/x.txt", "untracked");
    let sync = open(&fixture);

    let tree = sync
        .diff(&NormalizedPath::root(), &Revision::WorkingTree, &Revision::head())
        .unwrap();

    assert!(tree.is_empty(), "unexpected differences: {:?}", flatten(&tree));
}

#[test]
fn test_edits_to_tracked_ignored_files_are_reported() {
    let fixture = GitFixture::new();
    fixture.write("keep.log", "kept");
    fixture.commit("initial");
    fixture.write(".gitignore", "*.log\n");
    fixture.commit("ignore logs");
    fixture.write("keep.log", "edited");
    let sync = open(&fixture);

    let tree = sync
        .diff(&NormalizedPath::root(), &Revision::WorkingTree, &Revision::head())
        .unwrap();

    assert_eq!(flatten(&tree), vec![(0, "keep.log".to_string(), DiffKind::Change)]);
}
