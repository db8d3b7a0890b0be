//! Committed snapshots used as scan references

use std::collections::BTreeMap;

use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};
use sync_core::{ContentId, ReferenceTree};
use sync_fs::NormalizedPath;
use tracing::debug;

use crate::error::read_failure;
use crate::repository::resolve_tree;

/// Every blob of a revision's tree with its object id.
///
/// An unborn `HEAD` is an empty snapshot, so a fresh repository reports
/// every file as added.
pub struct RevisionSnapshot<'r> {
    repo: &'r Repository,
    spec: String,
}

impl<'r> RevisionSnapshot<'r> {
    pub fn new(repo: &'r Repository, spec: impl Into<String>) -> Self {
        Self {
            repo,
            spec: spec.into(),
        }
    }
}

impl ReferenceTree for RevisionSnapshot<'_> {
    fn entries(&self) -> sync_core::Result<BTreeMap<NormalizedPath, ContentId>> {
        let tree = resolve_tree(self.repo, &self.spec)
            .map_err(|e| sync_core::Error::content_read(self.spec.as_str(), e))?;
        let Some(tree) = tree else {
            debug!(spec = %self.spec, "Unborn revision, empty snapshot");
            return Ok(BTreeMap::new());
        };

        let mut entries = BTreeMap::new();
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob)
                && let Some(name) = entry.name()
            {
                entries.insert(
                    NormalizedPath::new(format!("{dir}{name}")),
                    ContentId::new(entry.id().to_string()),
                );
            }
            TreeWalkResult::Ok
        })
        .map_err(|e| read_failure(&self.spec, e))?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sync_test_utils::GitFixture;

    #[test]
    fn test_lists_nested_blobs_with_full_paths() {
        let fixture = GitFixture::new();
        fixture.write("a.txt", "a").write("docs/guide/intro.md", "intro");
        fixture.commit("initial");

        let entries = RevisionSnapshot::new(fixture.repo(), "HEAD").entries().unwrap();
        let paths: Vec<&str> = entries.keys().map(NormalizedPath::as_str).collect();
        assert_eq!(paths, vec!["a.txt", "docs/guide/intro.md"]);
    }

    #[test]
    fn test_unborn_head_is_empty() {
        let fixture = GitFixture::new();
        let entries = RevisionSnapshot::new(fixture.repo(), "HEAD").entries().unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_unknown_revision_fails_to_list() {
        let fixture = GitFixture::new();
        fixture.write("a.txt", "a");
        fixture.commit("initial");

        let result = RevisionSnapshot::new(fixture.repo(), "nope").entries();
        assert!(matches!(result, Err(sync_core::Error::ContentRead { .. })));
    }
}
