//! Throwaway git repositories for tests.
//!
//! Everything goes through `git2`, so tests do not need a `git` binary on the
//! path. Helpers panic on failure; they are only meant for test setup.

use std::fs;
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;

/// A repository in a temporary directory, removed on drop.
pub struct GitFixture {
    dir: TempDir,
    repo: Repository,
}

impl GitFixture {
    /// Initialise an empty repository with a configured identity.
    ///
    /// # Panics
    /// Panics if the temp dir or repository cannot be created.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("GitFixture: no temp dir: {e}"));
        let repo = Repository::init(dir.path()).unwrap_or_else(|e| {
            panic!(
                "GitFixture: failed to init repository at {}: {e}",
                dir.path().display()
            )
        });
        {
            let mut config = repo
                .config()
                .unwrap_or_else(|e| panic!("GitFixture: no config: {e}"));
            config
                .set_str("user.name", "Test User")
                .unwrap_or_else(|e| panic!("GitFixture: failed to set user.name: {e}"));
            config
                .set_str("user.email", "test@test.com")
                .unwrap_or_else(|e| panic!("GitFixture: failed to set user.email: {e}"));
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Absolute path of a repository-relative path.
    pub fn abs(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parent directories.
    ///
    /// # Panics
    /// Panics if the write fails.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.abs(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("GitFixture: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("GitFixture: failed to write {rel}: {e}"));
        self
    }

    /// Remove a file or a whole directory.
    ///
    /// # Panics
    /// Panics if nothing exists at `rel`.
    pub fn remove(&self, rel: &str) -> &Self {
        let path = self.abs(rel);
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.unwrap_or_else(|e| panic!("GitFixture: failed to remove {rel}: {e}"));
        self
    }

    /// Stage every change in the working tree without committing.
    ///
    /// # Panics
    /// Panics if the index cannot be updated.
    pub fn stage_all(&self) -> &Self {
        let mut index = self
            .repo
            .index()
            .unwrap_or_else(|e| panic!("GitFixture: no index: {e}"));
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap_or_else(|e| panic!("GitFixture: add_all failed: {e}"));
        index
            .update_all(["*"].iter(), None)
            .unwrap_or_else(|e| panic!("GitFixture: update_all failed: {e}"));
        index
            .write()
            .unwrap_or_else(|e| panic!("GitFixture: failed to write index: {e}"));
        self
    }

    /// Stage everything and commit on the current branch.
    ///
    /// # Panics
    /// Panics if any git operation fails.
    pub fn commit(&self, message: &str) -> Oid {
        self.stage_all();
        let mut index = self
            .repo
            .index()
            .unwrap_or_else(|e| panic!("GitFixture: no index: {e}"));
        let tree_id = index
            .write_tree()
            .unwrap_or_else(|e| panic!("GitFixture: write_tree failed: {e}"));
        let tree = self
            .repo
            .find_tree(tree_id)
            .unwrap_or_else(|e| panic!("GitFixture: tree vanished: {e}"));
        let sig = Signature::now("Test User", "test@test.com")
            .unwrap_or_else(|e| panic!("GitFixture: bad signature: {e}"));

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap_or_else(|e| panic!("GitFixture: commit '{message}' failed: {e}"))
    }

    /// Create a branch at HEAD.
    ///
    /// # Panics
    /// Panics if HEAD has no commit or the branch exists.
    pub fn branch(&self, name: &str) -> &Self {
        let head = self.head_commit();
        self.repo
            .branch(name, &head, false)
            .unwrap_or_else(|e| panic!("GitFixture: failed to create branch {name}: {e}"));
        self
    }

    /// Create a lightweight tag at HEAD.
    ///
    /// # Panics
    /// Panics if HEAD has no commit.
    pub fn tag(&self, name: &str) -> &Self {
        let head = self.head_commit();
        self.repo
            .reference(&format!("refs/tags/{name}"), head.id(), true, "fixture tag")
            .unwrap_or_else(|e| panic!("GitFixture: failed to tag {name}: {e}"));
        self
    }

    /// Switch HEAD to a branch and force the working tree to match it.
    ///
    /// # Panics
    /// Panics if the branch does not exist.
    pub fn checkout(&self, branch: &str) -> &Self {
        self.repo
            .set_head(&format!("refs/heads/{branch}"))
            .unwrap_or_else(|e| panic!("GitFixture: failed to switch to {branch}: {e}"));
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force().remove_untracked(true)))
            .unwrap_or_else(|e| panic!("GitFixture: checkout of {branch} failed: {e}"));
        self
    }

    /// Name of the branch HEAD points to (`master` or `main`, depending on
    /// the host's git defaults).
    pub fn current_branch(&self) -> String {
        let head = self
            .repo
            .head()
            .unwrap_or_else(|e| panic!("GitFixture: HEAD unreadable: {e}"));
        head.shorthand().unwrap_or("HEAD").to_string()
    }

    fn head_commit(&self) -> git2::Commit<'_> {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .unwrap_or_else(|e| panic!("GitFixture: HEAD has no commit: {e}"))
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}
