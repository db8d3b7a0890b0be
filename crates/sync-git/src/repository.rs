//! Repository discovery and revision resolution

use std::path::{Path, PathBuf};

use git2::{Commit, ErrorCode, Repository, Tree};
use tracing::debug;

use crate::{Error, Result};

/// Open the repository containing `path`, searching parent directories.
///
/// # Errors
///
/// - [`Error::NotARepository`] when no repository encloses `path`
/// - [`Error::BareRepository`] when the repository has no working tree
pub fn open(path: &Path) -> Result<(Repository, PathBuf)> {
    let repo = Repository::discover(path).map_err(|e| match e.code() {
        ErrorCode::NotFound => Error::NotARepository {
            path: path.to_path_buf(),
        },
        _ => Error::Git(e),
    })?;
    let workdir = repo
        .workdir()
        .map(sync_fs::io::canonical_root)
        .transpose()?
        .ok_or_else(|| Error::BareRepository {
            path: repo.path().to_path_buf(),
        })?;
    debug!(workdir = %workdir.display(), "Opened repository");
    Ok((repo, workdir))
}

/// Resolve a revspec to its commit.
///
/// `HEAD` of a repository without commits resolves to `None`: there is no
/// base yet, which is different from a revision that does not exist.
///
/// # Errors
///
/// [`Error::RevisionNotFound`] for any other unresolvable spec.
pub fn resolve_commit<'r>(repo: &'r Repository, spec: &str) -> Result<Option<Commit<'r>>> {
    match repo.revparse_single(spec) {
        Ok(object) => Ok(Some(object.peel_to_commit()?)),
        Err(err) if is_unborn(repo, spec) => {
            debug!(spec, error = %err, "Revision points to an unborn branch");
            Ok(None)
        }
        Err(err) if err.code() == ErrorCode::NotFound || err.code() == ErrorCode::InvalidSpec => {
            Err(Error::RevisionNotFound {
                spec: spec.to_string(),
            })
        }
        Err(err) => Err(Error::Git(err)),
    }
}

/// Root tree of a revision, `None` for an unborn `HEAD`.
pub fn resolve_tree<'r>(repo: &'r Repository, spec: &str) -> Result<Option<Tree<'r>>> {
    resolve_commit(repo, spec)?
        .map(|commit| commit.tree())
        .transpose()
        .map_err(Error::from)
}

fn is_unborn(repo: &Repository, spec: &str) -> bool {
    spec == "HEAD"
        && matches!(repo.head(), Err(e) if e.code() == ErrorCode::UnbornBranch)
}

/// Get the current branch name, or `None` if HEAD is detached or unborn.
pub fn current_branch(repo: &Repository) -> Result<Option<String>> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if head.is_branch() {
        Ok(head.shorthand().map(str::to_string))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_test_utils::GitFixture;

    #[test]
    fn test_unborn_head_has_no_commit() {
        let fixture = GitFixture::new();
        assert!(resolve_commit(fixture.repo(), "HEAD").unwrap().is_none());
        assert!(current_branch(fixture.repo()).unwrap().is_none());
    }

    #[test]
    fn test_unknown_revision_is_an_error() {
        let fixture = GitFixture::new();
        fixture.write("a.txt", "a");
        fixture.commit("first");

        let err = resolve_commit(fixture.repo(), "no-such-branch").unwrap_err();
        assert!(matches!(err, Error::RevisionNotFound { .. }));
    }

    #[test]
    fn test_open_finds_the_workdir_from_a_subfolder() {
        let fixture = GitFixture::new();
        fixture.write("nested/deep/a.txt", "a");

        let (_repo, workdir) = open(&fixture.abs("nested/deep")).unwrap();
        assert_eq!(workdir, sync_fs::io::canonical_root(fixture.path()).unwrap());
    }

    #[test]
    fn test_open_outside_a_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A repository may enclose the system temp dir on some hosts
        if Repository::discover(dir.path()).is_ok() {
            return;
        }
        assert!(matches!(open(dir.path()), Err(Error::NotARepository { .. })));
    }
}
