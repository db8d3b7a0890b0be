//! Path-limited commit history: the ancestry of a variant

use chrono::{DateTime, TimeZone, Utc};
use git2::{Commit, Oid, Repository, Sort};
use serde::Serialize;
use sync_core::CommitId;
use sync_fs::NormalizedPath;

use crate::Result;

/// Information about a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// Full commit id
    pub id: String,

    /// Short commit hash (7 characters)
    pub hash: String,

    /// First line of the commit message
    pub message: String,

    /// Commit author name
    pub author: String,

    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    pub fn from_commit(commit: &Commit<'_>) -> Self {
        let timestamp: DateTime<Utc> = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_default();

        let message = commit
            .message()
            .unwrap_or("")
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        let author = commit.author();
        let author_name = author.name().unwrap_or("Unknown").to_string();

        Self {
            id: commit.id().to_string(),
            hash: format!("{:.7}", commit.id()),
            message,
            author: author_name,
            timestamp,
        }
    }
}

/// Commits reachable from `start` that changed `path`, newest first.
///
/// A commit changed the path when the entry it records differs from every
/// parent's (a merge that kept one side's version is skipped). Collection
/// stops after `limit` commits.
pub fn path_history<'r>(
    repo: &'r Repository,
    start: Oid,
    path: &NormalizedPath,
    limit: usize,
) -> Result<Vec<Commit<'r>>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push(start)?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

    let mut commits = Vec::new();
    for oid_result in revwalk {
        if commits.len() >= limit {
            break;
        }
        let commit = repo.find_commit(oid_result?)?;
        let entry = entry_id(&commit, path)?;

        let touched = if commit.parent_count() == 0 {
            entry.is_some()
        } else {
            let mut differs_from_all = true;
            for parent in commit.parents() {
                if entry_id(&parent, path)? == entry {
                    differs_from_all = false;
                    break;
                }
            }
            differs_from_all
        };

        if touched {
            commits.push(commit);
        }
    }
    Ok(commits)
}

/// Ancestry of a path: commit ids newest first, capped at a limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestry {
    pub commits: Vec<CommitId>,
    /// More commits touching the path exist beyond `commits`
    pub truncated: bool,
}

/// Ancestry of `path` as of `start`.
///
/// One commit past `limit` is looked up so a capped history can be told
/// apart from one that ends exactly at the cap.
pub fn ancestry(
    repo: &Repository,
    start: Oid,
    path: &NormalizedPath,
    limit: usize,
) -> Result<Ancestry> {
    let mut commits: Vec<CommitId> = path_history(repo, start, path, limit.saturating_add(1))?
        .iter()
        .map(|c| CommitId::new(c.id().to_string()))
        .collect();
    let truncated = commits.len() > limit;
    commits.truncate(limit);
    Ok(Ancestry { commits, truncated })
}

/// The commit that last changed `path` as of `start`.
pub fn last_change(
    repo: &Repository,
    start: Oid,
    path: &NormalizedPath,
) -> Result<Option<CommitInfo>> {
    Ok(path_history(repo, start, path, 1)?
        .first()
        .map(CommitInfo::from_commit))
}

fn entry_id(commit: &Commit<'_>, path: &NormalizedPath) -> Result<Option<Oid>> {
    let tree = commit.tree()?;
    if path.is_root() {
        return Ok(Some(tree.id()));
    }
    match tree.get_path(path.as_ref()) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_test_utils::GitFixture;

    #[test]
    fn test_history_only_counts_commits_touching_the_path() {
        let fixture = GitFixture::new();
        fixture.write("a.txt", "1").write("b.txt", "1");
        let c1 = fixture.commit("add both");
        fixture.write("b.txt", "2");
        fixture.commit("edit b");
        fixture.write("a.txt", "2");
        let c3 = fixture.commit("edit a");

        let history = ancestry(fixture.repo(), c3, &NormalizedPath::new("a.txt"), 16).unwrap();
        assert!(!history.truncated);
        assert_eq!(
            history.commits,
            vec![
                CommitId::new(c3.to_string()),
                CommitId::new(c1.to_string())
            ]
        );
    }

    #[test]
    fn test_history_respects_the_limit() {
        let fixture = GitFixture::new();
        for i in 0..5 {
            fixture.write("a.txt", &i.to_string());
            fixture.commit(&format!("edit {i}"));
        }
        let head = fixture.repo().head().unwrap().target().unwrap();
        let history = ancestry(fixture.repo(), head, &NormalizedPath::new("a.txt"), 3).unwrap();
        assert_eq!(history.commits.len(), 3);
        assert!(history.truncated);
    }

    #[test]
    fn test_history_ending_at_the_limit_is_not_truncated() {
        let fixture = GitFixture::new();
        for i in 0..3 {
            fixture.write("a.txt", &i.to_string());
            fixture.commit(&format!("edit {i}"));
        }
        let head = fixture.repo().head().unwrap().target().unwrap();
        let history = ancestry(fixture.repo(), head, &NormalizedPath::new("a.txt"), 3).unwrap();
        assert_eq!(history.commits.len(), 3);
        assert!(!history.truncated);
    }

    #[test]
    fn test_last_change_describes_the_commit() {
        let fixture = GitFixture::new();
        fixture.write("a.txt", "1");
        let head = fixture.commit("Add a\n\nLonger body");

        let info = last_change(fixture.repo(), head, &NormalizedPath::new("a.txt"))
            .unwrap()
            .unwrap();
        assert_eq!(info.message, "Add a");
        assert_eq!(info.author, "Test User");
        assert_eq!(info.hash.len(), 7);
    }
}
