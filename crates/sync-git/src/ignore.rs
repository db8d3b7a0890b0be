//! Ignore rules evaluated by libgit2

use std::path::Path;

use git2::Repository;
use sync_core::IgnoreRules;
use sync_fs::NormalizedPath;

use crate::error::read_failure;

/// The repository's `.gitignore` hierarchy, `info/exclude` and global
/// excludes, as git itself evaluates them.
///
/// The rule file is named separately so a scan can always report it, even
/// when a pattern would match it.
pub struct RepoIgnore<'r> {
    repo: &'r Repository,
    rule_file: String,
}

impl<'r> RepoIgnore<'r> {
    pub fn new(repo: &'r Repository, rule_file: impl Into<String>) -> Self {
        Self {
            repo,
            rule_file: rule_file.into(),
        }
    }
}

impl IgnoreRules for RepoIgnore<'_> {
    fn is_ignored(&self, path: &NormalizedPath, is_dir: bool) -> sync_core::Result<bool> {
        if path.is_root() {
            return Ok(false);
        }
        // Directory-only patterns (`build/`) need the trailing slash to match
        let mut rel = path.as_str().to_string();
        if is_dir {
            rel.push('/');
        }
        self.repo
            .is_path_ignored(Path::new(&rel))
            .map_err(|e| read_failure(path.as_str(), e))
    }

    fn is_rule_file(&self, path: &NormalizedPath) -> bool {
        path.file_name() == Some(self.rule_file.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_test_utils::GitFixture;

    #[test]
    fn test_gitignore_patterns_apply() {
        let fixture = GitFixture::new();
        fixture
            .write(".gitignore", "*.log\nbuild/\n")
            .write("build/out.bin", "x");
        let rules = RepoIgnore::new(fixture.repo(), ".gitignore");

        assert!(rules.is_ignored(&NormalizedPath::new("debug.log"), false).unwrap());
        assert!(rules.is_ignored(&NormalizedPath::new("build"), true).unwrap());
        assert!(!rules.is_ignored(&NormalizedPath::new("main.rs"), false).unwrap());
    }

    #[test]
    fn test_rule_file_is_matched_by_name_at_any_depth() {
        let fixture = GitFixture::new();
        let rules = RepoIgnore::new(fixture.repo(), ".gitignore");

        assert!(rules.is_rule_file(&NormalizedPath::new(".gitignore")));
        assert!(rules.is_rule_file(&NormalizedPath::new("docs/.gitignore")));
        assert!(!rules.is_rule_file(&NormalizedPath::new(".gitignore.bak")));
    }
}
