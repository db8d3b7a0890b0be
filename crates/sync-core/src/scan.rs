//! Working-tree change scanning against a committed snapshot

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sync_fs::{MetaPath, NormalizedPath};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::cancel::{CancellationToken, checkpoint};
use crate::variant::ContentId;
use crate::{Error, Result};

/// How a path differs from the reference snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Addition,
    Deletion,
    Modification,
}

/// One changed leaf file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Full path relative to the tree root, e.g. `folder/a.txt`
    pub path: NormalizedPath,
    /// Final path segment, e.g. `a.txt`
    pub display_name: String,
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(path: impl Into<NormalizedPath>, kind: ChangeKind) -> Self {
        let path = path.into();
        Self {
            display_name: path.file_name().unwrap_or_default().to_string(),
            path,
            kind,
        }
    }
}

/// The last committed state of the tree.
pub trait ReferenceTree {
    /// Every blob in the snapshot with its content id.
    fn entries(&self) -> Result<BTreeMap<NormalizedPath, ContentId>>;
}

impl ReferenceTree for BTreeMap<NormalizedPath, ContentId> {
    fn entries(&self) -> Result<BTreeMap<NormalizedPath, ContentId>> {
        Ok(self.clone())
    }
}

/// Exclusion rules for the walk.
pub trait IgnoreRules {
    fn is_ignored(&self, path: &NormalizedPath, is_dir: bool) -> Result<bool>;

    /// The rule file itself is reported even when it matches its own rules.
    fn is_rule_file(&self, path: &NormalizedPath) -> bool;
}

/// Ignores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIgnore;

impl IgnoreRules for NoIgnore {
    fn is_ignored(&self, _path: &NormalizedPath, _is_dir: bool) -> Result<bool> {
        Ok(false)
    }

    fn is_rule_file(&self, _path: &NormalizedPath) -> bool {
        false
    }
}

/// Produces content ids for working-tree files.
///
/// Ids must be computed the same way as the reference tree's, otherwise every
/// committed file scans as modified.
pub trait ContentHasher {
    fn hash_file(&self, path: &Path) -> Result<ContentId>;
}

/// `sha256:<hex>` checksums of the raw bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn hash_file(&self, path: &Path) -> Result<ContentId> {
        let checksum = sync_fs::checksum::compute_file_checksum(path)?;
        Ok(ContentId::new(checksum))
    }
}

/// An entry the scan could not inspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub path: NormalizedPath,
    pub reason: String,
}

/// Changes keyed by path, plus the entries that could not be read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    pub changes: HashMap<NormalizedPath, Change>,
    pub skipped: Vec<SkippedEntry>,
}

impl ScanOutcome {
    pub fn get(&self, path: &str) -> Option<&Change> {
        self.changes.get(path)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes ordered by path.
    pub fn sorted(&self) -> Vec<&Change> {
        let mut changes: Vec<&Change> = self.changes.values().collect();
        changes.sort_by(|a, b| a.path.cmp(&b.path));
        changes
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.values().filter(|c| c.kind == kind).count()
    }

    fn record(&mut self, path: NormalizedPath, kind: ChangeKind) {
        self.changes.insert(path.clone(), Change::new(path, kind));
    }

    fn skip(&mut self, path: NormalizedPath, error: &Error) {
        warn!(path = %path, error = %error, "Skipping unreadable entry");
        self.skipped.push(SkippedEntry {
            path,
            reason: error.to_string(),
        });
    }
}

/// Walks a working tree and reports additions, deletions and modifications
/// relative to a [`ReferenceTree`].
pub struct WorkingTreeScanner<'a> {
    root: PathBuf,
    hasher: &'a dyn ContentHasher,
    ignore: &'a dyn IgnoreRules,
    cancel: Option<CancellationToken>,
}

impl<'a> WorkingTreeScanner<'a> {
    pub fn new(root: impl Into<PathBuf>, hasher: &'a dyn ContentHasher) -> Self {
        Self {
            root: root.into(),
            hasher,
            ignore: &NoIgnore,
            cancel: None,
        }
    }

    pub fn with_ignore(mut self, ignore: &'a dyn IgnoreRules) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the working tree.
    ///
    /// Unreadable entries are collected in [`ScanOutcome::skipped`] and the
    /// walk continues.
    ///
    /// Ignored directories are not descended. Committed rule files below one
    /// are still compared against the disk; rule files that were never
    /// committed there are not searched for.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] when the token fires between entries
    /// - [`Error::ContentRead`] when the reference snapshot cannot be listed
    pub fn scan(&self, reference: &dyn ReferenceTree) -> Result<ScanOutcome> {
        let mut committed = reference.entries()?;
        let mut outcome = ScanOutcome::default();

        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            checkpoint(self.cancel.as_ref())?;

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .and_then(|p| NormalizedPath::relative_to(p, &self.root).ok())
                        .unwrap_or_default();
                    let err = Error::content_read(self.root.display().to_string(), err);
                    outcome.skip(path, &err);
                    continue;
                }
            };
            let rel = match NormalizedPath::relative_to(entry.path(), &self.root) {
                Ok(rel) => rel,
                Err(err) => {
                    outcome.skip(NormalizedPath::new(entry.path()), &err.into());
                    continue;
                }
            };

            if entry.file_name().to_str() == Some(MetaPath::GitDir.as_str()) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_dir() {
                match self.ignore.is_ignored(&rel, true) {
                    Ok(true) => {
                        debug!(path = %rel, "Ignored directory not descended");
                        committed.retain(|path, _| {
                            !path.starts_with(&rel) || self.ignore.is_rule_file(path)
                        });
                        walker.skip_current_dir();
                    }
                    Ok(false) => {}
                    Err(err) => {
                        outcome.skip(rel, &err);
                        walker.skip_current_dir();
                    }
                }
                continue;
            }

            let reference_id = committed.remove(&rel);
            match self.is_excluded(&rel) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    outcome.skip(rel, &err);
                    continue;
                }
            }

            match reference_id {
                None => outcome.record(rel, ChangeKind::Addition),
                Some(expected) => self.compare(rel, entry.path(), &expected, &mut outcome),
            }
        }

        // Left over: deleted, or rule files kept below a skipped directory
        for (path, expected) in committed {
            checkpoint(self.cancel.as_ref())?;
            match self.is_excluded(&path) {
                Ok(true) => {}
                Ok(false) => {
                    let full = self.root.join(path.to_native());
                    if full.is_file() {
                        self.compare(path, &full, &expected, &mut outcome);
                    } else {
                        outcome.record(path, ChangeKind::Deletion);
                    }
                }
                Err(err) => outcome.skip(path, &err),
            }
        }

        debug!(
            root = %self.root.display(),
            changes = outcome.len(),
            skipped = outcome.skipped.len(),
            "Scanned working tree"
        );
        Ok(outcome)
    }

    fn compare(
        &self,
        rel: NormalizedPath,
        full: &Path,
        expected: &ContentId,
        outcome: &mut ScanOutcome,
    ) {
        match self.hasher.hash_file(full) {
            Ok(actual) if actual == *expected => {}
            Ok(_) => outcome.record(rel, ChangeKind::Modification),
            Err(err) => outcome.skip(rel, &err),
        }
    }

    fn is_excluded(&self, path: &NormalizedPath) -> Result<bool> {
        if self.ignore.is_rule_file(path) {
            return Ok(false);
        }
        self.ignore.is_ignored(path, false)
    }
}
