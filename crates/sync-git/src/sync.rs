//! Three-way synchronization of a working tree against two revisions
//!
//! The working tree is the local side, the configured `source` revision
//! (normally `HEAD`) is the base and the `target` revision is the remote.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use sync_core::{
    CancellationToken, Classifier, DiffBuilder, DiffKind, DiffNode, Revision, ScanOutcome,
    SkippedEntry, SyncStatus, SyncTriple, Variant, VariantComparator, WorkingTreeScanner,
};
use sync_fs::NormalizedPath;
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::history::{self, CommitInfo};
use crate::repository::{open, resolve_commit};
use crate::snapshot::RevisionSnapshot;
use crate::store::{GitBlobHasher, GitStore};
use crate::{Error, Result};

/// Classification of one path with the variants it was decided from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub path: NormalizedPath,
    pub status: SyncStatus,
    pub local: Option<Variant>,
    pub base: Option<Variant>,
    pub remote: Option<Variant>,
    /// Last commit touching the path on the base revision
    pub base_change: Option<CommitInfo>,
    /// Last commit touching the path on the remote revision
    pub remote_change: Option<CommitInfo>,
}

/// Every path that is not in sync, plus entries the scan could not read.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PendingReport {
    pub entries: Vec<StatusReport>,
    pub skipped: Vec<SkippedEntry>,
}

impl PendingReport {
    pub fn conflicts(&self) -> impl Iterator<Item = &StatusReport> {
        self.entries.iter().filter(|entry| entry.status.is_conflict())
    }
}

/// Wires a repository, its settings and the engine together.
pub struct Synchronizer {
    store: GitStore,
    config: SyncConfig,
    cancel: Option<CancellationToken>,
}

impl Synchronizer {
    /// Open the repository enclosing `path` with the settings found at its root.
    pub fn open(path: &Path) -> Result<Self> {
        let (_, workdir) = open(path)?;
        let config = SyncConfig::load(&workdir)?;
        Self::with_config(path, config)
    }

    pub fn with_config(path: &Path, config: SyncConfig) -> Result<Self> {
        let store = GitStore::open(path, &config)?;
        Ok(Self {
            store,
            config,
            cancel: None,
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &GitStore {
        &self.store
    }

    /// Resolve the local, base and remote variants of `path`.
    ///
    /// A path that is a folder on either revision is looked up as a folder
    /// locally, so a deleted folder comes back as a not-existing tree.
    pub fn triple(&self, path: &NormalizedPath) -> Result<SyncTriple> {
        let base = self.store.variant(path, &self.config.source_revision())?;
        let remote = self.store.variant(path, &self.config.target_revision()?)?;
        let folder = path.is_root()
            || base.as_ref().is_some_and(Variant::is_tree)
            || remote.as_ref().is_some_and(Variant::is_tree);
        let local = self.store.local_variant(path, folder)?;
        Ok(SyncTriple::new(local, base, remote))
    }

    /// Classify a single path.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingTarget`] when no target revision is configured
    /// - [`Error::RevisionNotFound`] when source or target do not resolve
    pub fn status(&self, path: &NormalizedPath) -> Result<StatusReport> {
        let triple = self.triple(path)?;
        let status = self.classifier().classify(&triple)?;
        let target = self.config.target_revision()?;

        let base_change = self.last_change(path, &self.config.source)?;
        let remote_change = match &target {
            Revision::Named(spec) => self.last_change(path, spec)?,
            _ => None,
        };

        let SyncTriple {
            local,
            base,
            remote,
        } = triple;
        Ok(StatusReport {
            path: path.clone(),
            status,
            local,
            base,
            remote,
            base_change,
            remote_change,
        })
    }

    /// Classify every path changed locally or between base and remote,
    /// keeping the ones that are not in sync.
    pub fn pending(&self) -> Result<PendingReport> {
        let outcome = self.scan()?;
        let mut paths: BTreeSet<NormalizedPath> = outcome.changes.into_keys().collect();

        let target = self.config.target_revision()?;
        match self.diff(&NormalizedPath::root(), &self.config.source_revision(), &target) {
            Ok(tree) => tree.walk(|_, node| {
                if node.children.is_empty()
                    && let Some(path) = node.path()
                {
                    paths.insert(path.clone());
                }
            }),
            Err(Error::PathNotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let mut entries = Vec::new();
        for path in &paths {
            if let Some(token) = &self.cancel {
                token.check()?;
            }
            let report = self.status(path)?;
            if !report.status.is_in_sync() {
                entries.push(report);
            }
        }
        info!(
            candidates = paths.len(),
            pending = entries.len(),
            "Collected pending paths"
        );
        Ok(PendingReport {
            entries,
            skipped: outcome.skipped,
        })
    }

    /// Diff `path` between two revisions.
    ///
    /// When only one side has the path, the result is that side expanded as
    /// additions (left) or deletions (right).
    ///
    /// # Errors
    ///
    /// [`Error::PathNotFound`] when neither revision has the path.
    pub fn diff(&self, path: &NormalizedPath, left: &Revision, right: &Revision) -> Result<DiffNode> {
        let builder = self.diff_builder();
        let node = match (self.store.variant(path, left)?, self.store.variant(path, right)?) {
            (Some(l), Some(r)) => builder.diff(&l, &r)?,
            (Some(l), None) => builder.expand(&l, DiffKind::Addition)?,
            (None, Some(r)) => builder.expand(&r, DiffKind::Deletion)?,
            (None, None) => {
                return Err(Error::PathNotFound {
                    path: path.to_string(),
                    left: left.to_string(),
                    right: right.to_string(),
                });
            }
        };
        debug!(path = %path, %left, %right, differences = node.len(), "Diffed revisions");
        Ok(node)
    }

    /// Scan the working tree against the source revision.
    pub fn scan(&self) -> Result<ScanOutcome> {
        let hasher = GitBlobHasher;
        let ignore = self.store.ignore_rules();
        let reference = RevisionSnapshot::new(self.store.repo(), &self.config.source);

        let mut scanner = WorkingTreeScanner::new(self.store.workdir(), &hasher).with_ignore(&ignore);
        if let Some(token) = &self.cancel {
            scanner = scanner.with_cancellation(token.clone());
        }
        Ok(scanner.scan(&reference)?)
    }

    fn comparator(&self) -> VariantComparator<'_> {
        VariantComparator::new(&self.store).with_byte_compare(self.config.byte_compare)
    }

    fn classifier(&self) -> Classifier<'_> {
        Classifier::with_comparator(self.comparator())
    }

    fn diff_builder(&self) -> DiffBuilder<'_> {
        let builder = DiffBuilder::with_comparator(self.comparator());
        match &self.cancel {
            Some(token) => builder.with_cancellation(token.clone()),
            None => builder,
        }
    }

    fn last_change(&self, path: &NormalizedPath, spec: &str) -> Result<Option<CommitInfo>> {
        match resolve_commit(self.store.repo(), spec)? {
            Some(commit) => history::last_change(self.store.repo(), commit.id(), path),
            None => Ok(None),
        }
    }
}
