//! Variant lookup and content access backed by a git repository

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, IndexEntry, ObjectType, Oid, Repository, Tree};
use sync_core::{
    BlobVariant, ContentId, IgnoreRules, Revision, TreeVariant, Variant, VariantStore,
};
use sync_fs::{MetaPath, NormalizedPath};
use tracing::{debug, warn};

use crate::config::SyncConfig;
use crate::error::read_failure;
use crate::history;
use crate::ignore::RepoIgnore;
use crate::repository::{open, resolve_commit};
use crate::Result;

/// Serves variants of a repository at the working tree, the index or any
/// named revision.
///
/// Lookups are deterministic for a `(path, revision)` pair as long as the
/// repository does not change underneath.
pub struct GitStore {
    repo: Repository,
    workdir: PathBuf,
    ancestry_limit: usize,
    ignore_file: String,
}

impl GitStore {
    /// Open the repository enclosing `path`.
    pub fn open(path: &Path, config: &SyncConfig) -> Result<Self> {
        let (repo, workdir) = open(path)?;
        Ok(Self {
            repo,
            workdir,
            ancestry_limit: config.ancestry_limit,
            ignore_file: config.ignore_file.clone(),
        })
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Ignore rules of this repository.
    pub fn ignore_rules(&self) -> RepoIgnore<'_> {
        RepoIgnore::new(&self.repo, &self.ignore_file)
    }

    /// Look up `path` at `revision`.
    ///
    /// Returns `None` when nothing exists there. A working-tree lookup of a
    /// missing folder also returns `None`; use [`GitStore::local_variant`] to
    /// get a not-existing folder handle instead.
    ///
    /// # Errors
    ///
    /// [`Error::RevisionNotFound`] for an unknown revspec.
    pub fn variant(&self, path: &NormalizedPath, revision: &Revision) -> Result<Option<Variant>> {
        match revision {
            Revision::WorkingTree => self.local_variant(path, false),
            Revision::Index => self.index_variant(path),
            Revision::Named(spec) => self.named_variant(path, spec),
        }
    }

    /// Resolve a working-tree resource.
    ///
    /// A file yields a blob carrying its git object id, a directory yields a
    /// tree. When nothing is on disk a requested folder still yields a tree
    /// handle with `exists == false`, while a file yields `None`.
    pub fn local_variant(&self, path: &NormalizedPath, folder: bool) -> Result<Option<Variant>> {
        let full = self.absolute(path);
        match fs::metadata(&full) {
            Ok(meta) if meta.is_dir() => Ok(Some(TreeVariant::new(path.clone()).into())),
            Ok(_) => {
                let id = Oid::hash_file(ObjectType::Blob, &full)?;
                Ok(Some(
                    BlobVariant::new(path.clone())
                        .with_content_id(id.to_string())
                        .into(),
                ))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Ok(folder.then(|| TreeVariant::new(path.clone()).missing().into()))
            }
            Err(e) => Err(sync_fs::Error::io(full, e).into()),
        }
    }

    fn named_variant(&self, path: &NormalizedPath, spec: &str) -> Result<Option<Variant>> {
        let Some(commit) = resolve_commit(&self.repo, spec)? else {
            return Ok(None);
        };
        let revision = Revision::named(spec);
        let root = commit.tree()?;

        if path.is_root() {
            return Ok(Some(
                TreeVariant::new(path.clone())
                    .at(revision)
                    .with_tree_id(root.id().to_string())
                    .into(),
            ));
        }

        let entry = match root.get_path(path.as_ref()) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match entry.kind() {
            Some(ObjectType::Blob) => {
                let ancestry =
                    history::ancestry(&self.repo, commit.id(), path, self.ancestry_limit)?;
                debug!(
                    path = %path,
                    spec,
                    depth = ancestry.commits.len(),
                    truncated = ancestry.truncated,
                    "Resolved blob ancestry"
                );
                Ok(Some(
                    BlobVariant::new(path.clone())
                        .at(revision)
                        .with_content_id(entry.id().to_string())
                        .with_ancestry(ancestry.commits)
                        .with_truncated_ancestry(ancestry.truncated)
                        .into(),
                ))
            }
            Some(ObjectType::Tree) => Ok(Some(
                TreeVariant::new(path.clone())
                    .at(revision)
                    .with_tree_id(entry.id().to_string())
                    .into(),
            )),
            other => {
                debug!(path = %path, kind = ?other, "Entry is neither blob nor tree");
                Ok(None)
            }
        }
    }

    fn index_variant(&self, path: &NormalizedPath) -> Result<Option<Variant>> {
        if path.is_root() {
            return Ok(Some(TreeVariant::new(path.clone()).at(Revision::Index).into()));
        }

        let index = self.repo.index()?;
        if let Some(entry) = index.get_path(path.as_ref(), 0) {
            return Ok(Some(
                BlobVariant::new(path.clone())
                    .at(Revision::Index)
                    .with_content_id(entry.id.to_string())
                    .into(),
            ));
        }

        let has_members = index.iter().any(|entry| entry_path(&entry).starts_with(path));
        Ok(has_members.then(|| TreeVariant::new(path.clone()).at(Revision::Index).into()))
    }

    fn absolute(&self, path: &NormalizedPath) -> PathBuf {
        if path.is_root() {
            self.workdir.clone()
        } else {
            self.workdir.join(path.to_native())
        }
    }

    fn named_tree(&self, spec: &str, path: &NormalizedPath) -> sync_core::Result<Tree<'_>> {
        let commit = resolve_commit(&self.repo, spec)
            .map_err(|e| sync_core::Error::content_read(path.as_str(), e))?
            .ok_or_else(|| {
                sync_core::Error::content_read(path.as_str(), format!("{spec} has no commits"))
            })?;
        let root = commit.tree().map_err(|e| read_failure(path.as_str(), e))?;
        if path.is_root() {
            return Ok(root);
        }
        root.get_path(path.as_ref())
            .and_then(|entry| entry.to_object(&self.repo))
            .and_then(|object| object.peel_to_tree())
            .map_err(|e| read_failure(path.as_str(), e))
    }

    fn working_members(&self, tree: &TreeVariant) -> sync_core::Result<Vec<Variant>> {
        let dir = self.absolute(&tree.path);
        let entries = fs::read_dir(&dir)
            .map_err(|e| sync_core::Error::from(sync_fs::Error::io(&dir, e)))?;
        let ignore = self.ignore_rules();
        let tracked = self.tracked_paths(&tree.path)?;

        let mut members = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| sync_core::Error::from(sync_fs::Error::io(&dir, e)))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(dir = %dir.display(), "Skipping non UTF-8 file name");
                continue;
            };
            if name == MetaPath::GitDir.as_str() {
                continue;
            }

            let path = tree.path.join(&name);
            let is_dir = entry
                .file_type()
                .map_err(|e| sync_core::Error::from(sync_fs::Error::io(entry.path(), e)))?
                .is_dir();
            // Ignore rules only hide untracked entries
            if !ignore.is_rule_file(&path)
                && ignore.is_ignored(&path, is_dir)?
                && !is_tracked(&tracked, &path, is_dir)
            {
                continue;
            }

            let variant: Variant = if is_dir {
                TreeVariant::new(path).into()
            } else {
                let id = Oid::hash_file(ObjectType::Blob, entry.path())
                    .map_err(|e| read_failure(path.as_str(), e))?;
                BlobVariant::new(path).with_content_id(id.to_string()).into()
            };
            members.insert(name, variant);
        }
        Ok(members.into_values().collect())
    }

    /// Paths in the index, limited to those under `dir`.
    fn tracked_paths(&self, dir: &NormalizedPath) -> sync_core::Result<BTreeSet<String>> {
        let index = self
            .repo
            .index()
            .map_err(|e| read_failure(dir.as_str(), e))?;
        Ok(index
            .iter()
            .map(|entry| entry_path(&entry))
            .filter(|path| dir.is_root() || path.starts_with(dir))
            .map(|path| path.as_str().to_string())
            .collect())
    }

    fn named_members(&self, tree: &TreeVariant, spec: &str) -> sync_core::Result<Vec<Variant>> {
        let git_tree = self.named_tree(spec, &tree.path)?;
        let revision = Revision::named(spec);

        // git orders tree entries with an implied trailing '/' on folders;
        // members must come back in plain byte order of their names
        let mut members = BTreeMap::new();
        for entry in git_tree.iter() {
            let Some(name) = entry.name() else {
                warn!(tree = %tree.path, "Skipping non UTF-8 entry name");
                continue;
            };
            let path = tree.path.join(name);
            let id = entry.id().to_string();
            let variant: Variant = match entry.kind() {
                Some(ObjectType::Blob) => BlobVariant::new(path)
                    .at(revision.clone())
                    .with_content_id(id)
                    .into(),
                Some(ObjectType::Tree) => TreeVariant::new(path)
                    .at(revision.clone())
                    .with_tree_id(id)
                    .into(),
                _ => continue,
            };
            members.insert(name.to_string(), variant);
        }
        Ok(members.into_values().collect())
    }

    fn index_members(&self, tree: &TreeVariant) -> sync_core::Result<Vec<Variant>> {
        let index = self
            .repo
            .index()
            .map_err(|e| read_failure(tree.path.as_str(), e))?;

        let mut members = BTreeMap::new();
        for entry in index.iter() {
            // Conflicted entries carry a non-zero stage; only the merged one counts
            if (entry.flags >> 12) & 0x3 != 0 {
                continue;
            }
            let full = entry_path(&entry);
            let rest = if tree.path.is_root() {
                full.as_str()
            } else if full.starts_with(&tree.path) {
                &full.as_str()[tree.path.as_str().len() + 1..]
            } else {
                continue;
            };

            let (name, variant): (String, Variant) = match rest.split_once('/') {
                Some((folder, _)) => (
                    folder.to_string(),
                    TreeVariant::new(tree.path.join(folder))
                        .at(Revision::Index)
                        .into(),
                ),
                None => (
                    rest.to_string(),
                    BlobVariant::new(full.clone())
                        .at(Revision::Index)
                        .with_content_id(entry.id.to_string())
                        .into(),
                ),
            };
            members.entry(name).or_insert(variant);
        }
        Ok(members.into_values().collect())
    }

    fn blob_bytes(&self, blob: &BlobVariant) -> sync_core::Result<Vec<u8>> {
        let path = blob.path.as_str();
        let oid = match (&blob.content_id, &blob.revision) {
            (_, Revision::WorkingTree) => {
                return Ok(sync_fs::io::read_bytes(&self.absolute(&blob.path))?);
            }
            (Some(id), _) => Oid::from_str(id.as_str()).map_err(|e| read_failure(path, e))?,
            (None, Revision::Index) => {
                let index = self.repo.index().map_err(|e| read_failure(path, e))?;
                index
                    .get_path(blob.path.as_ref(), 0)
                    .map(|entry| entry.id)
                    .ok_or_else(|| sync_core::Error::content_read(path, "not staged"))?
            }
            (None, Revision::Named(spec)) => {
                let parent = blob.path.parent().unwrap_or_default();
                let tree = self.named_tree(spec, &parent)?;
                let name = blob.path.file_name().unwrap_or_default();
                tree.get_name(name)
                    .map(|entry| entry.id())
                    .ok_or_else(|| sync_core::Error::content_read(path, format!("not in {spec}")))?
            }
        };
        let content = self
            .repo
            .find_blob(oid)
            .map_err(|e| read_failure(path, e))?
            .content()
            .to_vec();
        Ok(content)
    }
}

impl VariantStore for GitStore {
    fn read_content(&self, blob: &BlobVariant) -> sync_core::Result<Vec<u8>> {
        self.blob_bytes(blob)
    }

    fn members(&self, tree: &TreeVariant) -> sync_core::Result<Vec<Variant>> {
        match &tree.revision {
            Revision::WorkingTree => self.working_members(tree),
            Revision::Index => self.index_members(tree),
            Revision::Named(spec) => self.named_members(tree, spec),
        }
    }
}

/// Content ids for working-tree files, computed like `git hash-object`.
///
/// Pairs with snapshots whose ids are git blob ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitBlobHasher;

impl sync_core::ContentHasher for GitBlobHasher {
    fn hash_file(&self, path: &Path) -> sync_core::Result<ContentId> {
        Oid::hash_file(ObjectType::Blob, path)
            .map(|oid| ContentId::new(oid.to_string()))
            .map_err(|e| read_failure(&path.display().to_string(), e))
    }
}

fn is_tracked(tracked: &BTreeSet<String>, path: &NormalizedPath, is_dir: bool) -> bool {
    if !is_dir {
        return tracked.contains(path.as_str());
    }
    let prefix = format!("{path}/");
    tracked
        .range(prefix.clone()..)
        .next()
        .is_some_and(|p| p.starts_with(&prefix))
}

fn entry_path(entry: &IndexEntry) -> NormalizedPath {
    NormalizedPath::new(String::from_utf8_lossy(&entry.path).into_owned())
}
