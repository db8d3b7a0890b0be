//! Resource variants: the state of a file or folder at one revision

use serde::Serialize;
use sync_fs::NormalizedPath;

/// Opaque content hash of a blob (a git object id, or a `sha256:` checksum).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentId(String);

/// Identifier of a commit in a variant's ancestry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CommitId(String);

/// Structural identity of a tree (e.g. a git tree object id).
///
/// This is not a content id: two trees with the same id list the same
/// members, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TreeId(String);

macro_rules! opaque_id {
    ($ty:ident) => {
        impl $ty {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(ContentId);
opaque_id!(CommitId);
opaque_id!(TreeId);

/// The revision a variant was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "spec")]
pub enum Revision {
    /// The live working tree
    #[default]
    WorkingTree,
    /// The staging snapshot
    Index,
    /// Any revspec: `HEAD`, a branch, a tag or a commit id
    Named(String),
}

impl Revision {
    pub fn named(spec: impl Into<String>) -> Self {
        Self::Named(spec.into())
    }

    pub fn head() -> Self {
        Self::Named("HEAD".to_string())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WorkingTree => f.write_str("working tree"),
            Self::Index => f.write_str("index"),
            Self::Named(spec) => f.write_str(spec),
        }
    }
}

/// A file at one revision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlobVariant {
    pub exists: bool,
    pub name: String,
    pub path: NormalizedPath,
    pub revision: Revision,
    /// Cheap equality key; byte comparison is used when either side lacks one
    pub content_id: Option<ContentId>,
    /// Commits from this state backward toward genesis; `None` when unknown
    pub ancestry: Option<Vec<CommitId>>,
    /// Set when `ancestry` was cut short and older commits exist beyond it
    pub ancestry_truncated: bool,
}

impl BlobVariant {
    /// An existing blob in the working tree with no recorded identity yet.
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        let path = path.into();
        Self {
            exists: true,
            name: path.file_name().unwrap_or_default().to_string(),
            path,
            revision: Revision::WorkingTree,
            content_id: None,
            ancestry: None,
            ancestry_truncated: false,
        }
    }

    pub fn at(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_content_id(mut self, id: impl Into<ContentId>) -> Self {
        self.content_id = Some(id.into());
        self
    }

    pub fn with_ancestry<I, C>(mut self, commits: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CommitId>,
    {
        self.ancestry = Some(commits.into_iter().map(Into::into).collect());
        self
    }

    /// Mark the recorded ancestry as a capped prefix of the full history.
    pub fn with_truncated_ancestry(mut self, truncated: bool) -> Self {
        self.ancestry_truncated = truncated;
        self
    }

    /// Mark the blob as referenced but not existing.
    pub fn missing(mut self) -> Self {
        self.exists = false;
        self
    }
}

/// Members of a tree, either already listed or fetched from a store on demand.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Members {
    /// Ask the [`VariantStore`](crate::VariantStore) when needed
    #[default]
    Deferred,
    /// Listed up front, sorted by name ascending
    Loaded(Vec<Variant>),
}

/// A folder at one revision. Identified by position, never by content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeVariant {
    pub exists: bool,
    pub name: String,
    pub path: NormalizedPath,
    pub revision: Revision,
    pub tree_id: Option<TreeId>,
    #[serde(skip)]
    pub members: Members,
}

impl TreeVariant {
    /// An existing folder in the working tree whose members are deferred.
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        let path = path.into();
        Self {
            exists: true,
            name: path.file_name().unwrap_or_default().to_string(),
            path,
            revision: Revision::WorkingTree,
            tree_id: None,
            members: Members::Deferred,
        }
    }

    pub fn at(mut self, revision: Revision) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_tree_id(mut self, id: impl Into<TreeId>) -> Self {
        self.tree_id = Some(id.into());
        self
    }

    /// Attach members; callers must pass them sorted by name.
    pub fn with_members(mut self, members: Vec<Variant>) -> Self {
        self.members = Members::Loaded(members);
        self
    }

    pub fn missing(mut self) -> Self {
        self.exists = false;
        self
    }
}

/// A resource at one revision: a file (`Blob`) or a folder (`Tree`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Variant {
    Blob(BlobVariant),
    Tree(TreeVariant),
}

impl Variant {
    pub fn exists(&self) -> bool {
        match self {
            Self::Blob(b) => b.exists,
            Self::Tree(t) => t.exists,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Blob(b) => &b.name,
            Self::Tree(t) => &t.name,
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        match self {
            Self::Blob(b) => &b.path,
            Self::Tree(t) => &t.path,
        }
    }

    pub fn revision(&self) -> &Revision {
        match self {
            Self::Blob(b) => &b.revision,
            Self::Tree(t) => &t.revision,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    pub fn as_blob(&self) -> Option<&BlobVariant> {
        match self {
            Self::Blob(b) => Some(b),
            Self::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&TreeVariant> {
        match self {
            Self::Tree(t) => Some(t),
            Self::Blob(_) => None,
        }
    }

    /// Recorded ancestry; trees and blobs without history yield an empty slice.
    pub fn ancestry(&self) -> &[CommitId] {
        match self {
            Self::Blob(b) => b.ancestry.as_deref().unwrap_or_default(),
            Self::Tree(_) => &[],
        }
    }

    /// Whether [`Variant::ancestry`] stops short of genesis.
    pub fn is_ancestry_truncated(&self) -> bool {
        match self {
            Self::Blob(b) => b.ancestry_truncated,
            Self::Tree(_) => false,
        }
    }
}

impl From<BlobVariant> for Variant {
    fn from(blob: BlobVariant) -> Self {
        Self::Blob(blob)
    }
}

impl From<TreeVariant> for Variant {
    fn from(tree: TreeVariant) -> Self {
        Self::Tree(tree)
    }
}

/// Whether an optional variant is present and exists.
pub(crate) fn exists(variant: Option<&Variant>) -> bool {
    variant.is_some_and(Variant::exists)
}
