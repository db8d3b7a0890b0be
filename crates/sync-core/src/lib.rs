//! Three-way synchronization engine for version-controlled working trees
//!
//! Classifies a resource known as `(local, base, remote)` into a
//! [`SyncStatus`], builds hierarchical [`DiffNode`] trees for folders and
//! scans a working tree against its last committed snapshot.

pub mod cancel;
pub mod classify;
pub mod compare;
pub mod diff;
pub mod error;
pub mod scan;
pub mod status;
pub mod store;
pub mod variant;

pub use cancel::CancellationToken;
pub use classify::{Classifier, SyncTriple};
pub use compare::VariantComparator;
pub use diff::{DiffBuilder, DiffKind, DiffNode};
pub use error::{Error, Result};
pub use scan::{
    Change, ChangeKind, ContentHasher, IgnoreRules, NoIgnore, ReferenceTree, ScanOutcome,
    Sha256Hasher, SkippedEntry, WorkingTreeScanner,
};
pub use status::{Direction, SyncChange, SyncStatus};
pub use store::{DetachedStore, MemoryStore, VariantStore};
pub use variant::{
    BlobVariant, CommitId, ContentId, Members, Revision, TreeId, TreeVariant, Variant,
};
