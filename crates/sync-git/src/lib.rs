//! Git backing for the tree-sync engine
//!
//! Serves variants of a repository at the working tree, the index or any
//! revspec, with path-limited ancestry, and wires them to the classifier,
//! the diff builder and the working-tree scanner.

pub mod config;
pub mod error;
pub mod history;
pub mod ignore;
pub mod repository;
pub mod snapshot;
pub mod store;
pub mod sync;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use history::{Ancestry, CommitInfo};
pub use ignore::RepoIgnore;
pub use snapshot::RevisionSnapshot;
pub use store::{GitBlobHasher, GitStore};
pub use sync::{PendingReport, StatusReport, Synchronizer};
