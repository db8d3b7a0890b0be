//! Error types for sync-git

use std::path::PathBuf;

/// Result type for sync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] sync_fs::Error),

    #[error(transparent)]
    Sync(#[from] sync_core::Error),

    #[error("No git repository found at {path}")]
    NotARepository { path: PathBuf },

    #[error("Repository at {path} has no working tree")]
    BareRepository { path: PathBuf },

    #[error("Revision '{spec}' not found")]
    RevisionNotFound { spec: String },

    #[error("'{path}' exists in neither {left} nor {right}")]
    PathNotFound {
        path: String,
        left: String,
        right: String,
    },

    #[error("No target revision configured. Pass --target or set `target` in .tsync.toml")]
    MissingTarget,
}

impl Error {
    /// Whether the underlying failure was a cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Sync(err) if err.is_cancelled())
    }
}

/// Convert a git2 failure while serving a variant into the engine's
/// read-failure error.
pub(crate) fn read_failure(path: &str, err: git2::Error) -> sync_core::Error {
    sync_core::Error::content_read(path, err)
}
