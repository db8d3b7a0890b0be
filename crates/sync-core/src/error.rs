//! Error types for sync-core

/// Result type for sync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while classifying, diffing or scanning
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bytes, members or ancestry of a variant could not be read
    #[error("Failed to read content of '{path}': {source}")]
    ContentRead {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A variant reported an inconsistent state
    #[error("Malformed variant '{path}': {reason}")]
    MalformedVariant { path: String, reason: String },

    /// Cooperative cancellation was observed
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub fn content_read(
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ContentRead {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedVariant {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this failure is a cancellation rather than a real error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<sync_fs::Error> for Error {
    fn from(err: sync_fs::Error) -> Self {
        let path = match &err {
            sync_fs::Error::Io { path, .. } | sync_fs::Error::ConfigParse { path, .. } => {
                path.display().to_string()
            }
            sync_fs::Error::OutsideRoot { path, .. } => path.display().to_string(),
            sync_fs::Error::UnsupportedFormat { extension } => extension.clone(),
        };
        Self::content_read(path, err)
    }
}
