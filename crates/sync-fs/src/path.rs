//! Normalized path handling for repository-relative paths

use std::borrow::Borrow;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Repository-relative paths are the keys of every scan result and the
/// identity of tree variants, so two spellings of the same location must
/// compare equal. Normalization converts backslashes, collapses repeated
/// separators and strips a leading `./` and any trailing separator. The empty
/// path denotes the tree root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy().replace('\\', "/");
        let absolute = path_str.starts_with('/');

        let segments: Vec<&str> = path_str
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();

        let mut inner = segments.join("/");
        if absolute {
            inner.insert(0, '/');
        }
        Self { inner }
    }

    /// The tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Express `path` relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutsideRoot`] when `path` does not live under `root`.
    pub fn relative_to(path: &Path, root: &Path) -> Result<Self> {
        path.strip_prefix(root)
            .map(Self::new)
            .map_err(|_| Error::OutsideRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether this is the tree root.
    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Get the parent directory; the parent of a top-level entry is the root.
    pub fn parent(&self) -> Option<Self> {
        if self.inner.is_empty() || self.inner == "/" {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => Some(Self::root()),
        }
    }

    /// Get the final path segment.
    pub fn file_name(&self) -> Option<&str> {
        if self.inner.is_empty() {
            return None;
        }
        self.inner.rsplit('/').next()
    }

    /// Whether `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &NormalizedPath) -> bool {
        if other.inner.is_empty() || self.inner == other.inner {
            return true;
        }
        self.inner.starts_with(&other.inner)
            && self.inner.as_bytes().get(other.inner.len()) == Some(&b'/')
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

// Hash and Eq delegate to the inner string, so map lookups by `&str` agree.
impl Borrow<str> for NormalizedPath {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
