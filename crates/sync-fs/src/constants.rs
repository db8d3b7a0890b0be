//! Well-known names inside a working tree.

use std::path::Path;

/// Config file names probed at the repository root, in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &[".tsync.toml", ".tsync.json", ".tsync.yaml", ".tsync.yml"];

/// Metadata entries the sync engine treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaPath {
    /// The `.git` directory, never walked by the scanner
    GitDir,
    /// The default ignore-rule file
    IgnoreFile,
}

impl MetaPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitDir => ".git",
            Self::IgnoreFile => ".gitignore",
        }
    }
}

impl AsRef<Path> for MetaPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for MetaPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for MetaPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
