//! Read-side I/O helpers

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Read the raw bytes of a file.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Canonicalize a working-tree root without the `\\?\` prefix on Windows.
pub fn canonical_root(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_root_resolves_dots() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let dotted = dir.path().join("sub").join("..");

        let canonical = canonical_root(&dotted).unwrap();
        assert_eq!(canonical, canonical_root(dir.path()).unwrap());
    }
}
