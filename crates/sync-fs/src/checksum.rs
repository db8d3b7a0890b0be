//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used as the
//! content identity of working-tree files when no version-control hash is
//! available.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of raw bytes.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_bytes_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> crate::Result<String> {
    let content = crate::io::read_bytes(path)?;
    Ok(compute_bytes_checksum(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_has_prefix() {
        let checksum = compute_bytes_checksum(b"hello world");
        assert!(checksum.starts_with("sha256:"));
    }

    #[test]
    fn different_content_different_checksum() {
        let a = compute_bytes_checksum(b"aaa");
        let b = compute_bytes_checksum(b"bbb");
        assert_ne!(a, b);
    }

    #[test]
    fn checksum_known_value() {
        let checksum = compute_bytes_checksum(b"hello world");
        assert_eq!(
            checksum,
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn file_checksum_matches_bytes_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "hello world").unwrap();

        let file_cs = compute_file_checksum(&path).unwrap();
        assert_eq!(file_cs, compute_bytes_checksum(b"hello world"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compute_file_checksum(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, crate::Error::Io { .. }));
    }
}
