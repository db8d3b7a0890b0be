//! Content equality between variants

use tracing::trace;

use crate::store::VariantStore;
use crate::variant::{BlobVariant, TreeVariant, Variant};
use crate::Result;

/// Decides whether two variants hold the same content.
///
/// A variant that is present but does not exist compares like an absent
/// one. Blobs compare by content id, falling back to bytes read through the
/// store when either id is missing. Trees compare by structural identity:
/// tree ids when both sides carry one, paths otherwise. A blob never equals
/// a tree.
///
/// Content ids are only comparable when both sides were hashed the same way;
/// mixing git object ids with `sha256:` checksums makes every pair unequal.
#[derive(Clone, Copy)]
pub struct VariantComparator<'a> {
    store: &'a dyn VariantStore,
    byte_compare: bool,
}

impl<'a> VariantComparator<'a> {
    pub fn new(store: &'a dyn VariantStore) -> Self {
        Self {
            store,
            byte_compare: false,
        }
    }

    /// Always compare blob bytes, even when content ids are present.
    pub fn with_byte_compare(mut self, enabled: bool) -> Self {
        self.byte_compare = enabled;
        self
    }

    pub fn store(&self) -> &'a dyn VariantStore {
        self.store
    }

    /// Compare two optional variants.
    ///
    /// # Errors
    ///
    /// Only fails when a byte comparison could not read content.
    pub fn equal(&self, a: Option<&Variant>, b: Option<&Variant>) -> Result<bool> {
        let a = a.filter(|v| v.exists());
        let b = b.filter(|v| v.exists());

        match (a, b) {
            (None, None) => Ok(true),
            (None, Some(_)) | (Some(_), None) => Ok(false),
            (Some(Variant::Blob(x)), Some(Variant::Blob(y))) => self.blobs_equal(x, y),
            (Some(Variant::Tree(x)), Some(Variant::Tree(y))) => Ok(trees_equal(x, y)),
            _ => Ok(false),
        }
    }

    fn blobs_equal(&self, a: &BlobVariant, b: &BlobVariant) -> Result<bool> {
        if !self.byte_compare
            && let (Some(x), Some(y)) = (&a.content_id, &b.content_id)
        {
            return Ok(x == y);
        }

        trace!(left = %a.path, right = %b.path, "Comparing blob bytes");
        let left = self.store.read_content(a)?;
        let right = self.store.read_content(b)?;
        Ok(left == right)
    }
}

fn trees_equal(a: &TreeVariant, b: &TreeVariant) -> bool {
    match (&a.tree_id, &b.tree_id) {
        (Some(x), Some(y)) => x == y,
        _ => a.path == b.path,
    }
}
