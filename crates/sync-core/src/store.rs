//! Content and member access for variants

use std::borrow::Cow;
use std::collections::BTreeMap;

use sync_fs::NormalizedPath;

use crate::variant::{BlobVariant, Members, Revision, TreeVariant, Variant};
use crate::{Error, Result};

/// Backing-store capabilities the comparator and diff builder rely on.
///
/// Implementations must be deterministic for a fixed variant.
pub trait VariantStore {
    /// Raw bytes of an existing blob.
    fn read_content(&self, blob: &BlobVariant) -> Result<Vec<u8>>;

    /// Members of a tree whose listing is [`Members::Deferred`].
    ///
    /// The returned members must be sorted by name ascending (byte order).
    fn members(&self, tree: &TreeVariant) -> Result<Vec<Variant>>;
}

/// Loaded members are borrowed, deferred ones come from the store.
pub(crate) fn members_of<'t>(
    store: &dyn VariantStore,
    tree: &'t TreeVariant,
) -> Result<Cow<'t, [Variant]>> {
    match &tree.members {
        Members::Loaded(members) => Ok(Cow::Borrowed(members.as_slice())),
        Members::Deferred => store.members(tree).map(Cow::Owned),
    }
}

/// A store with nothing behind it: only content ids and loaded members work.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedStore;

impl VariantStore for DetachedStore {
    fn read_content(&self, blob: &BlobVariant) -> Result<Vec<u8>> {
        Err(Error::content_read(
            blob.path.as_str(),
            "no content store attached",
        ))
    }

    fn members(&self, tree: &TreeVariant) -> Result<Vec<Variant>> {
        Err(Error::content_read(
            tree.path.as_str(),
            "no member listing attached",
        ))
    }
}

/// In-memory blob contents keyed by revision and path.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    contents: BTreeMap<(Revision, NormalizedPath), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        revision: Revision,
        path: impl Into<NormalizedPath>,
        content: impl Into<Vec<u8>>,
    ) {
        self.contents
            .insert((revision, path.into()), content.into());
    }

    pub fn with(
        mut self,
        revision: Revision,
        path: impl Into<NormalizedPath>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(revision, path, content);
        self
    }
}

impl VariantStore for MemoryStore {
    fn read_content(&self, blob: &BlobVariant) -> Result<Vec<u8>> {
        self.contents
            .get(&(blob.revision.clone(), blob.path.clone()))
            .cloned()
            .ok_or_else(|| {
                Error::content_read(
                    blob.path.as_str(),
                    format!("no content recorded at {}", blob.revision),
                )
            })
    }

    fn members(&self, tree: &TreeVariant) -> Result<Vec<Variant>> {
        DetachedStore.members(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_store_refuses_reads() {
        let blob = BlobVariant::new("a.txt");
        let err = DetachedStore.read_content(&blob).unwrap_err();
        assert!(matches!(err, Error::ContentRead { .. }));
    }

    #[test]
    fn test_memory_store_keys_by_revision() {
        let store = MemoryStore::new()
            .with(Revision::WorkingTree, "a.txt", "local")
            .with(Revision::head(), "a.txt", "committed");

        let local = BlobVariant::new("a.txt");
        let head = BlobVariant::new("a.txt").at(Revision::head());
        assert_eq!(store.read_content(&local).unwrap(), b"local");
        assert_eq!(store.read_content(&head).unwrap(), b"committed");
        assert!(store.read_content(&local.clone().at(Revision::Index)).is_err());
    }

    #[test]
    fn test_loaded_members_do_not_touch_the_store() {
        let tree = TreeVariant::new("folder")
            .with_members(vec![BlobVariant::new("folder/a.txt").into()]);
        let members = members_of(&DetachedStore, &tree).unwrap();
        assert_eq!(members.len(), 1);

        let deferred = TreeVariant::new("folder");
        assert!(members_of(&DetachedStore, &deferred).is_err());
    }
}
