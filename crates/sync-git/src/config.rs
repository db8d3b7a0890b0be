//! Synchronization settings loaded from the repository root

use std::path::Path;

use serde::{Deserialize, Serialize};
use sync_fs::{ConfigStore, MetaPath};
use sync_core::Revision;

use crate::{Error, Result};

/// Default cap on ancestry entries collected per variant.
pub const DEFAULT_ANCESTRY_LIMIT: usize = 256;

/// Settings read from `.tsync.toml` (or `.json`/`.yaml`) at the repository
/// root. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Revision used as the common base
    pub source: String,
    /// Revision compared against as the remote side
    pub target: Option<String>,
    /// Maximum ancestry entries collected per variant
    pub ancestry_limit: usize,
    /// Name of the ignore-rule file always reported by scans
    pub ignore_file: String,
    /// Compare blob bytes even when object ids are known
    pub byte_compare: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: "HEAD".to_string(),
            target: None,
            ancestry_limit: DEFAULT_ANCESTRY_LIMIT,
            ignore_file: MetaPath::IgnoreFile.as_str().to_string(),
            byte_compare: false,
        }
    }
}

impl SyncConfig {
    /// Load the config at `root`, falling back to defaults when no file exists.
    pub fn load(root: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_from_root(root)?)
    }

    pub fn source_revision(&self) -> Revision {
        Revision::named(&self.source)
    }

    /// # Errors
    ///
    /// [`Error::MissingTarget`] when no target is configured.
    pub fn target_revision(&self) -> Result<Revision> {
        self.target
            .as_deref()
            .map(Revision::named)
            .ok_or(Error::MissingTarget)
    }
}
