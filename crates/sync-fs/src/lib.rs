//! Filesystem helpers for tree-sync
//!
//! Provides `/`-normalized relative paths, content checksums, raw reads and
//! format-agnostic configuration loading.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::MetaPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
