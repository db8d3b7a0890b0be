//! Command implementations for sync-cli

pub mod changes;
pub mod diff;
pub mod status;

pub use changes::run_changes;
pub use diff::run_diff;
pub use status::run_status;

use std::path::Path;

use colored::{ColoredString, Colorize};
use sync_core::{Direction, SyncStatus};
use sync_git::{SyncConfig, Synchronizer};

use crate::cli::RevisionArgs;
use crate::error::Result;

/// Open the repository at `path` with its config and the command line
/// overrides applied.
pub fn open_synchronizer(path: &Path, revisions: &RevisionArgs) -> Result<Synchronizer> {
    let (_, workdir) = sync_git::repository::open(path)?;
    let mut config = SyncConfig::load(&workdir)?;
    if let Some(source) = &revisions.source {
        config.source = source.clone();
    }
    if let Some(target) = &revisions.target {
        config.target = Some(target.clone());
    }
    tracing::debug!(source = %config.source, target = ?config.target, "Effective revisions");
    Ok(Synchronizer::with_config(&workdir, config)?)
}

/// One-character marker and colored label, padded to `width`, for a status
/// line.
pub(crate) fn status_marker(status: &SyncStatus, width: usize) -> (ColoredString, ColoredString) {
    let label = format!("{:<width$}", status.label());
    match status.direction {
        _ if status.is_in_sync() => ("=".dimmed(), label.dimmed()),
        Direction::Conflicting if status.pseudo_conflict => ("~".yellow(), label.yellow()),
        Direction::Conflicting => ("!".red().bold(), label.red()),
        Direction::Incoming => ("<".cyan(), label.cyan()),
        Direction::Outgoing => (">".green(), label.green()),
        Direction::None => (" ".normal(), label.normal()),
    }
}
