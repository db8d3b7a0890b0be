//! Changes command implementation

use std::path::Path;

use colored::Colorize;
use serde_json::json;
use sync_core::ChangeKind;

use super::open_synchronizer;
use crate::cli::RevisionArgs;
use crate::error::Result;

/// Run the changes command
///
/// Scans the working tree against the source revision. No target revision
/// is needed.
pub fn run_changes(path: &Path, revisions: &RevisionArgs, json: bool) -> Result<()> {
    let sync = open_synchronizer(path, revisions)?;
    let outcome = sync.scan()?;
    let changes = outcome.sorted();

    if json {
        let json_output = json!({
            "source": sync.config().source,
            "has_changes": !changes.is_empty(),
            "changes": changes,
            "skipped": outcome.skipped,
        });
        println!("{}", serde_json::to_string_pretty(&json_output)?);
        return Ok(());
    }

    if changes.is_empty() && outcome.skipped.is_empty() {
        println!(
            "{} Working tree matches {}.",
            "OK".green().bold(),
            sync.config().source.yellow()
        );
        return Ok(());
    }

    println!(
        "{} {} {}",
        "Changes".blue().bold(),
        "against".dimmed(),
        sync.config().source.yellow()
    );
    println!();
    for change in &changes {
        let marker = match change.kind {
            ChangeKind::Addition => "A".green(),
            ChangeKind::Modification => "M".yellow(),
            ChangeKind::Deletion => "D".red(),
        };
        println!("  {} {}", marker, change.path);
    }
    for skipped in &outcome.skipped {
        println!("  {} {} ({})", "?".yellow(), skipped.path, skipped.reason.dimmed());
    }

    println!();
    println!(
        "{} added, {} modified, {} deleted",
        outcome.count(ChangeKind::Addition),
        outcome.count(ChangeKind::Modification),
        outcome.count(ChangeKind::Deletion)
    );
    Ok(())
}
