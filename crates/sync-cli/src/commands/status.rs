//! Status command implementation
//!
//! Classifies paths against the base and remote revisions.

use std::path::Path;

use colored::Colorize;
use sync_fs::NormalizedPath;
use sync_git::{PendingReport, StatusReport, Synchronizer};

use super::{open_synchronizer, status_marker};
use crate::cli::RevisionArgs;
use crate::error::{CliError, Result};

/// Run the status command
///
/// With no paths every out-of-sync path is listed; otherwise each named path
/// is classified, in sync or not.
pub fn run_status(path: &Path, revisions: &RevisionArgs, paths: &[String], json: bool) -> Result<()> {
    let sync = open_synchronizer(path, revisions)?;

    if paths.is_empty() {
        let report = sync.pending()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_pending(&sync, &report);
        }
        return Ok(());
    }

    let mut reports = Vec::with_capacity(paths.len());
    for p in paths {
        if Path::new(p).is_absolute() {
            return Err(CliError::user(format!(
                "'{p}' must be relative to the repository root"
            )));
        }
        reports.push(sync.status(&NormalizedPath::new(p))?);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_header(&sync);
        for report in &reports {
            print_line(report);
        }
    }
    Ok(())
}

fn print_header(sync: &Synchronizer) {
    let config = sync.config();
    let branch = sync_git::repository::current_branch(sync.store().repo())
        .ok()
        .flatten()
        .map(|name| format!(" (on {name})").dimmed().to_string())
        .unwrap_or_default();
    println!(
        "{} {} {} {}{}",
        "Status".blue().bold(),
        config.source.yellow(),
        "vs".dimmed(),
        config.target.as_deref().unwrap_or("?").yellow(),
        branch
    );
    println!();
}

fn print_line(report: &StatusReport) {
    let (marker, label) = status_marker(&report.status, 28);
    let change = report
        .remote_change
        .as_ref()
        .filter(|_| !report.status.is_in_sync())
        .map(|c| format!(" ({} {})", c.hash, c.message).dimmed().to_string())
        .unwrap_or_default();
    println!("  {} {} {}{}", marker, label, report.path, change);
}

fn print_pending(sync: &Synchronizer, report: &PendingReport) {
    if report.entries.is_empty() && report.skipped.is_empty() {
        println!("{} Everything is in sync.", "OK".green().bold());
        return;
    }

    print_header(sync);
    for entry in &report.entries {
        print_line(entry);
    }

    if !report.skipped.is_empty() {
        println!();
        println!("{}", "Skipped:".yellow().bold());
        for skipped in &report.skipped {
            println!("  {} {} ({})", "?".yellow(), skipped.path, skipped.reason);
        }
    }

    let conflicts = report.conflicts().count();
    if conflicts > 0 {
        println!();
        println!(
            "{} {} conflicting path(s)",
            "!".red().bold(),
            conflicts.to_string().red()
        );
    }
}
