//! tree-sync CLI
//!
//! Reports the three-way status of a working tree against a base and a
//! remote revision.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: logging disabled: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(&cli.repo, &cli.revisions, cmd),
        None => {
            println!("{} tree-sync CLI", "tsync".green().bold());
            println!();
            println!("Run {} for available commands.", "tsync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(repo: &std::path::Path, revisions: &cli::RevisionArgs, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Status { paths, json } => commands::run_status(repo, revisions, &paths, json),
        Commands::Diff {
            path,
            left,
            right,
            json,
        } => commands::run_diff(repo, revisions, path.as_deref(), &left, right.as_ref(), json),
        Commands::Changes { json } => commands::run_changes(repo, revisions, json),
    }
}
