//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sync_core::Revision;

/// Revision argument selecting the live working tree
pub const WORKTREE: &str = ":worktree";

/// Revision argument selecting the staging area
pub const INDEX: &str = ":index";

/// tree-sync - Three-way status of a working tree against two revisions
#[derive(Parser, Debug)]
#[command(name = "tsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "repo", global = true, default_value = ".")]
    pub repo: PathBuf,

    #[command(flatten)]
    pub revisions: RevisionArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides for the configured base and remote revisions
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionArgs {
    /// Base revision (default: `source` from .tsync.toml, else HEAD)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Remote revision (default: `target` from .tsync.toml)
    #[arg(long, global = true, env = "TSYNC_TARGET")]
    pub target: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Classify paths as incoming, outgoing or conflicting
    ///
    /// Without paths, lists every path that is not in sync.
    ///
    /// Examples:
    ///   tsync status --target origin/main
    ///   tsync status src/lib.rs docs
    Status {
        /// Paths relative to the repository root
        paths: Vec<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show a hierarchical diff of a path between two revisions
    ///
    /// Revisions are revspecs, or `:worktree` / `:index`.
    Diff {
        /// Path relative to the repository root (default: the root)
        path: Option<String>,

        /// Left side of the diff
        #[arg(long, default_value = WORKTREE, value_parser = parse_revision)]
        left: Revision,

        /// Right side of the diff (default: the source revision)
        #[arg(long, value_parser = parse_revision)]
        right: Option<Revision>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List working-tree changes against the source revision
    Changes {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Parse a revision argument.
pub fn parse_revision(value: &str) -> Result<Revision, String> {
    match value.trim() {
        "" => Err("revision must not be empty".to_string()),
        WORKTREE => Ok(Revision::WorkingTree),
        INDEX => Ok(Revision::Index),
        spec if spec.starts_with(':') => Err(format!(
            "unknown revision '{spec}' (expected {WORKTREE}, {INDEX} or a revspec)"
        )),
        spec => Ok(Revision::named(spec)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_with_paths() {
        let cli = Cli::parse_from(["tsync", "status", "a.txt", "docs", "--json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Status {
                paths: vec!["a.txt".to_string(), "docs".to_string()],
                json: true,
            })
        );
    }

    #[test]
    fn test_parse_global_revisions_after_subcommand() {
        let cli = Cli::parse_from(["tsync", "status", "--target", "origin/main", "-C", "repo"]);
        assert_eq!(cli.revisions.target.as_deref(), Some("origin/main"));
        assert_eq!(cli.repo, PathBuf::from("repo"));
    }

    #[test]
    fn test_parse_diff_defaults() {
        let cli = Cli::parse_from(["tsync", "diff"]);
        assert_eq!(
            cli.command,
            Some(Commands::Diff {
                path: None,
                left: Revision::WorkingTree,
                right: None,
                json: false,
            })
        );
    }

    #[test]
    fn test_parse_diff_revisions() {
        let cli = Cli::parse_from(["tsync", "diff", "src", "--left", "HEAD", "--right", ":index"]);
        let Some(Commands::Diff { path, left, right, .. }) = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(path.as_deref(), Some("src"));
        assert_eq!(left, Revision::head());
        assert_eq!(right, Some(Revision::Index));
    }

    #[test]
    fn test_unknown_pseudo_revision_is_rejected() {
        assert!(parse_revision(":stash").is_err());
        assert!(parse_revision("  ").is_err());
        assert_eq!(parse_revision("v1.0"), Ok(Revision::named("v1.0")));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
