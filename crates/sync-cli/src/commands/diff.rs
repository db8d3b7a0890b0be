//! Diff command implementation
//!
//! Prints the hierarchical diff tree of a path between two revisions.

use std::path::Path;

use colored::Colorize;
use sync_core::{DiffKind, DiffNode, Revision, Variant};
use sync_fs::NormalizedPath;

use super::open_synchronizer;
use crate::cli::RevisionArgs;
use crate::error::Result;

/// Run the diff command
///
/// `right` defaults to the configured source revision.
pub fn run_diff(
    path: &Path,
    revisions: &RevisionArgs,
    target_path: Option<&str>,
    left: &Revision,
    right: Option<&Revision>,
    json: bool,
) -> Result<()> {
    let sync = open_synchronizer(path, revisions)?;
    let right = right
        .cloned()
        .unwrap_or_else(|| sync.config().source_revision());
    let target_path = target_path.map(NormalizedPath::new).unwrap_or_default();

    let tree = sync.diff(&target_path, left, &right)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_tree(&tree, &target_path, left, &right);
    }
    Ok(())
}

fn print_tree(tree: &DiffNode, path: &NormalizedPath, left: &Revision, right: &Revision) {
    let shown = if path.is_root() { "." } else { path.as_str() };
    println!(
        "{} {} {}..{}",
        "Diff".blue().bold(),
        shown.yellow(),
        left.to_string().cyan(),
        right.to_string().cyan()
    );
    println!();

    // Two folders: the root itself is not a difference, only its descendants
    let both_folders = tree.left.as_ref().is_some_and(Variant::is_tree)
        && tree.right.as_ref().is_some_and(Variant::is_tree);
    let (indent, count) = if both_folders {
        if tree.is_empty() {
            println!("{} No differences.", "OK".green().bold());
            return;
        }
        (0, tree.len())
    } else {
        println!("  {}", line(tree));
        (1, tree.len() + 1)
    };

    tree.walk(|depth, node| {
        println!("  {}{}", "  ".repeat(depth + indent), line(node));
    });

    println!();
    println!("{count} difference(s)");
}

fn line(node: &DiffNode) -> String {
    let is_tree = node.left.as_ref().or(node.right.as_ref()).is_some_and(Variant::is_tree);
    let name = if is_tree {
        format!("{}/", node.name())
    } else {
        node.name().to_string()
    };
    match node.kind {
        DiffKind::Addition => format!("{} {}", "+".green(), name.green()),
        DiffKind::Deletion => format!("{} {}", "-".red(), name.red()),
        DiffKind::Change if is_tree => format!("{} {}", "~".yellow(), name.bold()),
        DiffKind::Change => format!("{} {}", "~".yellow(), name.yellow()),
    }
}
