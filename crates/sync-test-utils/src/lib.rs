//! Shared test utilities for the tree-sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: [`GitFixture`](git::GitFixture), a throwaway repository with
//!   commit, branch and tag helpers

pub mod git;

pub use git::GitFixture;
