//! Publishing of the rate history to the static frontend repository
//!
//! The frontend reads `data.json` from its own git repository; a run syncs
//! that repository, rewrites the file and pushes it.

pub mod git;

pub use git::{commit_and_push, force_pull, CommitOutcome};
