//! Git plumbing client
//!
//! Opens repositories by path and answers questions about them by running
//! the installed `git` binary and parsing what it prints.
//!
//! - `areas`: subprocess execution, the repository handle and its operations
//! - `artifacts`: typed git objects parsed from command output
//! - `commands`: the `plumb` command implementations
//! - `config`: environment driven executor settings
//! - `errors`: the [`GitError`](errors::GitError) taxonomy

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod config;
pub mod errors;

pub use areas::executor::Executor;
pub use areas::repository::Repository;
pub use errors::{ErrorKind, GitError};
