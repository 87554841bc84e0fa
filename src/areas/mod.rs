//! Core repository components
//!
//! - `command`: one git subprocess, its arguments and how it is run
//! - `executor`: shared settings every command starts from
//! - `repository`: repository handle, hooks
//! - `database`: commit, tree and history queries
//! - `refs`: branches, tags and HEAD
//! - `commit_cache`: parsed commits shared by clones of a repository handle

pub mod command;
pub mod commit_cache;
pub(crate) mod database;
pub mod executor;
pub(crate) mod refs;
pub mod repository;
