//! Typed git data parsed from command output
//!
//! - `archive`: archive formats `git archive` can produce
//! - `branch`: branch names and local branches
//! - `objects`: object ids, signatures, commits, trees, blobs and submodules

pub mod archive;
pub mod branch;
pub mod objects;
