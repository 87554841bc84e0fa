//! Plumbing commands
//!
//! ## Commands
//!
//! - `show`, `last-commit`: print one commit
//! - `rev-parse`, `count`: resolve revisions and count history
//! - `ls-tree`, `cat-blob`: browse a commit's tree
//! - `branches`: list local branches
//! - `archive`: export a commit as zip or tar.gz
//! - `set-hook`: install the update hook

pub mod archive;
pub mod branches;
pub mod cat_blob;
pub mod ls_tree;
pub mod rev_parse;
pub mod set_hook;
pub mod show;
