//! Git object types
//!
//! Objects are never read from disk directly. Each type is built by parsing
//! the output of one git plumbing command:
//!
//! - **Commit**: `cat-file commit <id>` (headers, blank line, message)
//! - **Tree**: `ls-tree -z <id>` (mode, type, id and name per entry)
//! - **Blob**: `cat-file blob <id>`, streamed on demand
//! - **Submodule**: a `160000` tree entry plus its `.gitmodules` section

pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object_id;
pub mod object_type;
pub mod signature;
pub mod submodule;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
/// Length of a raw SHA-1 hash
pub const OBJECT_ID_BYTES: usize = 20;
