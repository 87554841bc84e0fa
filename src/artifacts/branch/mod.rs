//! Local branches
//!
//! - `branch_name`: validated branch names and the `refs/heads/` refs they map to

pub mod branch_name;

/// Names git refuses in `check-ref-format --branch`
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|^-|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";
