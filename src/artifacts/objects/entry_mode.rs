use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{GitError, Result};

/// Mode of a tree entry, exactly one of the five modes git writes.
#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    Blob,
    Executable,
    Symlink,
    Commit,
    Tree,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::Blob => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Commit => "160000",
            EntryMode::Tree => "040000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::Blob => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Commit => 0o160000,
            EntryMode::Tree => 0o40000,
        }
    }

    /// Object type git lists next to this mode in `ls-tree`
    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Blob | EntryMode::Executable | EntryMode::Symlink => ObjectType::Blob,
            EntryMode::Commit => ObjectType::Commit,
            EntryMode::Tree => ObjectType::Tree,
        }
    }
}

impl TryFrom<&str> for EntryMode {
    type Error = GitError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "100644" => Ok(EntryMode::Blob),
            "100755" => Ok(EntryMode::Executable),
            "120000" => Ok(EntryMode::Symlink),
            "160000" => Ok(EntryMode::Commit),
            "040000" => Ok(EntryMode::Tree),
            _ => Err(GitError::parse("entry mode", value)),
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
