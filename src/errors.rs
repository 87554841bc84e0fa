//! Error taxonomy for the git plumbing layer
//!
//! Every public operation returns [`GitError`]. Callers branch on
//! [`GitError::kind`] rather than on message text:
//!
//! - `SpawnFailed`: the git binary could not be started
//! - `NonZeroExit`: git ran and failed, stderr is kept verbatim
//! - `Timeout`: the run exceeded its deadline and the child was killed
//! - `ParseFailed`: git succeeded but its output had an unexpected shape
//! - `NotExist`: a well-formed query has no answer (unknown ref, object, path)

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GitError>;

/// Exit code git uses for fatal errors such as unknown objects or refs.
pub const FATAL_EXIT_CODE: i32 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SpawnFailed,
    NonZeroExit,
    Timeout,
    ParseFailed,
    NotExist,
    InvalidInput,
    Io,
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {}: {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("invalid {what}: {reason}")]
    ParseFailed { what: &'static str, reason: String },

    #[error("{what} does not exist: {id}")]
    NotExist { what: &'static str, id: String },

    #[error("refusing to run `{command}`: broken argument {argument:?}")]
    BrokenArgument { command: String, argument: String },

    #[error("invalid ref name: {0:?}")]
    InvalidRefName(String),

    #[error("unsupported archive format: {0}")]
    UnsupportedArchiveFormat(String),

    #[error("git {found} is older than the minimum supported {required}")]
    UnsupportedVersion { found: String, required: String },

    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error while streaming `{command}`: {source}")]
    Stream {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl GitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GitError::SpawnFailed { .. } => ErrorKind::SpawnFailed,
            GitError::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            GitError::Timeout { .. } => ErrorKind::Timeout,
            GitError::ParseFailed { .. } => ErrorKind::ParseFailed,
            GitError::NotExist { .. } => ErrorKind::NotExist,
            GitError::BrokenArgument { .. }
            | GitError::InvalidRefName(_)
            | GitError::UnsupportedArchiveFormat(_)
            | GitError::UnsupportedVersion { .. } => ErrorKind::InvalidInput,
            GitError::Io { .. } | GitError::Stream { .. } => ErrorKind::Io,
        }
    }

    pub fn parse(what: &'static str, reason: impl Into<String>) -> Self {
        GitError::ParseFailed {
            what,
            reason: reason.into(),
        }
    }

    pub fn not_exist(what: &'static str, id: impl Into<String>) -> Self {
        GitError::NotExist {
            what,
            id: id.into(),
        }
    }

    pub fn is_not_exist(&self) -> bool {
        self.kind() == ErrorKind::NotExist
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Captured stderr of a failed run, untouched.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            GitError::NonZeroExit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }

    /// Turn a fatal (128) exit into `NotExist`, leaving every other error as is.
    ///
    /// git reports unknown refs and objects this way; the stderr text is only
    /// used for the message, never for the decision.
    pub(crate) fn fatal_as_not_exist(self, what: &'static str, id: &str) -> Self {
        match self.exit_code() {
            Some(FATAL_EXIT_CODE) => GitError::not_exist(what, id),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_keeps_stderr_verbatim() {
        let error = GitError::NonZeroExit {
            command: "git commit".to_string(),
            code: Some(1),
            stderr: "nothing to commit, working tree clean\n".to_string(),
        };

        assert_eq!(error.kind(), ErrorKind::NonZeroExit);
        assert_eq!(error.stderr(), Some("nothing to commit, working tree clean\n"));
        assert!(error.to_string().contains("nothing to commit"));
    }

    #[test]
    fn fatal_exit_becomes_not_exist() {
        let error = GitError::NonZeroExit {
            command: "git show-ref".to_string(),
            code: Some(FATAL_EXIT_CODE),
            stderr: "fatal: 'refs/heads/nope' - not a valid ref".to_string(),
        }
        .fatal_as_not_exist("branch", "nope");

        assert!(error.is_not_exist());
        assert_eq!(error.to_string(), "branch does not exist: nope");
    }

    #[test]
    fn other_exit_codes_are_kept() {
        let error = GitError::NonZeroExit {
            command: "git log".to_string(),
            code: Some(1),
            stderr: String::new(),
        }
        .fatal_as_not_exist("commit", "abc");

        assert_eq!(error.kind(), ErrorKind::NonZeroExit);
    }
}
