//! Repository handle
//!
//! A [`Repository`] is a path plus the executor used to run git in it and the
//! commit cache shared by every clone of the handle. Opening only checks that
//! the path exists; git itself reports anything else on first use.
//!
//! Operations are grouped by concern:
//!
//! - `database`: commits, trees and history queries
//! - `refs`: branches, tags and HEAD
//! - hooks, below

use crate::areas::command::Command;
use crate::areas::commit_cache::CommitCache;
use crate::areas::executor::Executor;
use crate::errors::{GitError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const UPDATE_HOOK: &str = "update";

#[derive(Debug, Clone)]
pub struct Repository {
    path: Arc<Path>,
    executor: Executor,
    commit_cache: CommitCache,
}

impl Repository {
    pub fn open(path: impl AsRef<Path>, executor: Executor) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GitError::not_exist("repository", path.display().to_string()));
        }

        Ok(Repository {
            path: Arc::from(path),
            executor,
            commit_cache: CommitCache::default(),
        })
    }

    /// Create `path` if needed, run `git init` in it and open it.
    pub async fn init(path: impl AsRef<Path>, bare: bool, executor: Executor) -> Result<Self> {
        let path = path.as_ref();
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|source| GitError::Io {
                context: "failed to create repository directory",
                path: path.to_path_buf(),
                source,
            })?;

        let command = if bare {
            executor.command(&["init", "--bare"])
        } else {
            executor.command(&["init"])
        };
        command.run_in_dir_bytes(path).await?;

        Repository::open(path, executor)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory name without a trailing `.git`
    pub fn name(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match name.strip_suffix(".git") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => name,
        }
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn commit_cache(&self) -> &CommitCache {
        &self.commit_cache
    }

    /// Start a git command for this repository. Run it in [`Repository::path`].
    pub fn command(&self, args: &[&'static str]) -> Command {
        self.executor.command(args)
    }

    /// `hooks/` under `.git` for a work tree, directly under the path when bare.
    pub async fn hooks_dir(&self) -> PathBuf {
        let dot_git = self.path.join(".git");
        match tokio::fs::metadata(&dot_git).await {
            Ok(metadata) if metadata.is_dir() => dot_git.join("hooks"),
            _ => self.path.join("hooks"),
        }
    }

    /// Replace the `update` hook with `content` and make it executable.
    pub async fn set_update_hook(&self, content: &str) -> Result<PathBuf> {
        let hooks_dir = self.hooks_dir().await;
        let hook = hooks_dir.join(UPDATE_HOOK);
        let io_error = |context: &'static str, path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| GitError::Io {
                context,
                path,
                source,
            }
        };

        match tokio::fs::remove_file(&hook).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                return Err(io_error("failed to remove hook", &hook)(e));
            }
            _ => {}
        }

        tokio::fs::create_dir_all(&hooks_dir)
            .await
            .map_err(io_error("failed to create hooks directory", &hooks_dir))?;
        tokio::fs::write(&hook, content)
            .await
            .map_err(io_error("failed to write hook", &hook))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(io_error("failed to make hook executable", &hook))?;
        }

        debug!(hook = %hook.display(), "update hook written");
        Ok(hook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/srv/git/owner/project.git", "project")]
    #[case("/srv/git/owner/project", "project")]
    #[case("/srv/git/.git", ".git")]
    fn name_drops_the_git_suffix(#[case] path: &str, #[case] expected: &str) {
        let repository = Repository {
            path: Arc::from(Path::new(path)),
            executor: Executor::default(),
            commit_cache: CommitCache::default(),
        };

        assert_eq!(repository.name(), expected);
    }

    #[test]
    fn opening_a_missing_path_fails() {
        let error = Repository::open("/definitely/not/here", Executor::default()).unwrap_err();
        assert!(error.is_not_exist());
    }
}
