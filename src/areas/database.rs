//! Object database queries
//!
//! Everything here reads through git: revisions are resolved with
//! `rev-parse`, commits are read with `cat-file` and history questions are
//! answered by `rev-list`, `log` and `diff`. Parsed commits go through the
//! repository's [`CommitCache`](crate::areas::commit_cache::CommitCache).

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::{Commit, CommitData};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{GitError, Result};
use tracing::debug;

impl Repository {
    /// Resolve any revision (`HEAD`, `main~2`, an abbreviated id) to a commit id.
    pub async fn resolve_commit_id(&self, rev: &str) -> Result<ObjectId> {
        self.rev_parse(rev, "commit").await
    }

    /// Get a commit by revision
    pub async fn get_commit(&self, rev: &str) -> Result<Commit> {
        let id = self.resolve_commit_id(rev).await?;
        self.get_commit_by_id(&id).await
    }

    /// Get a commit by id, reading and caching it on first request.
    pub async fn get_commit_by_id(&self, id: &ObjectId) -> Result<Commit> {
        if let Some(data) = self.commit_cache().get(id) {
            debug!(commit = %id, "commit cache hit");
            return Ok(Commit::new(data, self.clone()));
        }

        let raw = self
            .command(&["cat-file", "commit"])
            .add_dynamic_arguments([id.to_string()])
            .run_in_dir_bytes(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("commit", &id.to_string()))?;

        let data = self.commit_cache().insert(CommitData::parse(*id, &raw)?);
        debug!(commit = %id, cached = self.commit_cache().len(), "commit parsed");

        Ok(Commit::new(data, self.clone()))
    }

    /// Tree of a revision. A commit or tag is peeled to its tree.
    pub async fn tree(&self, rev: &str) -> Result<Tree> {
        let id = self.rev_parse(rev, "tree").await?;
        Ok(Tree::new(id, self.clone()))
    }

    /// Number of commits reachable from `rev`, optionally limited to those
    /// touching `paths`.
    pub async fn commits_count<S: AsRef<str>>(&self, rev: &str, paths: &[S]) -> Result<u64> {
        let mut command = self
            .command(&["rev-list", "--count"])
            .add_dynamic_arguments([rev]);
        if !paths.is_empty() {
            command = command.add_dashes_and_list(paths);
        }

        let output = command
            .run_in_dir(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("revision", rev))?;
        parse_count(&output)
    }

    /// Number of commits reachable from `end` but not from `start`.
    pub async fn commits_count_between(&self, start: &ObjectId, end: &ObjectId) -> Result<u64> {
        let output = self
            .command(&["rev-list", "--count"])
            .add_dynamic_arguments([format!("{start}..{end}")])
            .run_in_dir(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("revision", &format!("{start}..{end}")))?;
        parse_count(&output)
    }

    /// Commits reachable from `last` but not from `before`, newest first.
    pub async fn commits_between(
        &self,
        last: &ObjectId,
        before: Option<&ObjectId>,
    ) -> Result<Vec<Commit>> {
        let range = match before {
            Some(before) => format!("{before}..{last}"),
            None => last.to_string(),
        };

        let output = self
            .command(&["rev-list"])
            .add_dynamic_arguments([range.as_str()])
            .run_in_dir(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("revision", &range))?;

        let mut commits = Vec::new();
        for line in output.lines().filter(|line| !line.is_empty()) {
            commits.push(self.get_commit_by_id(&ObjectId::try_parse(line)?).await?);
        }
        Ok(commits)
    }

    /// Most recent commit reachable from `rev` that changed `rel_path`.
    pub async fn commit_by_path(&self, rev: &str, rel_path: &str) -> Result<Commit> {
        let id = self.resolve_commit_id(rev).await?;
        self.commit_by_path_from(&id, rel_path).await
    }

    pub(crate) async fn commit_by_path_from(&self, id: &ObjectId, rel_path: &str) -> Result<Commit> {
        let output = self
            .command(&["log", "-1", "--pretty=format:%H"])
            .add_dynamic_arguments([id.to_string()])
            .add_dashes_and_list([escape_pathspec(rel_path)])
            .run_in_dir(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("commit", &id.to_string()))?;

        let last = output.trim();
        if last.is_empty() {
            return Err(GitError::not_exist("path", rel_path));
        }

        self.get_commit_by_id(&ObjectId::try_parse(last)?).await
    }

    /// Whether `rel_path` differs between the two commits.
    pub async fn file_changed_between_commits(
        &self,
        rel_path: &str,
        old: &ObjectId,
        new: &ObjectId,
    ) -> Result<bool> {
        let output = self
            .command(&["diff", "--name-only", "-z"])
            .add_dynamic_arguments([old.to_string(), new.to_string()])
            .add_dashes_and_list([escape_pathspec(rel_path)])
            .run_in_dir_bytes(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("commit", &format!("{old} {new}")))?;

        Ok(!output.is_empty())
    }

    /// Whether `id` is reachable from the tip of `branch`.
    pub async fn is_commit_in_branch(&self, id: &ObjectId, branch: &BranchName) -> Result<bool> {
        let output = self
            .command(&["branch", "--list", "--contains"])
            .add_dynamic_arguments([id.to_string(), branch.to_string()])
            .run_in_dir(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("commit", &id.to_string()))?;

        Ok(!output.trim().is_empty())
    }

    /// `rev-parse --verify <rev>^{<peel>}`; an unknown revision is `NotExist`.
    pub(crate) async fn rev_parse(&self, rev: &str, peel: &'static str) -> Result<ObjectId> {
        let output = self
            .command(&["rev-parse", "--verify", "--quiet"])
            .add_dynamic_arguments([format!("{rev}^{{{peel}}}")])
            .run_in_dir(self.path())
            .await
            .map_err(|e| match e.exit_code() {
                Some(1) => GitError::not_exist("revision", rev),
                _ => e.fatal_as_not_exist("revision", rev),
            })?;

        ObjectId::try_parse(output.trim())
    }
}

fn parse_count(output: &str) -> Result<u64> {
    output
        .trim()
        .parse::<u64>()
        .map_err(|e| GitError::parse("commit count", format!("{output:?}: {e}")))
}

/// A leading `:` starts pathspec magic; escape it so the path is literal.
fn escape_pathspec(rel_path: &str) -> String {
    if rel_path.starts_with(':') {
        format!("\\{rel_path}")
    } else {
        rel_path.to_string()
    }
}
