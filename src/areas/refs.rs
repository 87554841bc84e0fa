//! Git references (branches, HEAD, tags)
//!
//! References are always resolved through git so packed refs, loose refs and
//! symbolic refs behave the same:
//!
//! - branches: `show-ref --verify refs/heads/<name>` and `show-ref --heads`
//! - tags: `rev-parse --verify refs/tags/<name>^{commit}`, peeling annotated tags
//! - HEAD: `symbolic-ref HEAD`

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::{Branch, BranchName};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{GitError, Result};

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

const TAG_REF_PREFIX: &str = "refs/tags/";

impl Repository {
    /// Commit id at the tip of branch `name`.
    pub async fn branch_commit_id(&self, name: &str) -> Result<ObjectId> {
        let branch = BranchName::try_parse(name)?;

        let output = self
            .command(&["show-ref", "--verify"])
            .add_dynamic_arguments([branch.ref_path()])
            .run_in_dir(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("branch", name))?;

        let (id, _) = parse_show_ref_line(output.trim())?;
        Ok(id)
    }

    pub async fn branch_commit(&self, name: &str) -> Result<Commit> {
        let id = self.branch_commit_id(name).await?;
        self.get_commit_by_id(&id).await
    }

    pub async fn is_branch_exist(&self, name: &str) -> Result<bool> {
        match self.branch_commit_id(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_exist() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Commit a tag points at, peeling annotated tags.
    pub async fn tag_commit_id(&self, name: &str) -> Result<ObjectId> {
        // tag names follow the same ref rules as branch names
        BranchName::try_parse(name)?;

        self.rev_parse(&format!("{TAG_REF_PREFIX}{name}"), "commit")
            .await
            .map_err(|e| {
                if e.is_not_exist() {
                    GitError::not_exist("tag", name)
                } else {
                    e
                }
            })
    }

    pub async fn tag_commit(&self, name: &str) -> Result<Commit> {
        let id = self.tag_commit_id(name).await?;
        self.get_commit_by_id(&id).await
    }

    /// Branch HEAD points at. A detached HEAD is `NotExist`.
    pub async fn head_branch(&self) -> Result<Branch> {
        let output = self
            .command(&["symbolic-ref", HEAD_REF_NAME])
            .run_in_dir(self.path())
            .await
            .map_err(|e| e.fatal_as_not_exist("symbolic ref", HEAD_REF_NAME))?;

        Ok(Branch::new(BranchName::try_parse_ref_path(&output)?))
    }

    /// Every local branch, sorted by name.
    pub async fn branches(&self) -> Result<Vec<Branch>> {
        let output = match self
            .command(&["show-ref", "--heads"])
            .run_in_dir(self.path())
            .await
        {
            Ok(output) => output,
            // no refs at all, as in a fresh repository
            Err(e) if e.exit_code() == Some(1) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut branches = output
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                let (_, ref_path) = parse_show_ref_line(line)?;
                Ok(Branch::new(BranchName::try_parse_ref_path(ref_path)?))
            })
            .collect::<Result<Vec<_>>>()?;
        branches.sort();

        Ok(branches)
    }
}

/// `<id> SP <ref>`
fn parse_show_ref_line(line: &str) -> Result<(ObjectId, &str)> {
    let (id, ref_path) = line
        .split_once(' ')
        .ok_or_else(|| GitError::parse("show-ref line", line))?;
    Ok((ObjectId::try_parse(id)?, ref_path))
}
