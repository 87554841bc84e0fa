//! Git commit object
//!
//! Commits are read with `git cat-file commit <id>`, which prints the raw
//! object payload:
//!
//! ```text
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Headers end at the first empty line; everything after it is the message,
//! kept verbatim. Headers this layer does not use (`gpgsig`, `encoding`,
//! `mergetag` and their continuation lines) are skipped.

use crate::areas::repository::Repository;
use crate::artifacts::archive::ArchiveFormat;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::signature::Signature;
use crate::artifacts::objects::submodule::{SubModule, SubModuleFile};
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::{GitError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Parsed commit payload
///
/// Holds no repository handle, so it can sit in the commit cache without
/// keeping a repository alive.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommitData {
    id: ObjectId,
    /// Tree object ID representing the directory snapshot
    tree_id: ObjectId,
    /// Parent commit IDs in object order, mainline first
    parents: Vec<ObjectId>,
    author: Signature,
    committer: Signature,
    message: String,
}

impl CommitData {
    /// Parse a raw commit payload. Any malformed header fails the whole parse.
    pub fn parse(id: ObjectId, raw: &[u8]) -> Result<Self> {
        let (headers, message) = match raw.windows(2).position(|pair| pair == b"\n\n") {
            Some(blank) => (&raw[..blank], &raw[blank + 2..]),
            None => (raw.strip_suffix(b"\n").unwrap_or(raw), &[][..]),
        };

        let mut tree_id = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.split(|&byte| byte == b'\n') {
            // continuation of a multi-line header such as gpgsig
            if line.starts_with(b" ") {
                continue;
            }

            let Some(space) = line.iter().position(|&byte| byte == b' ') else {
                continue;
            };
            let (keyword, value) = (&line[..space], &line[space + 1..]);

            match keyword {
                b"tree" if tree_id.is_none() => tree_id = Some(ObjectId::try_parse(utf8(value)?)?),
                b"parent" => parents.push(ObjectId::try_parse(utf8(value)?)?),
                b"author" => author = Some(Signature::try_from(utf8(value)?)?),
                b"committer" => committer = Some(Signature::try_from(utf8(value)?)?),
                _ => {}
            }
        }

        let missing = |header: &str| GitError::parse("commit", format!("{id}: missing {header} header"));

        Ok(CommitData {
            id,
            tree_id: tree_id.ok_or_else(|| missing("tree"))?,
            parents,
            author: author.ok_or_else(|| missing("author"))?,
            committer: committer.ok_or_else(|| missing("committer"))?,
            message: String::from_utf8_lossy(message).into_owned(),
        })
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn tree_id(&self) -> &ObjectId {
        &self.tree_id
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn author(&self) -> &Signature {
        &self.author
    }

    pub fn committer(&self) -> &Signature {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the payload back in `cat-file` layout.
    pub fn display(&self) -> String {
        let mut lines = vec![format!("tree {}", self.tree_id)];
        for parent in &self.parents {
            lines.push(format!("parent {parent}"));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }
}

fn utf8(value: &[u8]) -> Result<&str> {
    std::str::from_utf8(value).map_err(|e| GitError::parse("commit header", e.to_string()))
}

/// Git commit bound to the repository it was read from
///
/// Equality compares the commit contents only.
#[derive(Debug, Clone)]
pub struct Commit {
    data: Arc<CommitData>,
    repository: Repository,
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Commit {}

impl Commit {
    pub(crate) fn new(data: Arc<CommitData>, repository: Repository) -> Self {
        Commit { data, repository }
    }

    pub fn data(&self) -> &CommitData {
        &self.data
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn id(&self) -> &ObjectId {
        self.data.id()
    }

    pub fn tree_id(&self) -> &ObjectId {
        self.data.tree_id()
    }

    pub fn author(&self) -> &Signature {
        self.data.author()
    }

    pub fn committer(&self) -> &Signature {
        self.data.committer()
    }

    /// Get the full commit message
    pub fn message(&self) -> &str {
        self.data.message()
    }

    /// Get the first line of the commit message
    ///
    /// Useful for short-form display (e.g., `git log --oneline`)
    pub fn summary(&self) -> &str {
        self.data.message().lines().next().unwrap_or("")
    }

    pub fn parent_ids(&self) -> &[ObjectId] {
        self.data.parents()
    }

    pub fn parent_count(&self) -> usize {
        self.data.parents().len()
    }

    pub fn parent_id(&self, n: usize) -> Result<&ObjectId> {
        self.data
            .parents()
            .get(n)
            .ok_or_else(|| GitError::not_exist("parent", format!("{}~{n}", self.id())))
    }

    /// Resolve the n-th parent, 0 being the mainline.
    pub async fn parent(&self, n: usize) -> Result<Commit> {
        let id = *self.parent_id(n)?;
        self.repository.get_commit_by_id(&id).await
    }

    pub fn tree(&self) -> Tree {
        Tree::new(*self.tree_id(), self.repository.clone())
    }

    /// Number of commits reachable from this one, itself included.
    pub async fn commits_count(&self) -> Result<u64> {
        self.repository
            .commits_count(&self.id().to_string(), &[] as &[&str])
            .await
    }

    /// Most recent commit at or before this one that touched `rel_path`.
    pub async fn commit_by_path(&self, rel_path: &str) -> Result<Commit> {
        self.repository.commit_by_path_from(self.id(), rel_path).await
    }

    pub async fn tree_entry_by_path(&self, rel_path: &str) -> Result<TreeEntry> {
        self.tree().tree_entry_by_path(rel_path).await
    }

    pub async fn blob_by_path(&self, rel_path: &str) -> Result<Blob> {
        self.tree().blob_by_path(rel_path).await
    }

    /// Submodules declared in this commit's `.gitmodules`, keyed by path.
    pub async fn submodules(&self) -> Result<BTreeMap<String, SubModule>> {
        let blob = match self.blob_by_path(".gitmodules").await {
            Ok(blob) => blob,
            Err(e) if e.is_not_exist() => return Ok(BTreeMap::new()),
            Err(e) => return Err(e),
        };

        let content = blob.read_to_bytes().await?;
        SubModule::parse_gitmodules(&String::from_utf8_lossy(&content))
    }

    pub async fn submodule(&self, path: &str) -> Result<Option<SubModule>> {
        Ok(self.submodules().await?.remove(path))
    }

    /// Describe the submodule pinned at `path` in this commit.
    pub async fn submodule_file(&self, path: &str) -> Result<SubModuleFile> {
        let entry = self.tree_entry_by_path(path).await?;
        if !entry.is_submodule() {
            return Err(GitError::not_exist("submodule", path));
        }

        let url = self
            .submodule(path)
            .await?
            .map(|submodule| submodule.url().to_string())
            .unwrap_or_default();

        Ok(SubModuleFile::new(self.clone(), url, *entry.id()))
    }

    /// Write an archive of this commit to `target`, every entry under
    /// `<repository name>/`.
    ///
    /// The archive is streamed from git's stdout, so a relative `target`
    /// resolves against the caller's working directory. A failed run leaves
    /// no file behind.
    pub async fn create_archive(&self, target: &Path, format: ArchiveFormat) -> Result<()> {
        let prefix = self.repository.name();
        debug!(commit = %self.id(), target = %target.display(), %format, "creating archive");

        let io_error = |context: &'static str| {
            move |source: std::io::Error| GitError::Io {
                context,
                path: target.to_path_buf(),
                source,
            }
        };

        let mut file = tokio::fs::File::create(target)
            .await
            .map_err(io_error("failed to create archive"))?;

        let written = self
            .repository
            .command(&["archive"])
            .add_option_format(format!("--prefix={prefix}/"))
            .add_option_format(format!("--format={}", format.as_str()))
            .add_dynamic_arguments([self.id().to_string()])
            .run_in_dir_pipeline(self.repository.path(), &mut file)
            .await;
        drop(file);

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(target).await {
                debug!(target = %target.display(), error = %cleanup, "failed to remove partial archive");
            }
            return Err(e);
        }

        Ok(())
    }

    pub fn display(&self) -> String {
        self.data.display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::proptest;

    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
    const ID: &str = "d86a90f801dbe279db095437a8c7ea42c60e8d98";

    fn oid(hex: &str) -> ObjectId {
        ObjectId::try_parse(hex).unwrap()
    }

    fn raw_commit(parents: &[String], message: &str) -> String {
        let mut raw = format!("tree {TREE}\n");
        for parent in parents {
            raw.push_str(&format!("parent {parent}\n"));
        }
        raw.push_str("author Jane Doe <jane@example.com> 1700000000 +0100\n");
        raw.push_str("committer John Roe <john@example.com> 1700000100 +0000\n");
        raw.push('\n');
        raw.push_str(message);
        raw
    }

    #[test]
    fn parses_headers_and_message() {
        let raw = raw_commit(&[], "Initial commit\n\nWith a body.\n");
        let commit = CommitData::parse(oid(ID), raw.as_bytes()).unwrap();

        assert_eq!(commit.id(), &oid(ID));
        assert_eq!(commit.tree_id(), &oid(TREE));
        assert!(commit.parents().is_empty());
        assert_eq!(commit.author().name(), "Jane Doe");
        assert_eq!(commit.committer().email(), "john@example.com");
        assert_eq!(commit.message(), "Initial commit\n\nWith a body.\n");
    }

    #[test]
    fn display_round_trips_the_raw_layout() {
        let raw = raw_commit(&[TREE.to_string()], "msg\n");
        let commit = CommitData::parse(oid(ID), raw.as_bytes()).unwrap();

        assert_eq!(commit.display(), raw);
    }

    #[test]
    fn skips_signature_continuation_lines() {
        let raw = format!(
            "tree {TREE}\n\
             author A <a@b.c> 1 +0000\n\
             committer A <a@b.c> 1 +0000\n\
             gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQEzBAABCAAdFiEE\n -----END PGP SIGNATURE-----\n\
             \n\
             signed\n"
        );
        let commit = CommitData::parse(oid(ID), raw.as_bytes()).unwrap();

        assert_eq!(commit.message(), "signed\n");
    }

    #[test]
    fn first_tree_header_wins() {
        let raw = format!(
            "tree {TREE}\ntree {ID}\nauthor A <a@b.c> 1 +0000\ncommitter A <a@b.c> 1 +0000\n\nm"
        );
        let commit = CommitData::parse(oid(ID), raw.as_bytes()).unwrap();

        assert_eq!(commit.tree_id(), &oid(TREE));
    }

    #[test]
    fn malformed_tree_fails() {
        let raw = raw_commit(&[], "m").replace(TREE, "4b825dc642cb6eb9a060e54bf8d69288fbee49");
        assert!(CommitData::parse(oid(ID), raw.as_bytes()).is_err());
    }

    #[test]
    fn malformed_parent_fails() {
        let raw = raw_commit(&["zz".repeat(20)], "m");
        assert!(CommitData::parse(oid(ID), raw.as_bytes()).is_err());
    }

    #[test]
    fn missing_tree_fails() {
        let raw = "author A <a@b.c> 1 +0000\ncommitter A <a@b.c> 1 +0000\n\nm";
        assert!(CommitData::parse(oid(ID), raw.as_bytes()).is_err());
    }

    #[test]
    fn missing_committer_fails() {
        let raw = format!("tree {TREE}\nauthor A <a@b.c> 1 +0000\n\nm");
        assert!(CommitData::parse(oid(ID), raw.as_bytes()).is_err());
    }

    proptest! {
        #[test]
        fn parents_keep_their_order(parents in proptest::collection::vec("[0-9a-f]{40}", 0..8)) {
            let raw = raw_commit(&parents, "merge\n");
            let commit = CommitData::parse(oid(ID), raw.as_bytes()).unwrap();

            let parsed = commit.parents().iter().map(|p| p.to_string()).collect::<Vec<_>>();
            assert_eq!(parsed, parents);
        }
    }
}
