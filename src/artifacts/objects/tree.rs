//! Git tree object
//!
//! Trees are listed with `git ls-tree -z <id>`, one NUL-terminated record per
//! entry:
//!
//! ```text
//! <mode> SP <type> SP <id> TAB <name> NUL
//! ```
//!
//! With `-z` names are printed raw, never quoted. Entries are listed lazily
//! and remembered for the lifetime of the [`Tree`] handle.

use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{GitError, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One `ls-tree` record before it is bound to a repository
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TreeRecord {
    pub mode: EntryMode,
    pub id: ObjectId,
    pub name: String,
}

/// Parse `ls-tree -z` output. A mode/type mismatch or an unknown mode fails.
pub fn parse_tree_records(raw: &[u8]) -> Result<Vec<TreeRecord>> {
    raw.split(|&byte| byte == 0)
        .filter(|record| !record.is_empty())
        .map(parse_tree_record)
        .collect()
}

fn parse_tree_record(record: &[u8]) -> Result<TreeRecord> {
    let record = std::str::from_utf8(record)
        .map_err(|e| GitError::parse("tree entry", e.to_string()))?;
    let malformed = || GitError::parse("tree entry", format!("{record:?}"));

    let (meta, name) = record.split_once('\t').ok_or_else(malformed)?;
    let mut fields = meta.split(' ');
    let (Some(mode), Some(object_type), Some(id), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed());
    };

    let mode = EntryMode::try_from(mode)?;
    let object_type = ObjectType::try_from(object_type)?;
    if mode.object_type() != object_type {
        return Err(GitError::parse(
            "tree entry",
            format!("mode {mode} does not match type {object_type} in {record:?}"),
        ));
    }

    Ok(TreeRecord {
        mode,
        id: ObjectId::try_parse(id)?,
        name: name.to_string(),
    })
}

/// Directory snapshot bound to a repository
#[derive(Debug, Clone)]
pub struct Tree {
    id: ObjectId,
    repository: Repository,
    entries: Arc<OnceCell<Vec<TreeEntry>>>,
}

impl Tree {
    pub(crate) fn new(id: ObjectId, repository: Repository) -> Self {
        Tree {
            id,
            repository,
            entries: Arc::new(OnceCell::new()),
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Direct children of this tree in git's order.
    pub async fn list_entries(&self) -> Result<&[TreeEntry]> {
        let entries = self
            .entries
            .get_or_try_init(|| async {
                let raw = self
                    .repository
                    .command(&["ls-tree", "-z"])
                    .add_dynamic_arguments([self.id.to_string()])
                    .run_in_dir_bytes(self.repository.path())
                    .await
                    .map_err(|e| e.fatal_as_not_exist("tree", &self.id.to_string()))?;

                Ok::<_, GitError>(
                    parse_tree_records(&raw)?
                        .into_iter()
                        .map(|record| TreeEntry::new(record, self.repository.clone()))
                        .collect(),
                )
            })
            .await?;

        Ok(entries.as_slice())
    }

    /// Child entry named `name`, not descending into subtrees.
    pub async fn entry(&self, name: &str) -> Result<Option<TreeEntry>> {
        Ok(self
            .list_entries()
            .await?
            .iter()
            .find(|entry| entry.name() == name)
            .cloned())
    }

    /// Walk `rel_path` one component at a time.
    ///
    /// The empty path (or `.`) names the tree itself.
    pub async fn tree_entry_by_path(&self, rel_path: &str) -> Result<TreeEntry> {
        let components = path_components(rel_path);
        let Some((last, parents)) = components.split_last() else {
            return Ok(TreeEntry::root(self.id, self.repository.clone()));
        };

        let mut tree = self.clone();
        for component in parents {
            tree = tree.sub_tree_entry(component, rel_path).await?;
        }

        tree.entry(last)
            .await?
            .ok_or_else(|| GitError::not_exist("tree entry", rel_path))
    }

    /// Subtree at `rel_path`
    pub async fn sub_tree(&self, rel_path: &str) -> Result<Tree> {
        let mut tree = self.clone();
        for component in path_components(rel_path) {
            tree = tree.sub_tree_entry(component, rel_path).await?;
        }
        Ok(tree)
    }

    /// Blob at `rel_path`. Directories and submodules are not blobs.
    pub async fn blob_by_path(&self, rel_path: &str) -> Result<Blob> {
        let entry = self.tree_entry_by_path(rel_path).await?;
        if !entry.is_blob_like() {
            return Err(GitError::not_exist("blob", rel_path));
        }
        Ok(Blob::new(entry))
    }

    async fn sub_tree_entry(&self, name: &str, rel_path: &str) -> Result<Tree> {
        match self.entry(name).await? {
            Some(entry) if entry.is_dir() => Ok(Tree::new(*entry.id(), self.repository.clone())),
            _ => Err(GitError::not_exist("tree entry", rel_path)),
        }
    }
}

fn path_components(rel_path: &str) -> Vec<&str> {
    rel_path
        .split('/')
        .filter(|component| !component.is_empty() && *component != ".")
        .collect()
}

/// Entry of a tree: a name, a mode and the object it points to
///
/// The object size is fetched on first request and then remembered; clones
/// share it.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    id: ObjectId,
    mode: EntryMode,
    name: String,
    repository: Repository,
    size: Arc<OnceCell<u64>>,
}

impl PartialEq for TreeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.mode == other.mode && self.name == other.name
    }
}

impl Eq for TreeEntry {}

impl TreeEntry {
    fn new(record: TreeRecord, repository: Repository) -> Self {
        TreeEntry {
            id: record.id,
            mode: record.mode,
            name: record.name,
            repository,
            size: Arc::new(OnceCell::new()),
        }
    }

    fn root(id: ObjectId, repository: Repository) -> Self {
        TreeEntry::new(
            TreeRecord {
                mode: EntryMode::Tree,
                id,
                name: String::new(),
            },
            repository,
        )
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn is_dir(&self) -> bool {
        self.mode == EntryMode::Tree
    }

    pub fn is_submodule(&self) -> bool {
        self.mode == EntryMode::Commit
    }

    pub fn is_link(&self) -> bool {
        self.mode == EntryMode::Symlink
    }

    pub fn is_regular(&self) -> bool {
        self.mode == EntryMode::Blob
    }

    pub fn is_executable(&self) -> bool {
        self.mode == EntryMode::Executable
    }

    /// Regular file, executable or symlink
    pub fn is_blob_like(&self) -> bool {
        self.mode.object_type() == ObjectType::Blob
    }

    /// Object size in bytes. Directories and submodules report 0.
    pub async fn size(&self) -> Result<u64> {
        if !self.is_blob_like() {
            return Ok(0);
        }

        let size = self
            .size
            .get_or_try_init(|| async {
                let output = self
                    .repository
                    .command(&["cat-file", "-s"])
                    .add_dynamic_arguments([self.id.to_string()])
                    .run_in_dir(self.repository.path())
                    .await
                    .map_err(|e| e.fatal_as_not_exist("blob", &self.id.to_string()))?;

                output
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| GitError::parse("object size", format!("{output:?}: {e}")))
            })
            .await?;

        Ok(*size)
    }

    /// Content view of this entry, for blob-like entries.
    pub fn blob(&self) -> Result<Blob> {
        if !self.is_blob_like() {
            return Err(GitError::not_exist("blob", self.name.as_str()));
        }
        Ok(Blob::new(self.clone()))
    }

    /// Tree view of this entry, for directories.
    pub fn tree(&self) -> Result<Tree> {
        if !self.is_dir() {
            return Err(GitError::not_exist("tree", self.name.as_str()));
        }
        Ok(Tree::new(self.id, self.repository.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
    const COMMIT: &str = "d86a90f801dbe279db095437a8c7ea42c60e8d98";

    #[test]
    fn parses_every_mode() {
        let raw = format!(
            "100644 blob {BLOB}\tREADME.md\0\
             100755 blob {BLOB}\trun.sh\0\
             120000 blob {BLOB}\tlink\0\
             160000 commit {COMMIT}\tvendor/lib\0\
             040000 tree {TREE}\tsrc\0"
        );

        let records = parse_tree_records(raw.as_bytes()).unwrap();
        let modes = records.iter().map(|r| r.mode).collect::<Vec<_>>();

        assert_eq!(
            modes,
            [
                EntryMode::Blob,
                EntryMode::Executable,
                EntryMode::Symlink,
                EntryMode::Commit,
                EntryMode::Tree,
            ]
        );
        assert_eq!(records[3].name, "vendor/lib");
        assert_eq!(records[4].id.to_string(), TREE);
    }

    #[test]
    fn names_keep_spaces_and_tabs() {
        let raw = format!("100644 blob {BLOB}\tmy\tfile name.txt\0");
        let records = parse_tree_records(raw.as_bytes()).unwrap();

        assert_eq!(records[0].name, "my\tfile name.txt");
    }

    #[test]
    fn empty_listing_has_no_records() {
        assert!(parse_tree_records(b"").unwrap().is_empty());
    }

    #[rstest]
    #[case(format!("100644 tree {TREE}\tx\0"))]
    #[case(format!("040000 blob {BLOB}\tx\0"))]
    #[case(format!("100664 blob {BLOB}\tx\0"))]
    #[case(format!("100644 blob {BLOB} x\0"))]
    #[case(format!("100644 blob e69de29\tx\0"))]
    #[case("garbage\0".to_string())]
    fn malformed_records_fail(#[case] raw: String) {
        assert!(parse_tree_records(raw.as_bytes()).is_err());
    }

    #[rstest]
    #[case("", vec![])]
    #[case(".", vec![])]
    #[case("src/lib.rs", vec!["src", "lib.rs"])]
    #[case("/src//lib.rs/", vec!["src", "lib.rs"])]
    fn splits_paths_into_components(#[case] path: &str, #[case] expected: Vec<&str>) {
        assert_eq!(path_components(path), expected);
    }
}
