//! File content stored in the object database
//!
//! Content is never held by the blob itself. It is read with
//! `git cat-file blob <id>` each time it is asked for, either as a stream or
//! copied into a caller supplied sink.

use crate::areas::command::PipeReader;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntry;
use crate::errors::Result;
use bytes::Bytes;
use tokio::io::AsyncWrite;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    entry: TreeEntry,
}

impl Blob {
    pub(crate) fn new(entry: TreeEntry) -> Self {
        Blob { entry }
    }

    pub fn id(&self) -> &ObjectId {
        self.entry.id()
    }

    pub fn name(&self) -> &str {
        self.entry.name()
    }

    pub fn entry(&self) -> &TreeEntry {
        &self.entry
    }

    pub async fn size(&self) -> Result<u64> {
        self.entry.size().await
    }

    /// Stream the content. Call [`PipeReader::finish`] once done reading to
    /// surface a failed read.
    pub async fn data(&self) -> Result<PipeReader> {
        let repository = self.entry.repository();
        repository
            .command(&["cat-file", "blob"])
            .add_dynamic_arguments([self.id().to_string()])
            .spawn_reader(repository.path())
            .await
    }

    /// Copy the content into `sink` as it is read.
    pub async fn pipe_to<W>(&self, sink: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let repository = self.entry.repository();
        repository
            .command(&["cat-file", "blob"])
            .add_dynamic_arguments([self.id().to_string()])
            .run_in_dir_pipeline(repository.path(), sink)
            .await
            .map_err(|e| e.fatal_as_not_exist("blob", &self.id().to_string()))
    }

    pub async fn read_to_bytes(&self) -> Result<Bytes> {
        let mut content = Vec::new();
        self.pipe_to(&mut content).await?;
        Ok(Bytes::from(content))
    }
}
