//! Command implementations behind the `plumb` binary
//!
//! Each command is a method on [`Session`], which pairs an opened repository
//! with the stream output is written to. Output goes through `colored`; the
//! binary decides once whether colours are wanted.

pub mod plumbing;

use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub type Writer = Box<dyn AsyncWrite + Unpin + Send>;

pub struct Session {
    repository: Repository,
    writer: Writer,
}

impl Session {
    pub fn new(repository: Repository, writer: Writer) -> Self {
        Session { repository, writer }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn writer(&mut self) -> &mut Writer {
        &mut self.writer
    }

    pub(crate) async fn write_line(&mut self, line: impl AsRef<str>) -> anyhow::Result<()> {
        self.writer.write_all(line.as_ref().as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> anyhow::Result<()> {
        self.writer.flush().await?;
        Ok(())
    }

    pub(crate) fn paint_id(&self, id: &ObjectId, abbrev: bool) -> String {
        let id = if abbrev {
            id.to_short_oid()
        } else {
            id.to_string()
        };
        id.yellow().to_string()
    }
}
