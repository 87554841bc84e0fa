use crate::artifacts::archive::ArchiveFormat;
use crate::commands::Session;
use std::path::Path;

impl Session {
    pub async fn archive(
        &mut self,
        rev: &str,
        format: ArchiveFormat,
        target: &Path,
    ) -> anyhow::Result<()> {
        let commit = self.repository().get_commit(rev).await?;
        commit.create_archive(target, format).await?;
        Ok(())
    }
}
