use crate::commands::Session;

impl Session {
    /// Stream the file at `path` in `rev` to the output.
    pub async fn cat_blob(&mut self, rev: &str, path: &str) -> anyhow::Result<()> {
        let commit = self.repository().get_commit(rev).await?;
        let blob = commit.blob_by_path(path).await?;

        let mut content = blob.data().await?;
        tokio::io::copy(&mut content, self.writer()).await?;
        content.finish().await?;

        Ok(())
    }
}
