use crate::commands::Session;

impl Session {
    /// List the entries of `rev`'s tree, or of the subtree at `path`.
    ///
    /// With `long`, blob sizes are shown the way `git ls-tree -l` does.
    pub async fn ls_tree(
        &mut self,
        rev: &str,
        path: Option<&str>,
        long: bool,
    ) -> anyhow::Result<()> {
        let mut tree = self.repository().tree(rev).await?;
        if let Some(path) = path {
            tree = tree.sub_tree(path).await?;
        }

        for entry in tree.list_entries().await? {
            let mode = entry.mode();
            let line = if long {
                let size = if entry.is_blob_like() {
                    entry.size().await?.to_string()
                } else {
                    "-".to_string()
                };
                format!(
                    "{mode} {} {} {size:>7}\t{}",
                    mode.object_type(),
                    entry.id(),
                    entry.name()
                )
            } else {
                format!("{mode} {} {}\t{}", mode.object_type(), entry.id(), entry.name())
            };
            self.write_line(line).await?;
        }

        Ok(())
    }
}
