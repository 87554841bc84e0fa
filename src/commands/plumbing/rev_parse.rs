use crate::commands::Session;

impl Session {
    pub async fn rev_parse(&mut self, rev: &str) -> anyhow::Result<()> {
        let id = self.repository().resolve_commit_id(rev).await?;
        self.write_line(id.to_string()).await
    }

    /// Print the number of commits reachable from `rev`, limited to `paths`
    /// when any are given.
    pub async fn count(&mut self, rev: &str, paths: &[String]) -> anyhow::Result<()> {
        let count = self.repository().commits_count(rev, paths).await?;
        self.write_line(count.to_string()).await
    }
}
