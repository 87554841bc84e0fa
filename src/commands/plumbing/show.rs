use crate::artifacts::objects::commit::Commit;
use crate::commands::Session;

impl Session {
    /// Print a commit in git's medium format.
    pub async fn show(&mut self, rev: &str) -> anyhow::Result<()> {
        let commit = self.repository().get_commit(rev).await?;
        self.show_commit_medium(&commit).await
    }

    /// Print the last commit at or before `rev` that touched `path`, one line.
    pub async fn last_commit(&mut self, rev: &str, path: &str) -> anyhow::Result<()> {
        let commit = self.repository().commit_by_path(rev, path).await?;
        let line = format!("{} {}", self.paint_id(commit.id(), true), commit.summary());
        self.write_line(line).await
    }

    async fn show_commit_medium(&mut self, commit: &Commit) -> anyhow::Result<()> {
        self.write_line(format!("commit {}", self.paint_id(commit.id(), false)))
            .await?;

        if commit.parent_count() > 1 {
            let parents = commit
                .parent_ids()
                .iter()
                .map(|id| id.to_short_oid())
                .collect::<Vec<_>>()
                .join(" ");
            self.write_line(format!("Merge: {parents}")).await?;
        }

        self.write_line(format!("Author: {}", commit.author().display_name()))
            .await?;
        self.write_line(format!("Date:   {}", commit.author().readable_timestamp()))
            .await?;
        self.write_line("").await?;
        for message_line in commit.message().lines() {
            self.write_line(format!("    {message_line}")).await?;
        }

        Ok(())
    }
}
