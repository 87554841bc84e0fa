use crate::commands::Session;
use colored::Colorize;

impl Session {
    /// List local branches, marking the one HEAD points at.
    pub async fn branches(&mut self) -> anyhow::Result<()> {
        let head = match self.repository().head_branch().await {
            Ok(head) => Some(head),
            Err(e) if e.is_not_exist() => None,
            Err(e) => return Err(e.into()),
        };

        for branch in self.repository().branches().await? {
            let line = if head.as_ref() == Some(&branch) {
                format!("* {}", branch.name().to_string().green())
            } else {
                format!("  {}", branch.name())
            };
            self.write_line(line).await?;
        }

        Ok(())
    }
}
