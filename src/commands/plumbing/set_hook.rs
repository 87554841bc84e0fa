use crate::commands::Session;
use anyhow::Context;
use std::path::Path;

impl Session {
    /// Install the contents of `script` as the repository's update hook.
    pub async fn set_hook(&mut self, script: &Path) -> anyhow::Result<()> {
        let content = tokio::fs::read_to_string(script)
            .await
            .with_context(|| format!("failed to read hook script {}", script.display()))?;

        let hook = self.repository().set_update_hook(&content).await?;
        self.write_line(hook.display().to_string()).await
    }
}
