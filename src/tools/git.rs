//! Git 协作者：通过 git CLI 执行 add / commit
//!
//! 所有命令在 project_root 下运行，并受 timeout_secs 限制。

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::AgentError;
use crate::tools::VersionControl;

pub struct GitCli {
    project_root: PathBuf,
    timeout: Duration,
}

impl GitCli {
    pub fn new(project_root: impl AsRef<Path>, timeout_secs: u64) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 运行 git 子命令，成功返回 stdout
    async fn run(&self, args: &[&str]) -> Result<String, AgentError> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.project_root);

        let label = args.first().copied().unwrap_or("git");
        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| AgentError::ToolExecutionFailed(format!("git {} timed out", label)))?
            .map_err(|e| AgentError::ToolExecutionFailed(format!("Failed to run git {}: {}", label, e)))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AgentError::ToolExecutionFailed(format!(
                "git {} failed: {}",
                label,
                stderr.trim()
            )))
        }
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn stage(&self, paths: &[String]) -> Result<(), AgentError> {
        let mut args = vec!["add"];
        if paths.is_empty() {
            args.push(".");
        } else {
            args.extend(paths.iter().map(String::as_str));
        }
        tracing::info!(paths = ?paths, "git add");
        self.run(&args).await.map(|_| ())
    }

    async fn commit(&self, message: &str) -> Result<String, AgentError> {
        tracing::info!(message = %message, "git commit");
        self.run(&["commit", "-m", message]).await?;
        let head = self.run(&["rev-parse", "HEAD"]).await?;
        Ok(head.trim().to_string())
    }
}
