//! 计划执行器
//!
//! 按顺序执行 ActionPlan 中的行动，每个行动调用对应协作者并追加一条 transcript；
//! 任一行动失败即放弃整个执行并返回 ExecutionFault，已追加的 transcript 一并丢弃。
//! 注意：失败前已完成的副作用（写入的文件、已做的提交）不会回滚，只是不再出现在输出中。
//! 每个行动输出一条结构化审计日志（JSON）。

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use super::{Action, ActionPlan};
use crate::core::AgentError;
use crate::tools::{FileStore, VersionControl, WebSearch};

/// 执行成功后的可读记录：一行标题 + 每个已执行行动一条
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    fn new(explanation: &str) -> Self {
        Self {
            lines: vec![format!("Agent Plan: {}", explanation)],
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// 执行中途失败：第 index 个行动（从 0 计）出错
#[derive(Error, Debug)]
#[error("action #{index} ({action}) failed: {source}")]
pub struct ExecutionFault {
    pub index: usize,
    pub action: &'static str,
    #[source]
    pub source: AgentError,
}

/// 计划执行器：持有文件、Git、搜索三个协作者
pub struct PlanExecutor {
    files: Arc<dyn FileStore>,
    vcs: Arc<dyn VersionControl>,
    search: Arc<dyn WebSearch>,
}

impl PlanExecutor {
    pub fn new(
        files: Arc<dyn FileStore>,
        vcs: Arc<dyn VersionControl>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self { files, vcs, search }
    }

    /// 执行整份计划；全部成功才返回 Transcript
    pub async fn execute(&self, plan: &ActionPlan) -> Result<Transcript, ExecutionFault> {
        let mut transcript = Transcript::new(&plan.explanation);

        for (index, action) in plan.actions.iter().enumerate() {
            let start = Instant::now();
            let result = self.run_action(action).await;

            let audit = serde_json::json!({
                "event": "tool_audit",
                "action": action.kind(),
                "index": index,
                "ok": result.is_ok(),
                "duration_ms": start.elapsed().as_millis() as u64,
                "args_preview": args_preview(action),
            });
            tracing::info!(audit = %audit.to_string(), "action");

            match result {
                Ok(Some(line)) => transcript.lines.push(line),
                Ok(None) => {}
                Err(source) => {
                    return Err(ExecutionFault {
                        index,
                        action: action.kind(),
                        source,
                    })
                }
            }
        }

        Ok(transcript)
    }

    /// 执行单个行动；未知行动返回 Ok(None)
    async fn run_action(&self, action: &Action) -> Result<Option<String>, AgentError> {
        let line = match action {
            Action::ReadFile { path } => {
                let content = self.files.read(path).await?;
                format!("Read `{}`:\n```\n{}\n```", path, content)
            }
            Action::WriteFile { path, content } => {
                self.files.write(path, content).await?;
                format!("✓ Wrote `{}`.", path)
            }
            Action::GitCommit { message } => {
                self.vcs.stage(&[".".to_string()]).await?;
                let id = self.vcs.commit(message).await?;
                tracing::debug!(commit = %id, "committed");
                format!("✓ Git commit: {}", message)
            }
            Action::WebSearch { query } => {
                let answer = self.search.search(query).await?;
                format!("Web search for '{}':\n{}", query, answer)
            }
            Action::Unknown => {
                tracing::debug!("skipping unknown action type");
                return Ok(None);
            }
        };
        Ok(Some(line))
    }
}

fn args_preview(action: &Action) -> String {
    let s = format!("{:?}", action);
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
