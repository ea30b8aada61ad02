//! 对话持久化
//!
//! 将对话历史写入/从 JSON 文件加载，用于跨进程恢复（可选使用，由 [app].history_file 开启）。

use std::path::{Path, PathBuf};

use crate::memory::Message;

/// 简单的文件持久化：单文件 JSON 数组，每条消息含 role + content
#[derive(Debug, Clone)]
pub struct ConversationPersistence {
    path: PathBuf,
}

impl ConversationPersistence {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从 JSON 文件加载对话历史；文件不存在时返回空 Vec
    pub fn load(&self) -> anyhow::Result<Vec<Message>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// 将对话历史写入 JSON 文件；父目录不存在时自动创建
    pub fn save(&self, messages: &[Message]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(messages)?)?;
        Ok(())
    }
}
