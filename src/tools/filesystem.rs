//! 沙箱文件系统
//!
//! SafeFs 绑定 root_dir，所有路径相对于 root 解析；绝对路径与越过 root 的 `..` 一律拒绝，
//! 读写时还会对真实路径（含符号链接）做 canonicalize 校验。写入时自动创建父目录。

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::core::AgentError;
use crate::tools::FileStore;

/// 沙箱文件系统：绑定根目录，防止路径逃逸
#[derive(Debug, Clone)]
pub struct SafeFs {
    root_dir: PathBuf,
}

impl SafeFs {
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        let root = root_dir.as_ref().to_path_buf();
        let root_dir = root.canonicalize().unwrap_or(root);
        Self { root_dir }
    }

    /// 按词法规则把相对路径拼到 root 下
    pub fn resolve(&self, path: &str) -> Result<PathBuf, AgentError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(AgentError::ToolExecutionFailed("Empty path".to_string()));
        }

        let mut full = self.root_dir.clone();
        let mut depth = 0usize;
        for component in Path::new(trimmed).components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => {
                    full.push(part);
                    depth += 1;
                }
                Component::ParentDir => {
                    if depth == 0 {
                        return Err(AgentError::PathEscape(path.to_string())); // 如 ../../etc/passwd
                    }
                    full.pop();
                    depth -= 1;
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(AgentError::PathEscape(path.to_string()));
                }
            }
        }
        Ok(full)
    }

    pub async fn read_file(&self, path: &str) -> Result<String, AgentError> {
        let resolved = self.resolve(path)?;
        let canonical = tokio::fs::canonicalize(&resolved)
            .await
            .map_err(|_| AgentError::ToolExecutionFailed(format!("Path not found: {}", path)))?;
        if !canonical.starts_with(&self.root_dir) {
            return Err(AgentError::PathEscape(path.to_string()));
        }
        tokio::fs::read_to_string(&canonical)
            .await
            .map_err(|e| AgentError::ToolExecutionFailed(format!("Read failed '{}': {}", path, e)))
    }

    /// 沿 `path` 向上找到第一个已存在的祖先，校验其真实路径仍在 root 内；
    /// 悬空的符号链接同样拒绝
    async fn ensure_inside(&self, path: &Path, original: &str) -> Result<(), AgentError> {
        let mut cursor = path;
        loop {
            match tokio::fs::canonicalize(cursor).await {
                Ok(real) if real.starts_with(&self.root_dir) => return Ok(()),
                Ok(_) => return Err(AgentError::PathEscape(original.to_string())),
                Err(_) if tokio::fs::symlink_metadata(cursor).await.is_ok() => {
                    return Err(AgentError::PathEscape(original.to_string()));
                }
                Err(_) => match cursor.parent() {
                    Some(parent) => cursor = parent,
                    None => return Err(AgentError::PathEscape(original.to_string())),
                },
            }
        }
    }

    pub async fn write_file(&self, path: &str, content: &str) -> Result<(), AgentError> {
        let resolved = self.resolve(path)?;
        // 目标本身或任一已存在的祖先目录可能是指向 root 外的符号链接
        self.ensure_inside(&resolved, path).await?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AgentError::ToolExecutionFailed(format!("Failed to create parent directory: {}", e))
            })?;
            self.ensure_inside(parent, path).await?;
        }
        tokio::fs::write(&resolved, content)
            .await
            .map_err(|e| AgentError::ToolExecutionFailed(format!("Write failed '{}': {}", path, e)))
    }
}

#[async_trait]
impl FileStore for SafeFs {
    async fn read(&self, path: &str) -> Result<String, AgentError> {
        tracing::info!(path = %path, "read file");
        self.read_file(path).await
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), AgentError> {
        tracing::info!(path = %path, bytes = content.len(), "write file");
        self.write_file(path, content).await
    }
}
