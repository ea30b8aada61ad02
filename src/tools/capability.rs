//! 协作者接口
//!
//! PlanExecutor 只通过这三个单次调用能力与外界交互：文件读写、版本控制、网页搜索。
//! 超时由各实现自行负责。

use async_trait::async_trait;

use crate::core::AgentError;

/// 工作区文件读写
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read(&self, path: &str) -> Result<String, AgentError>;

    async fn write(&self, path: &str, content: &str) -> Result<(), AgentError>;
}

/// 暂存 + 提交
#[async_trait]
pub trait VersionControl: Send + Sync {
    async fn stage(&self, paths: &[String]) -> Result<(), AgentError>;

    /// 返回新提交的标识（如 HEAD 哈希）
    async fn commit(&self, message: &str) -> Result<String, AgentError>;
}

/// 网页搜索：返回简短答案与来源链接
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<String, AgentError>;
}
