//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：complete 一次性返回完整回复。
//! 失败分为可恢复（限流、配额、不可用，触发 ProviderPool 切换）与不可恢复两类。

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::Message;

/// Provider 调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// 限流 / 配额 / 网络 / 服务端错误：可切换到下一个 Provider
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// 请求本身有误等，不应切换，直接上抛
    #[error("{0}")]
    Fatal(String),
}

impl LlmError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LlmError::Unavailable(_))
    }
}

/// LLM 客户端 trait：给定有序消息与 max_tokens，返回回复文本
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message], max_tokens: u32) -> Result<String, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
