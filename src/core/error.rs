//! Agent 错误类型
//!
//! 区分三类对调用方可见的失败：Provider 全部耗尽（本轮致命）、计划解析失败、
//! 行动执行失败；后两者在 Agent 层降级为原始回复。

use thiserror::Error;

use crate::llm::LlmError;

/// Agent 运行过程中可能出现的错误（Provider、解析、工具、路径逃逸等）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 本次调用中每个 Provider 都尝试过一次且全部失败
    #[error("All providers failed after {attempts} attempt(s): {last}")]
    ProvidersExhausted { attempts: usize, last: String },

    /// 不可恢复的 Provider 错误，不触发切换
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("No providers configured")]
    NoProviders,

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Path escape attempt: {0}")]
    PathEscape(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<LlmError> for AgentError {
    fn from(e: LlmError) -> Self {
        AgentError::LlmError(e.to_string())
    }
}

impl AgentError {
    /// 是否为 Provider 耗尽（调用方应提示「重试或切换模型」）
    pub fn is_exhausted(&self) -> bool {
        matches!(self, AgentError::ProvidersExhausted { .. })
    }
}
