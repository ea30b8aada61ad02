//! Codeius - 对话式编码助手
//!
//! 模块划分：
//! - **agent**: CodingAgent 决策循环（ask / 模型切换 / 重置历史）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、阶段状态机、组件装配
//! - **llm**: LLM 客户端抽象、OpenAI 兼容实现、Mock、带故障切换的 Provider 池
//! - **memory**: 会话历史与持久化
//! - **observability**: 日志初始化
//! - **plan**: 行动计划的解析、执行与 System prompt
//! - **tools**: 协作者（文件、Git、网页搜索）

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod plan;
pub mod tools;

pub use agent::{CodingAgent, ModelInfo, Reply, ReplyOutcome};
pub use crate::core::AgentError;
