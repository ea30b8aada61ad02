//! Agent 阶段：单次 ask 的状态机
//!
//! Idle → Prompting → AwaitingModel → (Parsing → Executing)? → Responded → Idle

use serde::Serialize;

/// Agent 所处阶段
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum AgentPhase {
    /// 无调用在途
    #[default]
    Idle,
    /// 拼装 system + history + user
    Prompting,
    /// 阻塞等待 ProviderPool
    AwaitingModel,
    /// 从回复中提取行动计划
    Parsing,
    /// 按序执行计划中的行动
    Executing,
    /// 写入历史并返回
    Responded,
}

impl AgentPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentPhase::Idle => "idle",
            AgentPhase::Prompting => "prompting",
            AgentPhase::AwaitingModel => "awaiting_model",
            AgentPhase::Parsing => "parsing",
            AgentPhase::Executing => "executing",
            AgentPhase::Responded => "responded",
        }
    }
}

