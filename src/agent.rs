//! CodingAgent：一次 ask 的完整决策循环
//!
//! 拼装 [system] + history + [user] → ProviderPool → 解析行动计划 → 执行 → 写入历史。
//! - Provider 全部失败：错误上抛给调用方，本轮不写历史，会话继续可用
//! - 无计划：原始回复即为答案
//! - 计划解析失败或执行中途失败：回退为原始回复（Reply::outcome 标记为 PlanFailed），
//!   失败前已完成的文件写入/提交不会回滚
//!
//! `ask` 需要 `&mut self`：同一实例同一时刻只能有一个调用在途。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::{AgentError, AgentPhase};
use crate::llm::{ProviderDescriptor, ProviderKind, ProviderPool};
use crate::memory::{ConversationHistory, ConversationPersistence, Message};
use crate::plan::{default_system_prompt, parse_plan, PlanExecutor};

/// 模型信息（/models 列表、当前模型）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub key: String,
    pub index: usize,
    pub name: String,
    pub provider_kind: ProviderKind,
}

impl From<&ProviderDescriptor> for ModelInfo {
    fn from(d: &ProviderDescriptor) -> Self {
        Self {
            key: d.key(),
            index: d.index,
            name: d.name.clone(),
            provider_kind: d.kind,
        }
    }
}

/// 本轮回复是如何得到的
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// 没有行动计划，模型回复即答案
    Conversation,
    /// 计划全部执行成功，文本为 transcript
    Executed,
    /// 识别到计划但解析或执行失败，文本回退为模型原始回复；已发生的副作用不回滚
    PlanFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub outcome: ReplyOutcome,
}

impl Reply {
    pub fn executed(&self) -> bool {
        self.outcome == ReplyOutcome::Executed
    }
}

pub struct CodingAgent {
    pool: ProviderPool,
    executor: PlanExecutor,
    history: ConversationHistory,
    system_prompt: String,
    max_tokens: u32,
    phase: AgentPhase,
    persistence: Option<ConversationPersistence>,
}

impl CodingAgent {
    pub fn new(pool: ProviderPool, executor: PlanExecutor) -> Self {
        Self {
            pool,
            executor,
            history: ConversationHistory::new(),
            system_prompt: default_system_prompt(),
            max_tokens: 2048,
            phase: AgentPhase::Idle,
            persistence: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// 启用历史持久化并立即从文件恢复
    pub fn with_persistence(mut self, persistence: ConversationPersistence) -> anyhow::Result<Self> {
        let messages = persistence.load()?;
        tracing::info!(path = %persistence.path().display(), messages = messages.len(), "history restored");
        self.history = ConversationHistory::from_messages(messages);
        self.persistence = Some(persistence);
        Ok(self)
    }

    pub fn pool(&self) -> &ProviderPool {
        &self.pool
    }

    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    /// 所有 Provider 累计的 (prompt, completion, total) token 数
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.pool.token_usage()
    }

    fn set_phase(&mut self, next: AgentPhase) {
        tracing::debug!(from = self.phase.as_str(), to = next.as_str(), "agent phase");
        self.phase = next;
    }

    /// [system] + history + [user]
    pub fn build_messages(&self, prompt: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend_from_slice(self.history.messages());
        messages.push(Message::user(prompt));
        messages
    }

    /// 单一入口：返回可见回复文本
    pub async fn ask(&mut self, prompt: &str) -> Result<String, AgentError> {
        Ok(self.ask_detailed(prompt).await?.text)
    }

    /// 同 ask，但额外说明回复来源（对话 / 已执行 / 计划失败）
    pub async fn ask_detailed(&mut self, prompt: &str) -> Result<Reply, AgentError> {
        self.set_phase(AgentPhase::Prompting);
        let messages = self.build_messages(prompt);

        self.set_phase(AgentPhase::AwaitingModel);
        let raw = match self.pool.chat(&messages, self.max_tokens).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "model call failed, turn abandoned");
                self.set_phase(AgentPhase::Responded);
                self.set_phase(AgentPhase::Idle);
                return Err(e);
            }
        };

        self.set_phase(AgentPhase::Parsing);
        let reply = match parse_plan(&raw) {
            Ok(None) => Reply {
                text: raw,
                outcome: ReplyOutcome::Conversation,
            },
            Ok(Some(plan)) => {
                self.set_phase(AgentPhase::Executing);
                match self.executor.execute(&plan).await {
                    Ok(transcript) => Reply {
                        text: transcript.render(),
                        outcome: ReplyOutcome::Executed,
                    },
                    Err(fault) => {
                        tracing::warn!(error = %fault, "plan execution aborted, falling back to raw reply");
                        Reply {
                            text: raw,
                            outcome: ReplyOutcome::PlanFailed(fault.to_string()),
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "plan rejected, falling back to raw reply");
                Reply {
                    text: raw,
                    outcome: ReplyOutcome::PlanFailed(e.to_string()),
                }
            }
        };

        self.set_phase(AgentPhase::Responded);
        self.history.record_exchange(prompt, reply.text.clone());
        self.persist();
        self.set_phase(AgentPhase::Idle);
        Ok(reply)
    }

    /// key → 模型信息
    pub fn get_available_models(&self) -> BTreeMap<String, ModelInfo> {
        self.pool
            .descriptors()
            .map(|d| (d.key(), ModelInfo::from(d)))
            .collect()
    }

    pub fn current_model(&self) -> Option<ModelInfo> {
        self.pool.current_descriptor().map(ModelInfo::from)
    }

    /// 按 key 切换模型；未知 key 返回说明文字而非错误
    pub fn switch_model(&mut self, key: &str) -> String {
        let Some(info) = self.pool.find_by_key(key).map(ModelInfo::from) else {
            return format!("Model {} not found. Use /models to see available models.", key);
        };
        match self.pool.set_provider(info.index) {
            Ok(()) => {
                tracing::info!(key = %info.key, "model switched");
                format!("Switched to {} ({})", info.name, info.provider_kind.label())
            }
            Err(e) => format!("Model {} not found ({})", key, e),
        }
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Some(p) = &self.persistence {
            if let Err(e) = p.save(self.history.messages()) {
                tracing::warn!(path = %p.path().display(), error = %e, "failed to save history");
            }
        }
    }
}
