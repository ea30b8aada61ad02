//! 对话历史
//!
//! 按插入顺序保存 user/assistant 消息，每次构造 prompt 时原样回放；
//! 只追加，仅在显式 reset 时清空。每轮交换一次性追加 user + assistant 两条，长度始终为偶数。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 会话历史
#[derive(Clone, Debug, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已保存的消息恢复：只保留开头连续的 (user, assistant) 对，
    /// 遇到 system 消息、角色颠倒或末尾落单的消息即截断
    pub fn from_messages(mut messages: Vec<Message>) -> Self {
        let valid_pairs = messages
            .chunks(2)
            .take_while(|pair| {
                matches!(pair, [q, a] if q.role == Role::User && a.role == Role::Assistant)
            })
            .count();
        if valid_pairs * 2 < messages.len() {
            tracing::warn!(
                kept = valid_pairs * 2,
                dropped = messages.len() - valid_pairs * 2,
                "saved history is not strictly user/assistant pairs, truncating"
            );
            messages.truncate(valid_pairs * 2);
        }
        Self { messages }
    }

    /// 记录一轮完整交换
    pub fn record_exchange(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.messages.push(Message::user(prompt));
        self.messages.push(Message::assistant(response));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
