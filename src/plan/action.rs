//! 行动计划数据模型
//!
//! 模型回复中嵌入的 JSON：`{"explanation": "...", "actions": [{"type": "read_file", "path": "..."}, ...]}`

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// 单个行动；未知 type（包括非字符串的 type）反序列化为 Unknown，执行时静默跳过（向前兼容）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ReadFile { path: String },
    WriteFile { path: String, content: String },
    GitCommit { message: String },
    WebSearch { query: String },
    Unknown,
}

impl Action {
    /// 与 JSON 中 type 字段一致的名称
    pub fn kind(&self) -> &'static str {
        match self {
            Action::ReadFile { .. } => "read_file",
            Action::WriteFile { .. } => "write_file",
            Action::GitCommit { .. } => "git_commit",
            Action::WebSearch { .. } => "web_search",
            Action::Unknown => "unknown",
        }
    }
}

/// 线上格式：按字符串 type 分派
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedAction {
    ReadFile { path: String },
    WriteFile { path: String, content: String },
    GitCommit { message: String },
    WebSearch { query: String },
    #[serde(other)]
    Unknown,
}

impl From<TaggedAction> for Action {
    fn from(tagged: TaggedAction) -> Self {
        match tagged {
            TaggedAction::ReadFile { path } => Action::ReadFile { path },
            TaggedAction::WriteFile { path, content } => Action::WriteFile { path, content },
            TaggedAction::GitCommit { message } => Action::GitCommit { message },
            TaggedAction::WebSearch { query } => Action::WebSearch { query },
            TaggedAction::Unknown => Action::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.get("type").is_some_and(|t| !t.is_string()) {
            return Ok(Action::Unknown);
        }
        TaggedAction::deserialize(value)
            .map(Action::from)
            .map_err(de::Error::custom)
    }
}

/// 一次回复解析出的计划，不持久化
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionPlan {
    #[serde(default)]
    pub explanation: String,
    pub actions: Vec<Action>,
}
