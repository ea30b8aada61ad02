//! Provider 种类与端点预设
//!
//! 种类在构造时显式给出，用于生成稳定的模型键 `{kind}_{index}`。
//! - Groq: https://api.groq.com/openai/v1
//! - Google Gemini（OpenAI 兼容端点）: https://generativelanguage.googleapis.com/v1beta/openai
//! - DeepSeek: https://api.deepseek.com

use std::fmt;

use serde::{Deserialize, Serialize};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const GOOGLE_DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Groq,
    Google,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Mock,
}

impl ProviderKind {
    /// 键中使用的小写标识
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::Google => "google",
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Mock => "mock",
        }
    }

    /// 展示用名称
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "Groq",
            ProviderKind::Google => "Google",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::Mock => "Mock",
        }
    }

    /// 默认端点；None 表示使用 async-openai 的默认值（api.openai.com）或无需网络
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Groq => Some(GROQ_BASE_URL),
            ProviderKind::Google => Some(GOOGLE_BASE_URL),
            ProviderKind::DeepSeek => Some(DEEPSEEK_BASE_URL),
            ProviderKind::OpenAi | ProviderKind::Mock => None,
        }
    }

    /// 默认 API Key 环境变量
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Groq => Some("GROQ_API_KEY"),
            ProviderKind::Google => Some("GOOGLE_API_KEY"),
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderKind::Mock => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
