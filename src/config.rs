//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CODEIUS__*` 覆盖（双下划线表示嵌套，如 `CODEIUS__APP__MAX_TOKENS=4096`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::llm::kind::{GOOGLE_DEFAULT_MODEL, GROQ_DEFAULT_MODEL};
use crate::llm::ProviderKind;
use crate::tools::TAVILY_ENDPOINT;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub tools: ToolsSection,
}

/// [app] 段：工作目录、单次回复 token 上限、历史文件
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    /// 文件与 Git 操作的根目录，未设置时用 ./workspace
    pub workspace_root: Option<PathBuf>,
    pub max_tokens: u32,
    /// 设置后对话历史在每轮结束时写入该 JSON 文件，启动时读回
    pub history_file: Option<PathBuf>,
    /// 自定义 system prompt 文件
    pub system_prompt_path: Option<PathBuf>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            workspace_root: None,
            max_tokens: 2048,
            history_file: None,
            system_prompt_path: None,
        }
    }
}

/// [llm] 段：按故障切换顺序排列的 Provider 列表
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub providers: Vec<ProviderEntry>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderEntry::new(ProviderKind::Groq, GROQ_DEFAULT_MODEL),
                ProviderEntry::new(ProviderKind::Google, GOOGLE_DEFAULT_MODEL),
            ],
        }
    }
}

/// [[llm.providers]]：kind + model，base_url / api_key_env 缺省时取该 kind 的预设
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
}

impl ProviderEntry {
    pub fn new(kind: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            kind,
            model: model.into(),
            base_url: None,
            api_key_env: None,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().or(self.kind.default_base_url())
    }

    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env.as_deref().or(self.kind.default_api_key_env())
    }
}

/// [tools] 段：Git 超时与搜索设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub git_timeout_secs: u64,
    pub search: SearchSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            git_timeout_secs: 30,
            search: SearchSection::default(),
        }
    }
}

/// [tools.search] 段：Tavily 端点、Key 环境变量、结果数、超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub endpoint: String,
    pub api_key_env: String,
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: TAVILY_ENDPOINT.to_string(),
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 3,
            timeout_secs: 15,
        }
    }
}

/// 从 config 目录加载配置，环境变量 CODEIUS__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CODEIUS__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CODEIUS")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
