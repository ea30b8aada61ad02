//! 组件装配：加载配置，构建 Provider 池、协作者与 CodingAgent

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::agent::CodingAgent;
use crate::config::{load_config, AppConfig, LlmSection};
use crate::llm::{MockLlmClient, OpenAiClient, ProviderKind, ProviderPool};
use crate::memory::ConversationPersistence;
use crate::plan::{load_system_prompt, PlanExecutor};
use crate::tools::{GitCli, SafeFs, TavilySearch};

/// 按配置顺序构建 Provider 池；API Key 环境变量未设置的条目跳过，全部跳过时回退到 Mock
pub fn build_provider_pool(llm: &LlmSection) -> ProviderPool {
    let mut pool = ProviderPool::new();
    for entry in &llm.providers {
        if entry.kind == ProviderKind::Mock {
            pool.add_provider(ProviderKind::Mock, entry.model.clone(), Arc::new(MockLlmClient));
            continue;
        }
        let Some(api_key) = entry.api_key_env().and_then(|var| std::env::var(var).ok()) else {
            tracing::info!(kind = %entry.kind, model = %entry.model, "API key not set, skipping provider");
            continue;
        };
        tracing::info!("Using {} LLM ({})", entry.kind.label(), entry.model);
        let client = OpenAiClient::new(entry.base_url(), &entry.model, &api_key);
        pool.add_provider(entry.kind, entry.model.clone(), Arc::new(client));
    }

    if pool.is_empty() {
        tracing::warn!("No API key set for any provider, using Mock LLM");
        pool.add_provider(ProviderKind::Mock, "mock", Arc::new(MockLlmClient));
    }
    pool
}

/// 创建 Agent：配置 > 当前目录下的 workspace
pub fn create_agent(config_path: Option<PathBuf>) -> anyhow::Result<CodingAgent> {
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let workspace = match cfg.app.workspace_root.clone() {
        Some(p) => p,
        None => std::env::current_dir()
            .context("Failed to read current directory")?
            .join("workspace"),
    };
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("Failed to create workspace {}", workspace.display()))?;

    let search_key = std::env::var(&cfg.tools.search.api_key_env).ok();
    if search_key.is_none() {
        tracing::warn!("{} not set, web_search actions will fail", cfg.tools.search.api_key_env);
    }

    let executor = PlanExecutor::new(
        Arc::new(SafeFs::new(&workspace)),
        Arc::new(GitCli::new(&workspace, cfg.tools.git_timeout_secs)),
        Arc::new(TavilySearch::new(
            cfg.tools.search.endpoint.clone(),
            search_key,
            cfg.tools.search.max_results,
            cfg.tools.search.timeout_secs,
        )),
    );

    let mut agent = CodingAgent::new(build_provider_pool(&cfg.llm), executor)
        .with_system_prompt(load_system_prompt(cfg.app.system_prompt_path.as_deref()))
        .with_max_tokens(cfg.app.max_tokens);

    if let Some(path) = &cfg.app.history_file {
        agent = agent
            .with_persistence(ConversationPersistence::new(path))
            .context("Failed to load conversation history")?;
    }

    tracing::info!(workspace = %workspace.display(), providers = agent.pool().len(), "agent ready");
    Ok(agent)
}
