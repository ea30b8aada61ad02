//! Web 搜索协作者（Tavily API）
//!
//! POST {endpoint}，Bearer 鉴权，请求体 {query, max_results, include_answer}；
//! 返回「答案 + Top Links」文本。HTTP 或传输错误直接作为 Err 返回，由计划执行器统一处理。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::tools::WebSearch;

pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: String,
}

/// 答案在前，链接逐行在后
fn summarize(resp: &SearchResponse) -> String {
    let links = resp
        .results
        .iter()
        .map(|hit| hit.url.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\nTop Links:\n{}",
        resp.answer.as_deref().unwrap_or(""),
        links
    )
}

/// Tavily 搜索客户端；超时与最大结果数由配置决定
pub struct TavilySearch {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
}

impl TavilySearch {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        max_results: usize,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            max_results,
        }
    }
}

#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str) -> Result<String, AgentError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::ToolExecutionFailed("Search API key not set".to_string()))?;

        tracing::info!(query = %query, "web search");
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&SearchRequest {
                query,
                max_results: self.max_results,
                include_answer: true,
            })
            .send()
            .await
            .map_err(|e| AgentError::ToolExecutionFailed(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AgentError::ToolExecutionFailed(format!("Search HTTP error: {}", e)))?;

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| AgentError::ToolExecutionFailed(format!("Read body: {}", e)))?;

        Ok(summarize(&body))
    }
}
