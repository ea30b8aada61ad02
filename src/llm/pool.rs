//! Provider 池：有序 Provider 列表 + 当前游标，单次调用内自动故障切换
//!
//! - 从当前游标开始调用；成功则原样返回，游标不变
//! - 可恢复失败（LlmError::Unavailable）时游标前移（取模）并立即重试下一个，无退避
//! - 每次调用最多尝试 N 次（N = 池大小），全部失败返回 ProvidersExhausted，携带最后一次错误
//! - 失败不做持久标记：上一次失败的 Provider 在下一次调用中仍可被选中

use std::sync::Arc;

use serde::Serialize;

use super::{LlmClient, LlmError, ProviderKind};
use crate::core::AgentError;
use crate::memory::Message;

/// Provider 描述：池中位置、模型名、种类
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderDescriptor {
    pub index: usize,
    pub name: String,
    pub kind: ProviderKind,
}

impl ProviderDescriptor {
    /// 稳定键：`{kind}_{index}`，如 groq_0
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind, self.index)
    }
}

/// Provider 池
pub struct ProviderPool {
    providers: Vec<(ProviderDescriptor, Arc<dyn LlmClient>)>,
    current: usize,
}

impl ProviderPool {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            current: 0,
        }
    }

    /// 追加 Provider，index 为其在池中的位置
    pub fn add_provider(
        &mut self,
        kind: ProviderKind,
        name: impl Into<String>,
        client: Arc<dyn LlmClient>,
    ) {
        let descriptor = ProviderDescriptor {
            index: self.providers.len(),
            name: name.into(),
            kind,
        };
        self.providers.push((descriptor, client));
    }

    pub fn with_provider(
        mut self,
        kind: ProviderKind,
        name: impl Into<String>,
        client: Arc<dyn LlmClient>,
    ) -> Self {
        self.add_provider(kind, name, client);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// 当前游标
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_descriptor(&self) -> Option<&ProviderDescriptor> {
        self.providers.get(self.current).map(|(d, _)| d)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.providers.iter().map(|(d, _)| d)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&ProviderDescriptor> {
        self.descriptors().find(|d| d.key() == key)
    }

    /// 手动固定游标（模型切换）；不检查该 Provider 之前是否失败过
    pub fn set_provider(&mut self, index: usize) -> Result<(), AgentError> {
        if index >= self.providers.len() {
            return Err(AgentError::ConfigError(format!(
                "provider index {} out of range (pool size {})",
                index,
                self.providers.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    /// 发送消息；见模块文档的切换规则
    pub async fn chat(&mut self, messages: &[Message], max_tokens: u32) -> Result<String, AgentError> {
        let total = self.providers.len();
        if total == 0 {
            return Err(AgentError::NoProviders);
        }

        let mut tried = 0;
        let mut last: Option<LlmError> = None;
        while tried < total {
            let (descriptor, client) = &self.providers[self.current];
            match client.complete(messages, max_tokens).await {
                Ok(text) => {
                    tracing::debug!(provider = %descriptor.key(), "provider replied");
                    return Ok(text);
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(provider = %descriptor.key(), error = %e, "provider failed, failing over");
                    last = Some(e);
                    self.current = (self.current + 1) % total;
                    tried += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AgentError::ProvidersExhausted {
            attempts: tried,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// 聚合所有 Provider 的 token 使用
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.providers
            .iter()
            .map(|(_, client)| client.token_usage())
            .fold((0, 0, 0), |acc, (a, b, c)| (acc.0 + a, acc.1 + b, acc.2 + c))
    }
}

impl Default for ProviderPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// 可切换成功/失败的测试 Provider，统计调用次数
    struct FlakyClient {
        reply: String,
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    impl FlakyClient {
        fn new(reply: &str, failing: bool) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                failing: AtomicBool::new(failing),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for FlakyClient {
        async fn complete(&self, _messages: &[Message], _max_tokens: u32) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                Err(LlmError::Unavailable(format!("{} rate limited", self.reply)))
            } else {
                Ok(self.reply.clone())
            }
        }
    }

    struct FatalClient;

    #[async_trait]
    impl LlmClient for FatalClient {
        async fn complete(&self, _messages: &[Message], _max_tokens: u32) -> Result<String, LlmError> {
            Err(LlmError::Fatal("bad request".to_string()))
        }
    }

    /// 固定报告 token 用量的 Provider
    struct MeteredClient(u64, u64);

    #[async_trait]
    impl LlmClient for MeteredClient {
        async fn complete(&self, _messages: &[Message], _max_tokens: u32) -> Result<String, LlmError> {
            Ok("metered".to_string())
        }

        fn token_usage(&self) -> (u64, u64, u64) {
            (self.0, self.1, self.0 + self.1)
        }
    }

    fn pool_of(clients: &[Arc<FlakyClient>]) -> ProviderPool {
        let mut pool = ProviderPool::new();
        for (i, c) in clients.iter().enumerate() {
            pool.add_provider(ProviderKind::Mock, format!("m{}", i), c.clone());
        }
        pool
    }

    #[tokio::test]
    async fn test_failover_stops_at_first_success() {
        let clients = vec![
            FlakyClient::new("a", true),
            FlakyClient::new("b", true),
            FlakyClient::new("c", false),
            FlakyClient::new("d", false),
        ];
        let mut pool = pool_of(&clients);

        let out = pool.chat(&[Message::user("hi")], 64).await.unwrap();
        assert_eq!(out, "c");
        assert_eq!(pool.current(), 2);
        assert_eq!(clients[3].calls(), 0);

        // 成功后游标不变，下次直接命中
        let out = pool.chat(&[Message::user("again")], 64).await.unwrap();
        assert_eq!(out, "c");
        assert_eq!(clients[0].calls(), 1);
        assert_eq!(clients[2].calls(), 2);
    }

    #[tokio::test]
    async fn test_all_fail_after_exactly_n_attempts() {
        let clients = vec![
            FlakyClient::new("a", true),
            FlakyClient::new("b", true),
            FlakyClient::new("c", true),
        ];
        let mut pool = pool_of(&clients);

        let err = pool.chat(&[Message::user("hi")], 64).await.unwrap_err();
        match err {
            AgentError::ProvidersExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(last.contains("c rate limited"));
            }
            other => panic!("expected ProvidersExhausted, got {:?}", other),
        }
        let total: usize = clients.iter().map(|c| c.calls()).sum();
        assert_eq!(total, 3);
        assert!(clients.iter().all(|c| c.calls() == 1));
        // 游标绕回起点，仍是合法下标
        assert_eq!(pool.current(), 0);
    }

    #[tokio::test]
    async fn test_failed_provider_retried_on_next_call() {
        let clients = vec![FlakyClient::new("a", true), FlakyClient::new("b", true)];
        let mut pool = pool_of(&clients);
        assert!(pool.chat(&[Message::user("hi")], 64).await.is_err());

        clients[0].failing.store(false, Ordering::SeqCst);
        let out = pool.chat(&[Message::user("hi")], 64).await.unwrap();
        assert_eq!(out, "a");
    }

    #[tokio::test]
    async fn test_set_provider_pins_cursor() {
        let clients = vec![
            FlakyClient::new("a", false),
            FlakyClient::new("b", true),
            FlakyClient::new("c", false),
        ];
        let mut pool = pool_of(&clients);

        // b 失败过，之后被切换到 c
        pool.set_provider(1).unwrap();
        assert_eq!(pool.chat(&[Message::user("x")], 64).await.unwrap(), "c");
        assert_eq!(pool.current(), 2);

        clients[1].failing.store(false, Ordering::SeqCst);
        pool.set_provider(1).unwrap();
        assert_eq!(pool.chat(&[Message::user("x")], 64).await.unwrap(), "b");
        assert_eq!(clients[1].calls(), 2);
        assert_eq!(clients[0].calls(), 0);
    }

    #[tokio::test]
    async fn test_set_provider_out_of_range() {
        let mut pool = pool_of(&[FlakyClient::new("a", false)]);
        assert!(pool.set_provider(1).is_err());
        assert_eq!(pool.current(), 0);
    }

    #[tokio::test]
    async fn test_fatal_error_does_not_fail_over() {
        let backup = FlakyClient::new("backup", false);
        let mut pool = ProviderPool::new()
            .with_provider(ProviderKind::Mock, "fatal", Arc::new(FatalClient))
            .with_provider(ProviderKind::Mock, "backup", backup.clone());

        let err = pool.chat(&[Message::user("x")], 64).await.unwrap_err();
        assert!(matches!(err, AgentError::LlmError(_)));
        assert_eq!(backup.calls(), 0);
        assert_eq!(pool.current(), 0);
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let mut pool = ProviderPool::new();
        let err = pool.chat(&[Message::user("x")], 64).await.unwrap_err();
        assert!(matches!(err, AgentError::NoProviders));
    }

    #[test]
    fn test_descriptor_keys() {
        let pool = ProviderPool::new()
            .with_provider(ProviderKind::Groq, "llama", Arc::new(FatalClient))
            .with_provider(ProviderKind::Google, "gemini", Arc::new(FatalClient));
        let keys: Vec<String> = pool.descriptors().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["groq_0", "google_1"]);
        assert_eq!(pool.find_by_key("google_1").map(|d| d.index), Some(1));
        assert!(pool.find_by_key("google_0").is_none());
    }

    #[test]
    fn test_token_usage_sums_all_providers() {
        let pool = ProviderPool::new()
            .with_provider(ProviderKind::Groq, "llama", Arc::new(MeteredClient(100, 40)))
            .with_provider(ProviderKind::Mock, "mock", Arc::new(FatalClient))
            .with_provider(ProviderKind::Google, "gemini", Arc::new(MeteredClient(10, 5)));
        assert_eq!(pool.token_usage(), (110, 45, 155));
    }
}
