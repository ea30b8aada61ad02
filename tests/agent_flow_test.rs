//! CodingAgent 端到端流程测试：脚本化 Provider + 临时目录文件系统 + 内存 Git / 搜索

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codeius::core::{AgentError, AgentPhase};
use codeius::llm::{LlmClient, LlmError, ProviderKind, ProviderPool};
use codeius::memory::{Message, Role};
use codeius::plan::PlanExecutor;
use codeius::tools::{SafeFs, VersionControl, WebSearch};
use codeius::{CodingAgent, ReplyOutcome};

/// 按顺序返回预设结果，并记录每次收到的消息
#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn push(&self, reply: Result<String, LlmError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    fn last_messages(&self) -> Vec<Message> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedProvider {
    async fn complete(&self, messages: &[Message], _max_tokens: u32) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Unavailable("script exhausted".to_string())))
    }

    /// 每次调用计 10 个 prompt token、5 个 completion token
    fn token_usage(&self) -> (u64, u64, u64) {
        let calls = self.calls() as u64;
        (calls * 10, calls * 5, calls * 15)
    }
}

#[derive(Default)]
struct RecordingGit {
    commits: Mutex<Vec<String>>,
}

#[async_trait]
impl VersionControl for RecordingGit {
    async fn stage(&self, _paths: &[String]) -> Result<(), AgentError> {
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<String, AgentError> {
        self.commits.lock().unwrap().push(message.to_string());
        Ok("deadbeef".to_string())
    }
}

struct StaticSearch;

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, query: &str) -> Result<String, AgentError> {
        Ok(format!("{} is great\n\nTop Links:\nhttps://example.com", query))
    }
}

struct Harness {
    agent: CodingAgent,
    provider: Arc<ScriptedProvider>,
    git: Arc<RecordingGit>,
    dir: tempfile::TempDir,
}

fn harness(replies: Vec<Result<String, LlmError>>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::new(replies);
    let git = Arc::new(RecordingGit::default());
    let pool = ProviderPool::new().with_provider(ProviderKind::Mock, "scripted", provider.clone());
    let executor = PlanExecutor::new(
        Arc::new(SafeFs::new(dir.path())),
        git.clone(),
        Arc::new(StaticSearch),
    );
    let agent = CodingAgent::new(pool, executor).with_system_prompt("SYSTEM");
    Harness {
        agent,
        provider,
        git,
        dir,
    }
}

#[tokio::test]
async fn test_ask_appends_user_then_assistant() {
    let mut h = harness(vec![Ok("Hi! How can I help?".to_string())]);
    let before = h.agent.history().len();

    let text = h.agent.ask("hello").await.unwrap();
    assert_eq!(text, "Hi! How can I help?");

    let history = h.agent.history();
    assert_eq!(history.len(), before + 2);
    assert_eq!(history[before], Message::user("hello"));
    assert_eq!(history[before + 1].role, Role::Assistant);
    assert_eq!(history[before + 1].content, "Hi! How can I help?");
    assert_eq!(h.agent.phase(), AgentPhase::Idle);
}

#[tokio::test]
async fn test_history_is_replayed_in_order() {
    let mut h = harness(vec![Ok("a1".to_string()), Ok("a2".to_string())]);
    h.agent.ask("q1").await.unwrap();
    h.agent.ask("q2").await.unwrap();

    assert_eq!(
        h.provider.last_messages(),
        vec![
            Message::system("SYSTEM"),
            Message::user("q1"),
            Message::assistant("a1"),
            Message::user("q2"),
        ]
    );
}

#[tokio::test]
async fn test_reset_history_leaves_only_system_and_user() {
    let mut h = harness(vec![Ok("a1".to_string()), Ok("a2".to_string())]);
    h.agent.ask("q1").await.unwrap();
    h.agent.reset_history();
    assert!(h.agent.history().is_empty());

    h.agent.ask("fresh").await.unwrap();
    assert_eq!(
        h.provider.last_messages(),
        vec![Message::system("SYSTEM"), Message::user("fresh")]
    );
}

#[tokio::test]
async fn test_plan_is_executed_and_transcript_recorded() {
    let reply = r#"Sure, here is the plan:
```json
{"explanation": "create and commit", "actions": [
  {"type": "write_file", "path": "src/lib.rs", "content": "pub fn add() {}"},
  {"type": "read_file", "path": "src/lib.rs"},
  {"type": "git_commit", "message": "Add lib"},
  {"type": "web_search", "query": "rust"}
]}
```"#;
    let mut h = harness(vec![Ok(reply.to_string())]);

    let out = h.agent.ask_detailed("make a lib").await.unwrap();
    assert_eq!(out.outcome, ReplyOutcome::Executed);
    assert!(out.executed());
    let lines: Vec<&str> = out.text.split('\n').collect();
    assert_eq!(lines[0], "Agent Plan: create and commit");
    assert_eq!(lines[1], "✓ Wrote `src/lib.rs`.");
    assert_eq!(lines[2], "Read `src/lib.rs`:");
    assert!(out.text.contains("```\npub fn add() {}\n```"));
    assert!(out.text.contains("✓ Git commit: Add lib"));
    assert!(out.text.ends_with("Web search for 'rust':\nrust is great\n\nTop Links:\nhttps://example.com"));

    assert_eq!(
        std::fs::read_to_string(h.dir.path().join("src/lib.rs")).unwrap(),
        "pub fn add() {}"
    );
    assert_eq!(*h.git.commits.lock().unwrap(), vec!["Add lib".to_string()]);
    assert_eq!(h.agent.history()[1].content, out.text);
}

#[tokio::test]
async fn test_fault_mid_plan_falls_back_to_raw_reply() {
    let reply = r#"{"explanation": "three", "actions": [
  {"type": "write_file", "path": "first.txt", "content": "1"},
  {"type": "read_file", "path": "does/not/exist.txt"},
  {"type": "git_commit", "message": "never"}
]}"#;
    let mut h = harness(vec![Ok(reply.to_string())]);

    let out = h.agent.ask_detailed("do three things").await.unwrap();
    assert_eq!(out.text, reply);
    assert!(matches!(out.outcome, ReplyOutcome::PlanFailed(ref why) if why.contains("read_file")));
    assert!(!out.text.contains("Agent Plan:"));

    // 第一个行动的副作用保留
    assert!(h.dir.path().join("first.txt").exists());
    assert!(h.git.commits.lock().unwrap().is_empty());
    assert_eq!(h.agent.history()[1].content, reply);
}

#[tokio::test]
async fn test_malformed_plan_is_reported_as_failed_plan() {
    let reply = r#"{"explanation": "x", "actions": [{"type": "write_file", "path": "a.txt"}]}"#;
    let mut h = harness(vec![Ok(reply.to_string())]);

    let out = h.agent.ask_detailed("write").await.unwrap();
    assert_eq!(out.text, reply);
    assert!(matches!(out.outcome, ReplyOutcome::PlanFailed(_)));
    assert!(!h.dir.path().join("a.txt").exists());
}

#[tokio::test]
async fn test_unknown_actions_are_ignored() {
    let reply = r#"{"explanation": "future", "actions": [{"type": "deploy", "env": "prod"}]}"#;
    let mut h = harness(vec![Ok(reply.to_string())]);

    let out = h.agent.ask_detailed("deploy").await.unwrap();
    assert_eq!(out.outcome, ReplyOutcome::Executed);
    assert_eq!(out.text, "Agent Plan: future");
}

#[tokio::test]
async fn test_exhaustion_surfaces_error_and_keeps_history() {
    let mut h = harness(vec![
        Ok("first".to_string()),
        Err(LlmError::Unavailable("429 Too Many Requests".to_string())),
    ]);
    h.agent.ask("one").await.unwrap();
    let before = h.agent.history().to_vec();

    let err = h.agent.ask("two").await.unwrap_err();
    assert!(err.is_exhausted());
    assert!(err.to_string().contains("429"));
    assert_eq!(h.agent.history(), before.as_slice());
    assert_eq!(h.agent.phase(), AgentPhase::Idle);

    // 会话仍可继续
    h.provider.push(Ok("back".to_string()));
    assert_eq!(h.agent.ask("three").await.unwrap(), "back");
    assert_eq!(h.agent.history().len(), 4);
    assert_eq!(h.provider.calls(), 3);
}

#[tokio::test]
async fn test_failover_across_providers_inside_ask() {
    let dir = tempfile::tempdir().unwrap();
    let down = ScriptedProvider::new(vec![Err(LlmError::Unavailable("quota".to_string()))]);
    let up = ScriptedProvider::new(vec![Ok("from backup".to_string())]);
    let pool = ProviderPool::new()
        .with_provider(ProviderKind::Groq, "llama", down.clone())
        .with_provider(ProviderKind::Google, "gemini", up.clone());
    let executor = PlanExecutor::new(
        Arc::new(SafeFs::new(dir.path())),
        Arc::new(RecordingGit::default()),
        Arc::new(StaticSearch),
    );
    let mut agent = CodingAgent::new(pool, executor);

    assert_eq!(agent.ask("hi").await.unwrap(), "from backup");
    assert_eq!(agent.current_model().unwrap().key, "google_1");
    assert_eq!(down.calls(), 1);
    assert_eq!(up.calls(), 1);
}

#[tokio::test]
async fn test_token_usage_tracks_provider_calls() {
    let mut h = harness(vec![Ok("a1".to_string()), Ok("a2".to_string())]);
    assert_eq!(h.agent.token_usage(), (0, 0, 0));

    h.agent.ask("q1").await.unwrap();
    h.agent.ask("q2").await.unwrap();
    assert_eq!(h.agent.token_usage(), (20, 10, 30));
}
