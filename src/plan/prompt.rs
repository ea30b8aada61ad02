//! System prompt：整个会话固定不变，列出行动计划的 JSON 结构

use std::path::Path;

use super::schema::plan_schema_json;

const INTRO: &str = "You are Codeius, an advanced AI coding agent with the following tools:
- Read and write source files in the workspace
- Perform git operations (stage, commit)
- Perform real-time web searches via a search API
When you need to take action, reply with JSON using this structure:
{
 \"explanation\": \"Describe your plan\",
 \"actions\": [
   {\"type\": \"read_file\",  \"path\": \"...\"},
   {\"type\": \"write_file\", \"path\": \"...\", \"content\": \"...\"},
   {\"type\": \"git_commit\", \"message\": \"...\"},
   {\"type\": \"web_search\", \"query\": \"...\"}
 ]
}";

const OUTRO: &str = "If only a conversation or non-code answer is needed, reply conversationally.";

/// 内置 system prompt（含 schemars 生成的 Schema）
pub fn default_system_prompt() -> String {
    format!(
        "{}\nJSON Schema of the plan:\n{}\n{}",
        INTRO,
        plan_schema_json(),
        OUTRO
    )
}

/// 优先读取自定义文件，其次 config/prompts/system.txt，都不存在时使用内置 prompt
pub fn load_system_prompt(custom: Option<&Path>) -> String {
    let custom = custom.and_then(|p| match std::fs::read_to_string(p) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(path = %p.display(), error = %e, "system prompt file unreadable, using default");
            None
        }
    });
    custom
        .or_else(|| {
            ["config/prompts/system.txt", "../config/prompts/system.txt"]
                .into_iter()
                .find_map(|p| std::fs::read_to_string(p).ok())
        })
        .unwrap_or_else(default_system_prompt)
}
