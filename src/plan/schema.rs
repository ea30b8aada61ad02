//! 行动计划 JSON Schema 生成（schemars）
//!
//! 将合法计划的结构注入 system prompt，减少模型输出格式错误。

use schemars::{schema_for, JsonSchema};

/// 计划格式（仅用于 Schema 生成，与 ActionPlan 的反序列化结构一致）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct PlanFormat {
    /// 对计划的简短说明
    pub explanation: String,
    /// 按顺序执行的行动
    pub actions: Vec<ActionFormat>,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ActionFormat {
    /// 读取工作区内的文件
    ReadFile { path: String },
    /// 写入（覆盖）工作区内的文件
    WriteFile { path: String, content: String },
    /// 暂存全部改动并提交
    GitCommit { message: String },
    /// 实时网页搜索
    WebSearch { query: String },
}

/// 返回行动计划的 JSON Schema 字符串，可拼入 system prompt
pub fn plan_schema_json() -> String {
    let schema = schema_for!(PlanFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
