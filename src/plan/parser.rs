//! 计划解析：从自由文本中提取行动计划
//!
//! 两段式：
//! 1. 取第一个 `{` 到最后一个 `}`（含）之间的子串，不做括号配对；
//! 2. 解析为 JSON，顶层含 `actions` 才算识别到计划，再按 Action 结构严格解码。
//!
//! 子串不是合法 JSON 或缺少 `actions` 都视为纯对话（Ok(None)）；
//! 识别到计划但行动不符合结构（缺字段、类型错）返回 PlanParseError。

use serde_json::Value;
use thiserror::Error;

use super::ActionPlan;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid action plan: {0}")]
pub struct PlanParseError(pub String);

/// 第一个 `{` 到最后一个 `}` 的切片；两者缺一或顺序颠倒时返回 None
pub fn extract_plan_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// 解析模型回复；见模块文档
pub fn parse_plan(text: &str) -> Result<Option<ActionPlan>, PlanParseError> {
    let Some(json_str) = extract_plan_json(text) else {
        return Ok(None);
    };

    let value: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "reply has braces but no parsable JSON, treating as conversation");
            return Ok(None);
        }
    };

    let has_actions = value
        .as_object()
        .map(|obj| obj.contains_key("actions"))
        .unwrap_or(false);
    if !has_actions {
        return Ok(None);
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| PlanParseError(e.to_string()))
}
