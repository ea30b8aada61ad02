//! 行动计划：数据模型、从回复中解析、按序执行、System prompt 与 Schema

pub mod action;
pub mod executor;
pub mod parser;
pub mod prompt;
pub mod schema;

pub use action::{Action, ActionPlan};
pub use executor::{ExecutionFault, PlanExecutor, Transcript};
pub use parser::{extract_plan_json, parse_plan, PlanParseError};
pub use prompt::{default_system_prompt, load_system_prompt};
pub use schema::plan_schema_json;
