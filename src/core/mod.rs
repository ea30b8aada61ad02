//! 核心层：错误、状态机阶段、组件装配

pub mod error;
pub mod orchestrator;
pub mod state;

pub use error::AgentError;
pub use orchestrator::{build_provider_pool, create_agent};
pub use state::AgentPhase;
