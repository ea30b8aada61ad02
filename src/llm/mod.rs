//! LLM 层：客户端抽象、OpenAI 兼容实现、Mock、带故障切换的 Provider 池

pub mod kind;
pub mod mock;
pub mod openai;
pub mod pool;
pub mod traits;

pub use kind::ProviderKind;
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use pool::{ProviderDescriptor, ProviderPool};
pub use traits::{LlmClient, LlmError};
