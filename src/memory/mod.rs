//! 记忆层：会话历史与可选的 JSON 持久化

pub mod conversation;
pub mod persistence;

pub use conversation::{ConversationHistory, Message, Role};
pub use persistence::ConversationPersistence;
