//! 协作者：文件读写、Git、网页搜索的接口与默认实现

pub mod capability;
pub mod filesystem;
pub mod git;
pub mod search;

pub use capability::{FileStore, VersionControl, WebSearch};
pub use filesystem::SafeFs;
pub use git::GitCli;
pub use search::{TavilySearch, TAVILY_ENDPOINT};
