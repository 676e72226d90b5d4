pub mod memory;
pub mod provider;
pub mod search;
pub mod tool;

pub use memory::{Fact, FactStore};
pub use provider::{ChatMessage, ChatRequest, ChatResponse, Provider, Role, ToolCall, ToolChoice};
pub use search::{PageFetcher, SearchProvider};
pub use tool::{CodeRunner, MarketData, ToolSpec};
