pub mod context;
pub mod dispatch;
pub mod loop_;
pub mod services;

pub use context::ContextBuilder;
pub use dispatch::{ToolName, tool_specs};
pub use loop_::{AgentLoop, TurnState};
pub use services::Services;
