pub mod agent;
pub mod config;
pub mod error;
pub mod memory;
pub mod providers;
pub mod search;
pub mod tools;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{AgentLoop, ContextBuilder, Services, ToolName};
pub use config::*;
pub use error::AgentError;
pub use memory::{
    InMemoryFactStore, JsonFactStore, SupabaseFactStore, create_fact_store, extract_fact,
    has_save_intent, normalize_key,
};
pub use providers::{OpenAIProvider, create_provider};
pub use search::{HybridSearch, SearchAggregator, SearchOutcome};
pub use tools::{create_code_runner, create_market_sources};
pub use traits::*;
