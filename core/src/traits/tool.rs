use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters_schema: serde_json::Value,
}

/// Live market data for a coin given by free-text name or symbol.
#[async_trait]
pub trait MarketData: Send + Sync {
    fn name(&self) -> &str;

    async fn coin_info(&self, query: &str) -> anyhow::Result<String>;
}

/// Sandboxed code execution. The payload is the raw text the model sent,
/// usually prefixed with a `run code:` trigger.
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(&self, payload: &str) -> anyhow::Result<String>;
}
