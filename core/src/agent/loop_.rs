use crate::agent::dispatch::{
    ToolName, parse_arguments, required_argument, tool_specs, unknown_tool_reply,
};
use crate::agent::{ContextBuilder, Services};
use crate::error::AgentError;
use crate::memory::{extract_fact, has_save_intent};
use crate::tools::describe_now;
use crate::traits::{ChatMessage, ChatRequest, ToolCall, ToolSpec};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AssemblingContext,
    AwaitingModel,
    DispatchingTool,
    Summarizing,
    Done,
}

#[derive(Debug)]
struct Turn {
    state: TurnState,
}

impl Turn {
    fn start() -> Self {
        debug!(state = ?TurnState::AssemblingContext, "turn started");
        Self {
            state: TurnState::AssemblingContext,
        }
    }

    fn advance(&mut self, next: TurnState) {
        debug!(from = ?self.state, to = ?next, "turn state");
        self.state = next;
    }
}

/// Runs one conversation turn at a time against the shared [`Services`].
pub struct AgentLoop {
    services: Services,
    context_builder: ContextBuilder,
    tool_specs: Vec<ToolSpec>,
}

impl AgentLoop {
    pub fn new(services: Services) -> Self {
        let context_builder =
            ContextBuilder::new(services.facts.clone(), services.clock.zone_label.clone());
        Self {
            services,
            context_builder,
            tool_specs: tool_specs(),
        }
    }

    pub async fn process(&self, message: &str) -> Result<String> {
        self.process_with_history(message, &[]).await
    }

    /// One full turn. `history` is prior user/assistant messages, oldest
    /// first. Fact capture happens before and independently of the model
    /// call; an explicit "remember ..." ends the turn right there.
    pub async fn process_with_history(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<String> {
        let mut turn = Turn::start();
        let messages = self.context_builder.build_messages(history, message).await;

        if let Some(confirmation) = self.remember(message).await? {
            turn.advance(TurnState::Done);
            return Ok(confirmation);
        }

        turn.advance(TurnState::AwaitingModel);
        let response = self
            .services
            .provider
            .chat(ChatRequest::with_tools(&messages, &self.tool_specs))
            .await?;

        let Some(call) = response.tool_calls.first() else {
            turn.advance(TurnState::Done);
            return Ok(response.text.unwrap_or_default());
        };
        if response.tool_calls.len() > 1 {
            debug!(
                requested = response.tool_calls.len(),
                "model requested several tools, honoring only the first"
            );
        }

        turn.advance(TurnState::DispatchingTool);
        let reply = self.dispatch(call, &mut turn).await;
        turn.advance(TurnState::Done);
        reply
    }

    /// Stores any fact found in `message`. Returns a confirmation when the
    /// user explicitly asked for it to be remembered.
    async fn remember(&self, message: &str) -> Result<Option<String>> {
        let Some(fact) = extract_fact(message) else {
            return Ok(None);
        };
        if fact.value.is_empty() {
            debug!(key = %fact.key, "not storing fact with empty value");
            return Ok(None);
        }

        self.services
            .facts
            .upsert(&self.services.fact_category, &fact.key, &fact.value)
            .await
            .with_context(|| format!("Failed to store fact '{}'", fact.key))?;
        info!(key = %fact.key, store = self.services.facts.name(), "stored fact");

        if has_save_intent(message) {
            Ok(Some(format!(
                "Got it, I'll remember that {} is {}.",
                fact.spoken_key(),
                fact.value
            )))
        } else {
            Ok(None)
        }
    }

    async fn dispatch(&self, call: &ToolCall, turn: &mut Turn) -> Result<String> {
        let Some(tool) = ToolName::from_name(&call.name) else {
            warn!(tool = %call.name, "model requested an unknown tool");
            return Ok(unknown_tool_reply(&call.name));
        };
        let args = parse_arguments(tool, &call.arguments)?;
        debug!(tool = tool.as_str(), "dispatching tool call");

        match tool {
            ToolName::CoinInfo => {
                let query = required_argument(tool, &args)?;
                let info = self
                    .services
                    .coin_primary
                    .coin_info(&query)
                    .await
                    .map_err(|source| tool_failure(tool, source))?;
                Ok(format!("Here's the latest on {query}:\n{info}"))
            }
            ToolName::CoinInfoCmc => {
                let query = required_argument(tool, &args)?;
                let info = self
                    .services
                    .coin_fallback
                    .coin_info(&query)
                    .await
                    .map_err(|source| tool_failure(tool, source))?;
                Ok(format!("CoinMarketCap data for {query}:\n{info}"))
            }
            ToolName::BraveSearch | ToolName::DuckDuckGoSearch => {
                let query = required_argument(tool, &args)?;
                turn.advance(TurnState::Summarizing);
                self.services.search.answer(&query).await
            }
            ToolName::RunCode => {
                let payload = required_argument(tool, &args)?;
                let output = self
                    .services
                    .code_runner
                    .run(&payload)
                    .await
                    .map_err(|source| tool_failure(tool, source))?;
                Ok(format!("Code output:\n{output}"))
            }
            ToolName::DateTime => Ok(describe_now(&self.services.clock)),
        }
    }
}

fn tool_failure(tool: ToolName, source: anyhow::Error) -> AgentError {
    AgentError::Tool {
        tool: tool.as_str().to_string(),
        source,
    }
}
