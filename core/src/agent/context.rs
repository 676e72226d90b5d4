use crate::traits::{ChatMessage, Fact, FactStore};
use std::fmt::Write;
use std::sync::Arc;
use tracing::warn;

const NO_FACTS: &str = "No stored facts yet.";

const SYSTEM_IDENTITY: &str = "\
You are Rebo, the user's AI partner, co-developer, and assistant.
You speak naturally and helpfully, not like a robot.
You are intelligent, curious, and think before acting.
You can run Python code, fetch crypto prices, and search the web.
Only use tools when necessary. If you're unsure what the user meant, ask them to clarify.
Do not overuse web search. Only search when a real answer requires fresh or external info.
Summarize web results conversationally. If no good sources are found, say so honestly.";

/// Builds the message list for one model call: persona and known facts in
/// the system message, then prior turns, then the new user message.
pub struct ContextBuilder {
    facts: Arc<dyn FactStore>,
    zone_label: String,
}

impl ContextBuilder {
    pub fn new(facts: Arc<dyn FactStore>, zone_label: impl Into<String>) -> Self {
        Self {
            facts,
            zone_label: zone_label.into(),
        }
    }

    /// `key: value` per line in store order.
    pub fn facts_block(facts: &[Fact]) -> String {
        if facts.is_empty() {
            return NO_FACTS.to_string();
        }
        let mut block = String::new();
        for (i, fact) in facts.iter().enumerate() {
            if i > 0 {
                block.push('\n');
            }
            let _ = write!(block, "{}: {}", fact.key, fact.value);
        }
        block
    }

    pub fn system_prompt(&self, facts: &[Fact]) -> String {
        format!(
            "{SYSTEM_IDENTITY}\nAssume the {} timezone when giving date and time.\n\nKnown facts:\n{}",
            self.zone_label,
            Self::facts_block(facts)
        )
    }

    /// A failing fact store degrades to an empty fact block rather than
    /// failing the turn.
    pub async fn build_system_prompt(&self) -> String {
        let facts = match self.facts.all().await {
            Ok(facts) => facts,
            Err(e) => {
                warn!("Failed to load facts from {}: {e:#}", self.facts.name());
                vec![]
            }
        };
        self.system_prompt(&facts)
    }

    pub async fn build_messages(
        &self,
        history: &[ChatMessage],
        current_message: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.build_system_prompt().await));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(current_message));
        messages
    }
}
