use crate::search::ScrapedPage;
use crate::traits::{ChatMessage, ChatRequest, Provider};
use anyhow::Result;
use std::sync::Arc;

const PAGE_DELIMITER: &str = "\n\n---\n\n";

/// Folds scraped pages into one answer with a single model call.
pub struct Summarizer {
    provider: Arc<dyn Provider>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub async fn summarize(&self, query: &str, pages: &[ScrapedPage]) -> Result<String> {
        let messages = [
            ChatMessage::system(format!(
                "You are a smart agent. Summarize these multiple articles into one coherent, \
                 concise update about '{query}'."
            )),
            ChatMessage::user(bundle_pages(pages)),
        ];

        let response = self.provider.chat(ChatRequest::plain(&messages)).await?;
        Ok(format_answer(query, response.text_or_empty().trim(), pages))
    }
}

fn bundle_pages(pages: &[ScrapedPage]) -> String {
    pages
        .iter()
        .map(|page| format!("From {}:\n{}", page.url, page.text))
        .collect::<Vec<_>>()
        .join(PAGE_DELIMITER)
}

/// Header, summary body, then one source line per page that contributed.
pub fn format_answer(query: &str, summary: &str, pages: &[ScrapedPage]) -> String {
    let sources = pages
        .iter()
        .map(|page| format!("- {}", page.url))
        .collect::<Vec<_>>()
        .join("\n");

    format!("🔍 Combined update on **{query}**:\n\n{summary}\n\n**Sources:**\n{sources}")
}
