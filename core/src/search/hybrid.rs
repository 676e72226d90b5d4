use crate::search::{SearchAggregator, SearchOutcome, Summarizer};
use anyhow::Result;

pub const NO_RESULTS_REPLY: &str = "No useful results found from either search provider.";
pub const NO_CONTENT_REPLY: &str = "I found links but couldn't extract useful content from them.";

/// Search, scrape and summarize: the whole web-search tool behind one call.
pub struct HybridSearch {
    aggregator: SearchAggregator,
    summarizer: Summarizer,
}

impl HybridSearch {
    pub fn new(aggregator: SearchAggregator, summarizer: Summarizer) -> Self {
        Self {
            aggregator,
            summarizer,
        }
    }

    /// Always ends in plain-language text; empty searches are not errors.
    /// Only a failed summarization call is.
    pub async fn answer(&self, query: &str) -> Result<String> {
        match self.aggregator.search(query).await {
            SearchOutcome::NoResults => Ok(NO_RESULTS_REPLY.to_string()),
            SearchOutcome::NoContent { .. } => Ok(NO_CONTENT_REPLY.to_string()),
            SearchOutcome::Pages(pages) => self.summarizer.summarize(query, &pages).await,
        }
    }
}
