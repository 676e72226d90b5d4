use crate::config::{ClockConfig, Config, resolve_secret};
use crate::memory::create_fact_store;
use crate::providers::create_provider;
use crate::search::{
    BraveSearchProvider, DuckDuckGoProvider, HttpPageFetcher, HybridSearch, SearchAggregator,
    Summarizer,
};
use crate::tools::{create_code_runner, create_market_sources};
use crate::traits::{CodeRunner, FactStore, MarketData, Provider};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Every collaborator a conversation turn may touch. Built once at startup
/// and shared by all turns.
pub struct Services {
    pub provider: Arc<dyn Provider>,
    pub facts: Arc<dyn FactStore>,
    pub search: HybridSearch,
    pub coin_primary: Arc<dyn MarketData>,
    pub coin_fallback: Arc<dyn MarketData>,
    pub code_runner: Arc<dyn CodeRunner>,
    pub clock: ClockConfig,
    pub fact_category: String,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider: Arc<dyn Provider> = Arc::from(create_provider(config)?);
        let facts = create_fact_store(config)?;

        let brave_key = resolve_secret(&["BRAVE_API_KEY"], config.search.brave_api_key.as_deref());
        let fetcher = HttpPageFetcher::new(
            Duration::from_secs(config.search.fetch_timeout_secs),
            config.search.min_content_chars,
        );
        let aggregator = SearchAggregator::new(
            Arc::new(BraveSearchProvider::new(brave_key).with_count(config.search.max_urls)),
            Arc::new(DuckDuckGoProvider::new().with_max_results(config.search.max_urls)),
            Arc::new(fetcher),
        )
        .with_max_urls(config.search.max_urls);
        let search = HybridSearch::new(aggregator, Summarizer::new(provider.clone()));

        let (coin_primary, coin_fallback) = create_market_sources(config);

        Ok(Self {
            provider,
            facts,
            search,
            coin_primary,
            coin_fallback,
            code_runner: create_code_runner(config),
            clock: config.clock.clone(),
            fact_category: config.memory.default_category.clone(),
        })
    }
}
