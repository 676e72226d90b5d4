//! Fakes shared by unit tests across modules.

use crate::agent::Services;
use crate::config::ClockConfig;
use crate::search::{HybridSearch, SearchAggregator, Summarizer};
use crate::traits::{
    ChatMessage, ChatRequest, ChatResponse, CodeRunner, Fact, FactStore, MarketData, PageFetcher,
    Provider, SearchProvider, ToolCall,
};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn tool_call(name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

/// Replays canned responses in order and records every request it saw.
/// Running out of responses is an error.
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    tool_names: Mutex<Vec<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// Tool names offered on each request; empty when none were passed.
    pub fn tool_names(&self) -> Vec<Vec<String>> {
        self.tool_names.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> Result<ChatResponse> {
        self.requests
            .lock()
            .unwrap()
            .push(request.messages.to_vec());
        self.tool_names.lock().unwrap().push(
            request
                .tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.name.clone())
                .collect(),
        );
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => Ok(response),
            None => bail!("scripted provider has no more responses"),
        }
    }
}

/// Counts calls currently running and the peak seen. Clones share counts.
#[derive(Clone, Default)]
pub struct InFlight {
    now: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl InFlight {
    fn enter(&self) {
        let now = self.now.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.now.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct StaticSearch {
    name: String,
    lines: String,
    delay: Option<Duration>,
    gauge: InFlight,
}

impl StaticSearch {
    pub fn new(name: &str, lines: &str) -> Self {
        Self {
            name: name.to_string(),
            lines: lines.to_string(),
            delay: None,
            gauge: InFlight::default(),
        }
    }

    /// Sleeps for `delay` inside each call, tracked by `gauge`.
    pub fn with_delay(mut self, delay: Duration, gauge: &InFlight) -> Self {
        self.delay = Some(delay);
        self.gauge = gauge.clone();
        self
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str) -> Result<String> {
        self.gauge.enter();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.gauge.exit();
        Ok(self.lines.clone())
    }
}

pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str) -> Result<String> {
        bail!("search backend unavailable")
    }
}

pub struct PanickingSearch;

#[async_trait]
impl SearchProvider for PanickingSearch {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn search(&self, _query: &str) -> Result<String> {
        panic!("search backend blew up")
    }
}

/// Serves page text from a fixed map; unknown URLs fail to fetch. Clones
/// share the in-flight counters.
#[derive(Clone, Default)]
pub struct MapFetcher {
    pages: Arc<HashMap<String, String>>,
    delay: Option<Duration>,
    panic_on: Option<String>,
    gauge: InFlight,
}

impl MapFetcher {
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        Arc::make_mut(&mut self.pages).insert(url.to_string(), text.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_panic_on(mut self, url: &str) -> Self {
        self.panic_on = Some(url.to_string());
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.gauge.peak()
    }
}

#[async_trait]
impl PageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        self.gauge.enter();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.gauge.exit();
        if self.panic_on.as_deref() == Some(url) {
            panic!("fetcher blew up on {url}");
        }
        self.pages.get(url).cloned()
    }
}

pub struct BrokenFactStore;

#[async_trait]
impl FactStore for BrokenFactStore {
    fn name(&self) -> &str {
        "broken"
    }

    async fn upsert(&self, _category: &str, _key: &str, _value: &str) -> Result<()> {
        bail!("store offline")
    }

    async fn get(&self, _key: &str) -> Result<Option<Fact>> {
        bail!("store offline")
    }

    async fn search(&self, _category: Option<&str>, _keyword: Option<&str>) -> Result<Vec<Fact>> {
        bail!("store offline")
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        bail!("store offline")
    }
}

/// Answers `"{name} quote for {query}"`; the query `fail` errors.
pub struct StubMarket(pub &'static str);

#[async_trait]
impl MarketData for StubMarket {
    fn name(&self) -> &str {
        self.0
    }

    async fn coin_info(&self, query: &str) -> Result<String> {
        if query == "fail" {
            bail!("{} is down", self.0);
        }
        Ok(format!("{} quote for {query}", self.0))
    }
}

pub struct StubRunner;

#[async_trait]
impl CodeRunner for StubRunner {
    async fn run(&self, payload: &str) -> Result<String> {
        Ok(format!("ran: {payload}"))
    }
}

pub const TEST_PAGE_URL: &str = "https://news.example/rust";

/// Builds [`Services`] from fakes. Search returns [`TEST_PAGE_URL`] unless
/// told otherwise, and only that page is fetchable.
pub struct TestServices {
    provider: Arc<ScriptedProvider>,
    facts: Arc<dyn FactStore>,
    search_lines: String,
}

impl TestServices {
    pub fn new(provider: Arc<ScriptedProvider>, facts: Arc<dyn FactStore>) -> Self {
        Self {
            provider,
            facts,
            search_lines: format!("Rust news - {TEST_PAGE_URL}"),
        }
    }

    pub fn with_search_lines(mut self, lines: &str) -> Self {
        self.search_lines = lines.to_string();
        self
    }

    pub fn build(self) -> Services {
        let fetcher = MapFetcher::default().with_page(TEST_PAGE_URL, "Rust news text");
        let aggregator = SearchAggregator::new(
            Arc::new(StaticSearch::new("brave", &self.search_lines)),
            Arc::new(FailingSearch),
            Arc::new(fetcher),
        );
        let provider: Arc<dyn Provider> = self.provider;

        Services {
            provider: provider.clone(),
            facts: self.facts,
            search: HybridSearch::new(aggregator, Summarizer::new(provider)),
            coin_primary: Arc::new(StubMarket("primary")),
            coin_fallback: Arc::new(StubMarket("fallback")),
            code_runner: Arc::new(StubRunner),
            clock: ClockConfig::default(),
            fact_category: "general".to_string(),
        }
    }
}
