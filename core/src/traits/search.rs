use async_trait::async_trait;

/// A web search backend. Returns raw newline-delimited result lines; only
/// some of them are expected to carry a URL.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> anyhow::Result<String>;
}

/// Downloads a page and returns its readable text, or `None` when the page
/// could not be fetched or had too little text to be useful.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}
