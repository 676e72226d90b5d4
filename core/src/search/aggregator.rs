use crate::search::normalize_url;
use crate::traits::{PageFetcher, SearchProvider};
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_MAX_URLS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub url: String,
    pub text: String,
}

/// Result of a two-provider search. The two empty cases stay distinct so
/// the caller can tell "nothing found" from "found but unreadable".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    NoResults,
    NoContent { urls: Vec<String> },
    Pages(Vec<ScrapedPage>),
}

/// Queries two search providers side by side, merges their URLs and
/// scrapes every surviving page concurrently. Each provider call and each
/// page fetch runs in its own task; a failure or panic in one only empties
/// that task's contribution.
pub struct SearchAggregator {
    primary: Arc<dyn SearchProvider>,
    secondary: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    max_urls: usize,
}

impl SearchAggregator {
    pub fn new(
        primary: Arc<dyn SearchProvider>,
        secondary: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            primary,
            secondary,
            fetcher,
            max_urls: DEFAULT_MAX_URLS,
        }
    }

    pub fn with_max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = max_urls;
        self
    }

    /// Candidate URLs from both providers, primary first. A provider that
    /// errors or panics contributes nothing.
    pub async fn collect_urls(&self, query: &str) -> Vec<String> {
        let (primary, secondary) = tokio::join!(
            run_provider(self.primary.clone(), query),
            run_provider(self.secondary.clone(), query),
        );
        merge_result_lines(&[primary.as_str(), secondary.as_str()], self.max_urls)
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let urls = self.collect_urls(query).await;
        if urls.is_empty() {
            debug!(%query, "no candidate urls");
            return SearchOutcome::NoResults;
        }

        let texts = join_all(
            urls.iter()
                .map(|url| run_fetch(self.fetcher.clone(), url.clone())),
        )
        .await;
        let pages: Vec<ScrapedPage> = urls
            .iter()
            .zip(texts)
            .filter_map(|(url, text)| {
                text.map(|text| ScrapedPage {
                    url: url.clone(),
                    text,
                })
            })
            .collect();

        debug!(%query, candidates = urls.len(), scraped = pages.len(), "search finished");
        if pages.is_empty() {
            SearchOutcome::NoContent { urls }
        } else {
            SearchOutcome::Pages(pages)
        }
    }
}

async fn run_provider(provider: Arc<dyn SearchProvider>, query: &str) -> String {
    let name = provider.name().to_string();
    let query = query.to_string();
    let task = tokio::spawn(async move { provider.search(&query).await });

    match task.await {
        Ok(Ok(lines)) => lines,
        Ok(Err(e)) => {
            warn!(provider = %name, "search provider failed: {e:#}");
            String::new()
        }
        Err(e) => {
            warn!(provider = %name, "search provider task died: {e}");
            String::new()
        }
    }
}

/// One page per task, so a fetcher that panics on one URL only loses that
/// URL's text.
async fn run_fetch(fetcher: Arc<dyn PageFetcher>, url: String) -> Option<String> {
    let task = tokio::spawn({
        let url = url.clone();
        async move { fetcher.fetch(&url).await }
    });

    match task.await {
        Ok(text) => text,
        Err(e) => {
            warn!(%url, "page fetch task died: {e}");
            None
        }
    }
}

/// Keeps lines mentioning `"http"`, normalizes them and deduplicates by
/// exact match in first-seen order, stopping at `max_urls`.
pub fn merge_result_lines(outputs: &[&str], max_urls: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    outputs
        .iter()
        .flat_map(|output| output.lines())
        .filter(|line| line.contains("http"))
        .map(normalize_url)
        .filter(|url| seen.insert(url.clone()))
        .take(max_urls)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingSearch, InFlight, MapFetcher, PanickingSearch, StaticSearch};
    use std::time::Duration;

    fn aggregator(
        primary: Arc<dyn SearchProvider>,
        secondary: Arc<dyn SearchProvider>,
        fetcher: MapFetcher,
    ) -> SearchAggregator {
        SearchAggregator::new(primary, secondary, Arc::new(fetcher))
    }

    #[test]
    fn merge_keeps_first_seen_order() {
        let a = "Result one - https://u1.com\nResult two - https://u2.com";
        let b = "https://u2.com\nno link on this line\nhttps://u3.com";
        assert_eq!(
            merge_result_lines(&[a, b], DEFAULT_MAX_URLS),
            vec!["https://u1.com", "https://u2.com", "https://u3.com"]
        );
    }

    #[test]
    fn merge_dedups_after_normalizing() {
        let a = "https://u1.com/?utm_source=x";
        let b = "- https://u1.com/";
        assert_eq!(merge_result_lines(&[a, b], 8), vec!["https://u1.com/"]);
    }

    #[test]
    fn merge_caps_result_count() {
        let lines: String = (0..20).map(|i| format!("https://site{i}.com\n")).collect();
        let urls = merge_result_lines(&[lines.as_str(), ""], 8);
        assert_eq!(urls.len(), 8);
        assert_eq!(urls[0], "https://site0.com");
        assert_eq!(urls[7], "https://site7.com");
    }

    #[tokio::test]
    async fn failing_provider_does_not_block_the_other() {
        let agg = aggregator(
            Arc::new(FailingSearch),
            Arc::new(StaticSearch::new("ddg", "https://u3.com")),
            MapFetcher::default(),
        );
        assert_eq!(agg.collect_urls("q").await, vec!["https://u3.com"]);
    }

    #[tokio::test]
    async fn panicking_provider_is_isolated() {
        let agg = aggregator(
            Arc::new(StaticSearch::new("brave", "https://u1.com")),
            Arc::new(PanickingSearch),
            MapFetcher::default(),
        );
        assert_eq!(agg.collect_urls("q").await, vec!["https://u1.com"]);
    }

    #[tokio::test]
    async fn no_urls_is_no_results() {
        let agg = aggregator(
            Arc::new(FailingSearch),
            Arc::new(StaticSearch::new("ddg", "nothing useful here")),
            MapFetcher::default(),
        );
        assert_eq!(agg.search("q").await, SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn unreadable_pages_are_no_content() {
        let agg = aggregator(
            Arc::new(StaticSearch::new("brave", "https://u1.com\nhttps://u2.com")),
            Arc::new(FailingSearch),
            MapFetcher::default(),
        );
        assert_eq!(
            agg.search("q").await,
            SearchOutcome::NoContent {
                urls: vec!["https://u1.com".into(), "https://u2.com".into()]
            }
        );
    }

    #[tokio::test]
    async fn only_scraped_pages_pass_through_in_order() {
        let fetcher = MapFetcher::default()
            .with_page("https://u3.com", "third page text")
            .with_page("https://u1.com", "first page text");
        let agg = aggregator(
            Arc::new(StaticSearch::new("brave", "https://u1.com\nhttps://u2.com")),
            Arc::new(StaticSearch::new("ddg", "https://u2.com\nhttps://u3.com")),
            fetcher,
        );

        let SearchOutcome::Pages(pages) = agg.search("q").await else {
            panic!("expected pages");
        };
        let urls: Vec<_> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://u1.com", "https://u3.com"]);
        assert_eq!(pages[1].text, "third page text");
    }

    #[tokio::test]
    async fn pages_are_fetched_concurrently() {
        let fetcher = MapFetcher::default()
            .with_page("https://a.com", "a")
            .with_page("https://b.com", "b")
            .with_delay(Duration::from_millis(200));
        let counter = fetcher.clone();
        let agg = aggregator(
            Arc::new(StaticSearch::new("brave", "https://a.com\nhttps://b.com")),
            Arc::new(FailingSearch),
            fetcher,
        );

        let outcome = agg.search("q").await;
        assert!(matches!(outcome, SearchOutcome::Pages(ref p) if p.len() == 2));
        assert_eq!(counter.max_in_flight(), 2);
    }

    #[tokio::test]
    async fn providers_are_queried_concurrently() {
        let gauge = InFlight::default();
        let agg = aggregator(
            Arc::new(
                StaticSearch::new("brave", "https://u1.com")
                    .with_delay(Duration::from_millis(200), &gauge),
            ),
            Arc::new(
                StaticSearch::new("ddg", "https://u2.com")
                    .with_delay(Duration::from_millis(200), &gauge),
            ),
            MapFetcher::default(),
        );

        let urls = agg.collect_urls("q").await;

        assert_eq!(urls, vec!["https://u1.com", "https://u2.com"]);
        assert_eq!(gauge.peak(), 2);
    }

    #[tokio::test]
    async fn panicking_fetch_keeps_sibling_pages() {
        let fetcher = MapFetcher::default()
            .with_page("https://good.com", "good page text")
            .with_panic_on("https://bad.com");
        let agg = aggregator(
            Arc::new(StaticSearch::new("brave", "https://bad.com\nhttps://good.com")),
            Arc::new(FailingSearch),
            fetcher,
        );

        assert_eq!(
            agg.search("q").await,
            SearchOutcome::Pages(vec![ScrapedPage {
                url: "https://good.com".into(),
                text: "good page text".into(),
            }])
        );
    }
}
