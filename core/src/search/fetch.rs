use crate::traits::PageFetcher;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(12);
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 50;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Fetches pages over HTTP and keeps only their paragraph text.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    min_chars: usize,
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT, DEFAULT_MIN_CONTENT_CHARS)
    }
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, min_chars: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self { client, min_chars }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, "fetch failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(%url, status = %response.status(), "fetch returned non-success status");
            return None;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(%url, "failed to read body: {e}");
                return None;
            }
        };

        let text = extract_paragraph_text(&body, self.min_chars);
        if text.is_none() {
            debug!(%url, "page had too little paragraph text");
        }
        text
    }
}

/// Joins the text of every `<p>` element with newlines, collapsing inner
/// whitespace. Returns `None` unless the result is longer than `min_chars`.
pub fn extract_paragraph_text(html: &str, min_chars: usize) -> Option<String> {
    let document = Html::parse_document(html);
    let paragraph = Selector::parse("p").ok()?;

    let text = document
        .select(&paragraph)
        .map(|p| {
            p.text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (text.chars().count() > min_chars).then_some(text)
}
