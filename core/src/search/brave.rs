use crate::traits::SearchProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

const BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";
const DEFAULT_COUNT: usize = 8;

#[derive(Debug, Deserialize)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    url: String,
}

/// Brave Web Search API. Without a subscription token every search fails,
/// which the aggregator treats as an empty contribution.
pub struct BraveSearchProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    count: usize,
}

impl BraveSearchProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            count: DEFAULT_COUNT,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}

fn render_lines(response: BraveResponse) -> String {
    response
        .web
        .map(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .map(|r| format!("{} - {}", r.title.trim(), r.url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl SearchProvider for BraveSearchProvider {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("Brave API key not configured")?;

        let count = self.count.to_string();
        let response = self
            .client
            .get(BRAVE_ENDPOINT)
            .query(&[("q", query), ("count", count.as_str())])
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Brave search request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Brave search error: {}", response.status());
        }

        let body: BraveResponse = response.json().await?;
        Ok(render_lines(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn one_line_per_result() {
        let body: BraveResponse = serde_json::from_value(json!({
            "web": {"results": [
                {"title": "Rust ", "url": "https://rust-lang.org"},
                {"url": "https://docs.rs"}
            ]}
        }))
        .unwrap();
        assert_eq!(
            render_lines(body),
            "Rust - https://rust-lang.org\n - https://docs.rs"
        );
    }

    #[test]
    fn missing_web_section_is_empty() {
        let body: BraveResponse = serde_json::from_value(json!({"query": {}})).unwrap();
        assert_eq!(render_lines(body), "");
    }

    #[tokio::test]
    async fn missing_key_fails() {
        let provider = BraveSearchProvider::new(None);
        let err = provider.search("rust").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
