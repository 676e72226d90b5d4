use crate::traits::SearchProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{Html, Selector};

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Scrapes DuckDuckGo's HTML results page; needs no key.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    max_results: usize,
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoProvider {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            max_results: 8,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// `title - url` lines from a results page. `Html` is not `Send`, so this
/// stays synchronous and is called after the body has been read.
fn parse_results(html: &str, max_results: usize) -> Result<String> {
    let document = Html::parse_document(html);
    let result_sel =
        Selector::parse(".result").map_err(|e| anyhow::anyhow!("bad selector: {e:?}"))?;
    let link_sel =
        Selector::parse("a.result__a").map_err(|e| anyhow::anyhow!("bad selector: {e:?}"))?;

    let lines = document
        .select(&result_sel)
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let url = resolve_result_href(link.value().attr("href")?)?;
            let title = link
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            Some(format!("{title} - {url}"))
        })
        .take(max_results)
        .collect::<Vec<_>>();

    Ok(lines.join("\n"))
}

/// Result links are usually redirects like
/// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
fn resolve_result_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;

    if let Some((_, target)) = parsed.query_pairs().find(|(k, _)| k == "uddg") {
        return Some(target.into_owned());
    }
    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .post(DDG_HTML_ENDPOINT)
            .form(&[("q", query)])
            .header("Accept", "text/html")
            .send()
            .await
            .context("DuckDuckGo request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("DuckDuckGo HTML search error: {}", response.status());
        }

        let body = response.text().await?;
        parse_results(&body, self.max_results)
    }
}
