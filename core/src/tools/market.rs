use crate::traits::MarketData;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const COINMARKETCAP_BASE_URL: &str = "https://pro-api.coinmarketcap.com/v1";

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()
        .unwrap_or_default()
}

/// Provider-neutral snapshot of a coin's market numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinQuote {
    pub name: String,
    pub symbol: String,
    pub currency: String,
    pub price: f64,
    pub change_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
}

impl CoinQuote {
    pub fn render(&self) -> String {
        let currency = self.currency.to_uppercase();
        let mut lines = vec![
            format!("{} ({})", self.name, self.symbol.to_uppercase()),
            format!("Price: {} {}", format_amount(self.price), currency),
        ];
        if let Some(change) = self.change_24h {
            lines.push(format!("24h change: {change:+.2}%"));
        }
        if let Some(cap) = self.market_cap {
            lines.push(format!("Market cap: {} {}", format_amount(cap), currency));
        }
        if let Some(volume) = self.volume_24h {
            lines.push(format!("24h volume: {} {}", format_amount(volume), currency));
        }
        lines.join("\n")
    }
}

/// Two decimals with thousands separators; sub-unit prices keep six.
fn format_amount(value: f64) -> String {
    if value.abs() < 1.0 {
        return format!("{value:.6}");
    }
    let fixed = format!("{value:.2}");
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac}")
}

#[derive(Debug, Deserialize)]
struct GeckoSearch {
    #[serde(default)]
    coins: Vec<GeckoCoin>,
}

#[derive(Debug, Deserialize)]
struct GeckoCoin {
    id: String,
    name: String,
    symbol: String,
}

/// Keyless primary market-data source.
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(vs_currency: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: COINGECKO_BASE_URL.to_string(),
            vs_currency: vs_currency.into().to_lowercase(),
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .context("CoinGecko request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("CoinGecko error: {}", response.status());
        }
        Ok(response.json().await?)
    }

    fn quote_from_prices(&self, coin: &GeckoCoin, prices: &Value) -> Option<CoinQuote> {
        let entry = prices.get(&coin.id)?;
        let field = |suffix: &str| {
            entry
                .get(format!("{}{}", self.vs_currency, suffix))
                .and_then(Value::as_f64)
        };
        Some(CoinQuote {
            name: coin.name.clone(),
            symbol: coin.symbol.clone(),
            currency: self.vs_currency.clone(),
            price: field("")?,
            change_24h: field("_24h_change"),
            market_cap: field("_market_cap"),
            volume_24h: field("_24h_vol"),
        })
    }
}

#[async_trait]
impl MarketData for CoinGeckoClient {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn coin_info(&self, query: &str) -> Result<String> {
        let search: GeckoSearch =
            serde_json::from_value(self.get_json("/search", &[("query", query)]).await?)?;
        let Some(coin) = search.coins.into_iter().next() else {
            return Ok(format!("No coin found matching '{query}'."));
        };

        let prices = self
            .get_json(
                "/simple/price",
                &[
                    ("ids", coin.id.as_str()),
                    ("vs_currencies", self.vs_currency.as_str()),
                    ("include_market_cap", "true"),
                    ("include_24hr_vol", "true"),
                    ("include_24hr_change", "true"),
                ],
            )
            .await?;

        match self.quote_from_prices(&coin, &prices) {
            Some(quote) => Ok(quote.render()),
            None => Ok(format!("No price data available for {}.", coin.name)),
        }
    }
}

/// Keyed fallback market-data source.
pub struct CoinMarketCapClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    vs_currency: String,
}

impl CoinMarketCapClient {
    pub fn new(api_key: Option<String>, vs_currency: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: COINMARKETCAP_BASE_URL.to_string(),
            api_key,
            vs_currency: vs_currency.into().to_uppercase(),
        }
    }

    /// Short alphanumeric queries are symbols ("btc"); anything else is
    /// treated as a slug ("bitcoin cash" -> "bitcoin-cash").
    fn lookup_param(query: &str) -> (&'static str, String) {
        let trimmed = query.trim();
        if trimmed.len() <= 6 && trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            ("symbol", trimmed.to_uppercase())
        } else {
            ("slug", trimmed.to_lowercase().replace(' ', "-"))
        }
    }

    fn quote_from_response(&self, body: &Value) -> Option<CoinQuote> {
        let coin = body.get("data")?.as_object()?.values().next()?;
        let quote = coin.get("quote")?.get(&self.vs_currency)?;
        let number = |field: &str| quote.get(field).and_then(Value::as_f64);
        Some(CoinQuote {
            name: coin.get("name")?.as_str()?.to_string(),
            symbol: coin.get("symbol")?.as_str()?.to_string(),
            currency: self.vs_currency.clone(),
            price: number("price")?,
            change_24h: number("percent_change_24h"),
            market_cap: number("market_cap"),
            volume_24h: number("volume_24h"),
        })
    }
}

#[async_trait]
impl MarketData for CoinMarketCapClient {
    fn name(&self) -> &str {
        "coinmarketcap"
    }

    async fn coin_info(&self, query: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("CoinMarketCap API key not configured")?;
        let (param, value) = Self::lookup_param(query);

        let response = self
            .client
            .get(format!("{}/cryptocurrency/quotes/latest", self.base_url))
            .query(&[(param, value.as_str()), ("convert", self.vs_currency.as_str())])
            .header("X-CMC_PRO_API_KEY", api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("CoinMarketCap request failed")?;

        // Unknown symbols come back as 400 with an explanatory status body.
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Ok(format!("No coin found matching '{query}'."));
        }
        if !response.status().is_success() {
            anyhow::bail!("CoinMarketCap error: {}", response.status());
        }

        let body: Value = response.json().await?;
        match self.quote_from_response(&body) {
            Some(quote) => Ok(quote.render()),
            None => Ok(format!("No coin found matching '{query}'.")),
        }
    }
}
