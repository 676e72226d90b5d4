use crate::traits::{Fact, FactStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Facts kept in a hosted Postgres table, reached through Supabase's
/// PostgREST endpoint. The table needs `category`, `key`, `value` and
/// `timestamp` text columns.
pub struct SupabaseFactStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct FactRow {
    #[serde(default)]
    category: Option<String>,
    key: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
struct FactWrite<'a> {
    category: &'a str,
    key: &'a str,
    value: &'a str,
    timestamp: String,
}

impl FactRow {
    fn into_fact(self) -> Fact {
        Fact {
            category: self.category.unwrap_or_default(),
            timestamp: self
                .timestamp
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_default(),
            key: self.key,
            value: self.value.unwrap_or_default(),
        }
    }
}

/// Accepts RFC 3339 and the naive ISO form older rows were written with.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            debug!("Unparseable fact timestamp {raw:?}: {e}");
            None
        }
    }
}

impl SupabaseFactStore {
    pub fn new(url: &str, api_key: impl Into<String>, table: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: format!("{}/rest/v1/{}", url.trim_end_matches('/'), table),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.endpoint)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, builder: reqwest::RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Supabase {action} request failed"))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Supabase {action} error {status}: {body}");
        }
        Ok(response)
    }

    async fn select(&self, filters: &[(&str, String)]) -> Result<Vec<Fact>> {
        let mut query = vec![("select", "*".to_string())];
        query.extend(filters.iter().cloned());

        let response = self
            .send(self.request(reqwest::Method::GET).query(&query), "select")
            .await?;
        let rows: Vec<FactRow> = response.json().await?;
        Ok(rows.into_iter().map(FactRow::into_fact).collect())
    }
}

#[async_trait]
impl FactStore for SupabaseFactStore {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn upsert(&self, category: &str, key: &str, value: &str) -> Result<()> {
        let body = FactWrite {
            category,
            key,
            value,
            timestamp: Utc::now().to_rfc3339(),
        };

        if self.get(key).await?.is_some() {
            let builder = self
                .request(reqwest::Method::PATCH)
                .query(&[("key", format!("eq.{key}"))])
                .json(&body);
            self.send(builder, "update").await?;
        } else {
            let builder = self.request(reqwest::Method::POST).json(&body);
            self.send(builder, "insert").await?;
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Fact>> {
        let facts = self.select(&[("key", format!("eq.{key}"))]).await?;
        Ok(facts.into_iter().next())
    }

    async fn search(&self, category: Option<&str>, keyword: Option<&str>) -> Result<Vec<Fact>> {
        let mut filters = vec![];
        if let Some(category) = category {
            filters.push(("category", format!("eq.{category}")));
        }
        if let Some(keyword) = keyword {
            filters.push(("value", format!("ilike.*{keyword}*")));
        }
        self.select(&filters).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let builder = self
            .request(reqwest::Method::DELETE)
            .query(&[("key", format!("eq.{key}"))]);
        self.send(builder, "delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_joins_table() {
        let store = SupabaseFactStore::new("https://abc.supabase.co/", "k", "memory");
        assert_eq!(store.endpoint, "https://abc.supabase.co/rest/v1/memory");
    }

    #[test]
    fn rows_with_naive_timestamps_parse() {
        let row: FactRow = serde_json::from_value(json!({
            "id": 7,
            "category": "general",
            "key": "name",
            "value": "Beau",
            "timestamp": "2025-05-01T12:30:00.123456"
        }))
        .unwrap();
        let fact = row.into_fact();

        assert_eq!(fact.key, "name");
        assert_eq!(fact.value, "Beau");
        assert_eq!(fact.timestamp.to_rfc3339(), "2025-05-01T12:30:00.123456+00:00");
    }

    #[test]
    fn rows_with_missing_columns_default() {
        let row: FactRow = serde_json::from_value(json!({"key": "k1", "timestamp": null})).unwrap();
        let fact = row.into_fact();
        assert_eq!(fact.category, "");
        assert_eq!(fact.value, "");
        assert_eq!(fact.timestamp, DateTime::<Utc>::default());
    }
}
