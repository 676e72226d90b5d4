use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remembered key/value pair. `key` is unique across the store;
/// `category` only groups facts for listing and search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    pub category: String,
    pub key: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

impl Fact {
    pub fn new(category: &str, key: &str, value: &str) -> Self {
        Self {
            category: category.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Case-insensitive substring match against the value.
    pub fn matches(&self, category: Option<&str>, keyword: Option<&str>) -> bool {
        if let Some(category) = category
            && self.category != category
        {
            return false;
        }
        match keyword {
            Some(keyword) => self
                .value
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            None => true,
        }
    }
}

/// Key/value fact persistence.
///
/// Every operation is atomic on its own; there is no transaction spanning
/// calls. Concurrent upserts of the same key resolve as last write wins.
#[async_trait]
pub trait FactStore: Send + Sync {
    fn name(&self) -> &str;

    /// Updates the fact with `key` if present, inserts it otherwise. Always
    /// stamps the current time.
    async fn upsert(&self, category: &str, key: &str, value: &str) -> anyhow::Result<()>;

    async fn get(&self, key: &str) -> anyhow::Result<Option<Fact>>;

    /// Facts filtered by exact category and/or value substring, in store
    /// order. With both filters absent this returns every fact.
    async fn search(
        &self,
        category: Option<&str>,
        keyword: Option<&str>,
    ) -> anyhow::Result<Vec<Fact>>;

    async fn delete(&self, key: &str) -> anyhow::Result<()>;

    async fn all(&self) -> anyhow::Result<Vec<Fact>> {
        self.search(None, None).await
    }
}
