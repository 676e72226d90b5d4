use crate::traits::{Fact, FactStore};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

/// Insertion-ordered, process-local fact store.
#[derive(Default)]
pub struct InMemoryFactStore {
    facts: RwLock<Vec<Fact>>,
}

impl InMemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Shared upsert semantics for the list-backed stores.
pub(crate) fn upsert_into(facts: &mut Vec<Fact>, category: &str, key: &str, value: &str) {
    match facts.iter_mut().find(|f| f.key == key) {
        Some(existing) => {
            existing.category = category.to_string();
            existing.value = value.to_string();
            existing.timestamp = Utc::now();
        }
        None => facts.push(Fact::new(category, key, value)),
    }
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upsert(&self, category: &str, key: &str, value: &str) -> anyhow::Result<()> {
        let mut facts = self.facts.write().await;
        upsert_into(&mut facts, category, key, value);
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Fact>> {
        let facts = self.facts.read().await;
        Ok(facts.iter().find(|f| f.key == key).cloned())
    }

    async fn search(
        &self,
        category: Option<&str>,
        keyword: Option<&str>,
    ) -> anyhow::Result<Vec<Fact>> {
        let facts = self.facts.read().await;
        Ok(facts
            .iter()
            .filter(|f| f.matches(category, keyword))
            .cloned()
            .collect())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.facts.write().await.retain(|f| f.key != key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_updates_existing_key_in_place() {
        let store = InMemoryFactStore::new();
        store.upsert("general", "pet", "cat").await.unwrap();
        store.upsert("general", "city", "Boston").await.unwrap();
        let before = store.get("pet").await.unwrap().unwrap().timestamp;

        store.upsert("animals", "pet", "dog").await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, "pet");
        assert_eq!(all[0].value, "dog");
        assert_eq!(all[0].category, "animals");
        assert!(all[0].timestamp >= before);
    }

    #[tokio::test]
    async fn search_filters_by_category_and_keyword() {
        let store = InMemoryFactStore::new();
        store.upsert("general", "color", "Deep Blue").await.unwrap();
        store.upsert("work", "team", "blue team").await.unwrap();
        store.upsert("work", "desk", "third floor").await.unwrap();

        let blue = store.search(None, Some("BLUE")).await.unwrap();
        assert_eq!(blue.len(), 2);

        let work_blue = store.search(Some("work"), Some("blue")).await.unwrap();
        assert_eq!(work_blue.len(), 1);
        assert_eq!(work_blue[0].key, "team");
    }

    #[tokio::test]
    async fn delete_removes_only_that_key() {
        let store = InMemoryFactStore::new();
        store.upsert("general", "a1", "x").await.unwrap();
        store.upsert("general", "b2", "y").await.unwrap();

        store.delete("a1").await.unwrap();
        store.delete("missing").await.unwrap();

        assert!(store.get("a1").await.unwrap().is_none());
        assert!(store.get("b2").await.unwrap().is_some());
    }
}
