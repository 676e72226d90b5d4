use crate::memory::in_memory::upsert_into;
use crate::traits::{Fact, FactStore};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Facts persisted as a JSON array in a single file. Every mutation rewrites
/// the file; the mutex serializes writers within this process.
pub struct JsonFactStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFactStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> anyhow::Result<Vec<Fact>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(vec![]),
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse facts from {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read facts from {}", self.path.display())),
        }
    }

    async fn save(&self, facts: &[Fact]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(facts)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write facts to {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl FactStore for JsonFactStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn upsert(&self, category: &str, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut facts = self.load().await?;
        upsert_into(&mut facts, category, key, value);
        self.save(&facts).await
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Fact>> {
        let facts = self.load().await?;
        Ok(facts.into_iter().find(|f| f.key == key))
    }

    async fn search(
        &self,
        category: Option<&str>,
        keyword: Option<&str>,
    ) -> anyhow::Result<Vec<Fact>> {
        let facts = self.load().await?;
        Ok(facts
            .into_iter()
            .filter(|f| f.matches(category, keyword))
            .collect())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut facts = self.load().await?;
        let before = facts.len();
        facts.retain(|f| f.key != key);
        if facts.len() != before {
            self.save(&facts).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFactStore::new(tmp.path().join("facts.json"));
        assert!(store.all().await.unwrap().is_empty());
        assert!(store.get("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn facts_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("facts.json");

        let store = JsonFactStore::new(&path);
        store.upsert("general", "name", "Beau").await.unwrap();
        store.upsert("general", "coin", "ETH").await.unwrap();
        store.upsert("general", "name", "Rebo").await.unwrap();
        drop(store);

        let reopened = JsonFactStore::new(&path);
        let all = reopened.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, "name");
        assert_eq!(all[0].value, "Rebo");
        assert_eq!(all[1].key, "coin");
    }

    #[tokio::test]
    async fn delete_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("facts.json");
        let store = JsonFactStore::new(&path);
        store.upsert("general", "name", "Beau").await.unwrap();

        store.delete("name").await.unwrap();

        let reopened = JsonFactStore::new(&path);
        assert!(reopened.get("name").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("facts.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFactStore::new(&path);
        assert!(store.all().await.is_err());
    }
}
