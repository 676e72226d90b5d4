use crate::config::{Config, MemoryBackend, resolve_secret};
use crate::memory::{InMemoryFactStore, JsonFactStore, SupabaseFactStore};
use crate::traits::FactStore;
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub fn create_fact_store(config: &Config) -> Result<Arc<dyn FactStore>> {
    match config.memory.backend {
        MemoryBackend::Json => Ok(Arc::new(JsonFactStore::new(config.memory_path()))),
        MemoryBackend::Memory => Ok(Arc::new(InMemoryFactStore::new())),
        MemoryBackend::Supabase => {
            let url = resolve_secret(&["SUPABASE_URL"], config.memory.supabase_url.as_deref())
                .ok_or_else(|| anyhow!("Supabase backend selected but no SUPABASE_URL set"))?;
            let key = resolve_secret(&["SUPABASE_KEY"], config.memory.supabase_key.as_deref())
                .ok_or_else(|| anyhow!("Supabase backend selected but no SUPABASE_KEY set"))?;
            Ok(Arc::new(SupabaseFactStore::new(
                &url,
                key,
                &config.memory.table,
            )))
        }
    }
}
