//! Storage backends for project documents
//!
//! Two shapes share one key convention (`pages/` prefix, JSON text values):
//! - **key-value**: synchronous, the legacy location, only read for migration
//! - **structured**: asynchronous, where projects live now

use anyhow::{Context, Result};
use serde_json::Value;

mod kv;
mod structured;

pub use kv::{JsonFileKeyValueStore, MemoryKeyValueStore};
pub use structured::{DirectoryStore, MemoryStructuredStore};

use crate::constants::storage::NAMESPACE;

pub trait KeyValueStore {
    fn keys(&self) -> Result<Vec<String>>;
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait StructuredStore {
    /// Every `(key, value)` pair in the store
    async fn entries(&self) -> Result<Vec<(String, String)>>;
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

pub fn is_namespaced(key: &str) -> bool {
    key.starts_with(NAMESPACE)
}

/// Namespaced entries of a key-value store, parsed
pub fn pages_from_key_value(store: &impl KeyValueStore) -> Result<Vec<(String, Value)>> {
    let mut pages = Vec::new();
    for key in store.keys()?.into_iter().filter(|key| is_namespaced(key)) {
        if let Some(raw) = store.get(&key)? {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse stored page {:?}", key))?;
            pages.push((key, value));
        }
    }
    Ok(pages)
}

/// Namespaced entries of a structured store, parsed
pub async fn pages_from_database(store: &impl StructuredStore) -> Result<Vec<(String, Value)>> {
    store
        .entries()
        .await?
        .into_iter()
        .filter(|(key, _)| is_namespaced(key))
        .map(|(key, raw)| {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse stored page {:?}", key))?;
            Ok((key, value))
        })
        .collect()
}
