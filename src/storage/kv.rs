//! Synchronous key-value stores

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::KeyValueStore;

#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// All entries in one JSON object file, rewritten on every change
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileKeyValueStore {
    /// Open the file, treating a missing file as empty
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read key-value store {:?}", path))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse key-value store {:?}", path))?
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), entries = entries.len(), "Opened key-value store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize key-value store")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write key-value store {:?}", self.path))?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "Persisted key-value store");
        Ok(())
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
