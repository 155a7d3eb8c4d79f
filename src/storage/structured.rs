//! Asynchronous structured stores

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::StructuredStore;
use crate::constants::storage::ENTRY_EXTENSION;

#[derive(Debug, Default)]
pub struct MemoryStructuredStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStructuredStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StructuredStore for MemoryStructuredStore {
    async fn entries(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<encoded key>.json` file per entry inside a directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", encode_key(key), ENTRY_EXTENSION))
    }
}

/// Keys contain '/', which cannot appear in a file name
fn encode_key(key: &str) -> String {
    key.replace('%', "%25").replace('/', "%2F")
}

fn decode_key(name: &str) -> String {
    name.replace("%2F", "/").replace("%25", "%")
}

impl StructuredStore for DirectoryStore {
    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read store directory {:?}", self.root));
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .with_context(|| format!("Failed to list store directory {:?}", self.root))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(path = %path.display(), "Skipping store entry with non-UTF-8 name");
                continue;
            };

            let value = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read store entry {:?}", path))?;
            entries.push((decode_key(stem), value));
        }

        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(entries)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read store entry {:?}", path)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create store directory {:?}", self.root))?;

        let path = self.entry_path(key);
        fs::write(&path, value)
            .await
            .with_context(|| format!("Failed to write store entry {:?}", path))?;

        debug!(key, path = %path.display(), "Wrote store entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete store entry {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_encoding_reversible() {
        for key in ["pages/abc", "pages/a%2Fb", "plain", "a/b/c"] {
            assert_eq!(decode_key(&encode_key(key)), key);
        }
        assert!(!encode_key("pages/abc").contains('/'));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStructuredStore::new();
        store.set("pages/a", "1".to_string()).await.unwrap();
        assert_eq!(store.get("pages/a").await.unwrap().as_deref(), Some("1"));

        store.delete("pages/a").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_directory_store_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("db"));
        assert!(store.entries().await.unwrap().is_empty());
        assert!(store.get("pages/a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_store_set_get_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("db"));

        store.set("pages/b", r#"{"b":2}"#.to_string()).await.unwrap();
        store.set("pages/a", r#"{"a":1}"#.to_string()).await.unwrap();
        // Stray files are ignored
        std::fs::write(dir.path().join("db").join("notes.txt"), "x").unwrap();

        assert_eq!(store.get("pages/a").await.unwrap().as_deref(), Some(r#"{"a":1}"#));
        let keys: Vec<String> = store.entries().await.unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["pages/a", "pages/b"]);
    }

    #[tokio::test]
    async fn test_directory_store_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        store.set("pages/a", "{}".to_string()).await.unwrap();
        store.delete("pages/a").await.unwrap();
        store.delete("pages/a").await.unwrap();
        assert!(store.get("pages/a").await.unwrap().is_none());
    }
}
