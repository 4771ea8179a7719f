//! The persistence boundary: a key-value store holding JSON text under fixed string keys.

use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// A string key-value store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing has been stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
impl<T> Store for Arc<T>
where
    T: Store + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
}

/// Stores each key as `<key>.json` in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        utils::read(&path).await.map(Some)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        utils::write_atomic(&self.path(key), value).await
    }
}

/// Keeps values in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("The memory store lock is poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("The memory store lock is poisoned"))?;
        let _ = values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and deserializes the value under `key`. A missing, unreadable or unparseable value
/// yields `T::default()`.
pub async fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: Store + ?Sized,
{
    match try_load(store, key).await {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!("Using the default value for '{key}': {e:#}");
            T::default()
        }
    }
}

async fn try_load<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let Some(json) = store.get(key).await.pub_result(ErrorType::StorageRead)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| anyhow!("Stored JSON under '{key}' is invalid: {e}"))
        .pub_result(ErrorType::StorageRead)
}

/// Serializes `value` and stores it under `key`.
pub async fn save<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
    S: Store + ?Sized,
{
    let json = serde_json::to_string(value).pub_result(ErrorType::StorageWrite)?;
    store
        .set(key, &json)
        .await
        .pub_result(ErrorType::StorageWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "[1,2]").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("k.json").is_file());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStore::new();
        let mut value = BTreeMap::new();
        value.insert("a".to_string(), 1u32);
        save(&store, "key", &value).await.unwrap();
        let loaded: BTreeMap<String, u32> = load_or_default(&store, "key").await;
        assert_eq!(loaded, value);
    }

    #[tokio::test]
    async fn test_corrupt_value_falls_back_to_default() {
        let store = MemoryStore::new();
        store.set("key", "{not json").await.unwrap();
        let loaded: BTreeMap<String, u32> = load_or_default(&store, "key").await;
        assert!(loaded.is_empty());

        let missing: Vec<u8> = load_or_default(&store, "missing").await;
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_value_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        // a directory where the file should be cannot be read as a string
        std::fs::create_dir(dir.path().join("key.json")).unwrap();
        let loaded: Vec<u8> = load_or_default(&store, "key").await;
        assert!(loaded.is_empty());
    }
}
