use crate::core::Storage;
use crate::utils::error::{Result, SiteError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Namespaced cache key. Metadata and post entries never collide, even for equal ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    RepoMetadata(u64),
    ReleasePost(u64),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::RepoMetadata(id) => write!(f, "repo-meta:{}", id),
            CacheKey::ReleasePost(id) => write!(f, "release-post:{}", id),
        }
    }
}

/// Flat key -> JSON mapping, loaded once per run and persisted once per run.
///
/// Owned by the engine and lent out as `&mut CacheStore`; there is never more
/// than one writer, so no locking is needed.
#[derive(Debug, Default, Clone)]
pub struct CacheStore {
    entries: BTreeMap<String, serde_json::Value>,
    dirty: bool,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            entries,
            dirty: false,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&serde_json::Value> {
        self.entries.get(&key.to_string())
    }

    /// Typed read. An entry that no longer matches `T` is reported as absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    pub fn set(&mut self, key: &CacheKey, value: serde_json::Value) {
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
    }

    pub fn set_as<T: Serialize>(&mut self, key: &CacheKey, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn entries(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.entries
    }

    /// 讀取失敗或內容損毀都視為空快取，不會中斷執行
    pub async fn load_all<S: Storage>(storage: &S, path: &str) -> Self {
        let bytes = match storage.read_file(path).await {
            Ok(bytes) => bytes,
            Err(SiteError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No cache at {}, starting empty", path);
                return Self::new();
            }
            Err(e) => {
                tracing::warn!("Could not read cache {}: {}. Starting empty", path, e);
                return Self::new();
            }
        };

        match serde_json::from_slice::<BTreeMap<String, serde_json::Value>>(&bytes) {
            Ok(entries) => {
                tracing::info!("Loaded {} cache entries from {}", entries.len(), path);
                Self::from_entries(entries)
            }
            Err(e) => {
                tracing::warn!("Cache {} is corrupt ({}). Starting empty", path, e);
                Self::new()
            }
        }
    }

    pub async fn persist_all<S: Storage>(&mut self, storage: &S, path: &str) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.entries)?;
        storage
            .write_file(path, &data)
            .await
            .map_err(|e| SiteError::CacheError {
                message: format!("failed to write {}: {}", path, e),
            })?;
        self.dirty = false;
        tracing::debug!("Persisted {} cache entries to {}", self.entries.len(), path);
        Ok(())
    }
}
