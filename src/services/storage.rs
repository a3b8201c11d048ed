// File-backed key/value storage
//
// All keys live in one JSON object (`storage.json`) under the data
// directory. The map is read lazily on first access and cached; every write
// updates the cache and rewrites the whole file, so the file on disk always
// matches the last completed write.

use super::traits::{FileSystem, StorageService};
use crate::error::{Result, SmartPlanError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const STORAGE_FILE: &str = "storage.json";
const CORRUPT_BACKUP_FILE: &str = "storage.corrupt.json";

/// Key/value store persisted as a single JSON object
///
/// Usage:
///     let fs = Arc::new(RealFileSystem);
///     let storage = FileStorageService::new(fs, PathBuf::from("data"));
///     storage.set_item("smart_plan_auth", "true").await?;
pub struct FileStorageService {
    fs: Arc<dyn FileSystem>,
    base_path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileStorageService {
    /// The base directory is created on first write.
    pub fn new(fs: Arc<dyn FileSystem>, base_path: PathBuf) -> Self {
        Self {
            fs,
            base_path,
            cache: Mutex::new(None),
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.base_path.join(STORAGE_FILE)
    }

    async fn ensure_base_dir(&self) -> Result<()> {
        if !self.fs.exists(&self.base_path).await {
            self.fs.create_dir_all(&self.base_path).await?;
        }
        Ok(())
    }

    /// Read storage.json, keeping a copy aside if it cannot be parsed
    async fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let path = self.storage_path();
        if !self.fs.exists(&path).await {
            return Ok(BTreeMap::new());
        }

        let content = self.fs.read_to_string(&path).await?;
        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!("Storage file {:?} is corrupt ({}), starting empty", path, e);
                let backup = self.base_path.join(CORRUPT_BACKUP_FILE);
                if let Err(e) = self.fs.write(&backup, &content).await {
                    tracing::warn!("Failed to back up corrupt storage: {}", e);
                }
                Ok(BTreeMap::new())
            }
        }
    }

    async fn flush(&self, map: &BTreeMap<String, String>) -> Result<()> {
        self.ensure_base_dir().await?;
        let content = serde_json::to_string_pretty(map).map_err(|e| {
            SmartPlanError::StorageError(format!("Failed to serialize storage: {}", e))
        })?;
        self.fs.write(&self.storage_path(), &content).await
    }

    /// Apply `update` to the cached map and flush it
    async fn mutate<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let mut guard = self.cache.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_map().await?);
        }
        let map = guard.get_or_insert_with(BTreeMap::new);
        update(map);
        self.flush(map).await
    }
}

#[async_trait]
impl StorageService for FileStorageService {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let mut guard = self.cache.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_map().await?);
        }
        Ok(guard.as_ref().and_then(|map| map.get(key).cloned()))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.mutate(move |map| {
            map.insert(key, value);
        })
        .await
    }

    async fn set_items(&self, entries: &[(String, String)]) -> Result<()> {
        let entries = entries.to_vec();
        self.mutate(move |map| {
            map.extend(entries);
        })
        .await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.mutate(move |map| {
            map.remove(&key);
        })
        .await
    }
}
