//! Local key/value storage.
//!
//! `FileStorageProvider` keeps every key in one pretty-printed JSON file:
//! - Linux: ~/.config/questboard/storage.json
//! - macOS: ~/Library/Application Support/io.questboard.questboard/storage.json
//! - Windows: C:\Users\<User>\AppData\Roaming\questboard\questboard\config\storage.json

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::infrastructure::ports::{StorageError, StorageProvider};

/// Fallback file name when no platform config directory is available.
const FALLBACK_STORAGE_FILE: &str = "questboard_storage.json";

/// Platform-specific default location of the storage file.
pub fn default_storage_path() -> PathBuf {
    match ProjectDirs::from("io", "questboard", "questboard") {
        Some(dirs) => dirs.config_dir().join("storage.json"),
        None => PathBuf::from(FALLBACK_STORAGE_FILE),
    }
}

/// File-backed storage with an in-memory copy of every value.
pub struct FileStorageProvider {
    storage_path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStorageProvider {
    /// Open the storage file, starting empty if it is missing or unreadable.
    pub fn open(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();
        let cache = read_storage_file(&storage_path);
        tracing::debug!(path = %storage_path.display(), keys = cache.len(), "Storage initialized");
        Self {
            storage_path,
            cache: RwLock::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    fn persist(&self, snapshot: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    tracing::error!(error = %e, "Failed to create storage directory");
                    StorageError::Io(e.to_string())
                })?;
            }
        }
        let data = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.storage_path, data).map_err(|e| {
            tracing::error!(error = %e, path = %self.storage_path.display(), "Failed to write storage file");
            StorageError::Io(e.to_string())
        })
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut HashMap<String, String>),
    ) -> Result<(), StorageError> {
        let mut guard = self
            .cache
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        let mut next = guard.clone();
        apply(&mut next);
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }
}

fn read_storage_file(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse storage file, starting empty");
                HashMap::new()
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read storage file, starting empty");
            HashMap::new()
        }
    }
}

impl StorageProvider for FileStorageProvider {
    fn load(&self, key: &str) -> Option<String> {
        match self.cache.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire read lock for storage");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

/// In-memory storage, gone when dropped.
#[derive(Default)]
pub struct MemoryStorageProvider {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageProvider for MemoryStorageProvider {
    fn load(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .remove(key);
        Ok(())
    }
}
