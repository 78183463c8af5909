//! Durable key/value storage for user preferences.
//!
//! Preferences are small string values (`"unitSystem"`, `"theme"`, `"locale"`)
//! stored as a flat JSON object in the config directory. Reads never fail:
//! a missing, unreadable or corrupt file behaves like an empty store, and a
//! failed write keeps the value in memory for the rest of the session.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::StorageError;

/// String-keyed, string-valued preference storage.
pub trait PreferenceStore: Send + Sync {
    /// Read a value. `None` when absent or when storage is unavailable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value. The value is visible to later `get` calls even when
    /// the error is returned; only durability is lost.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile storage, used when no durable location exists and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-file storage with a write-through in-memory cache.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the preferences file at `path`, tolerating its absence.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match Self::read_file(&path) {
            Ok(values) => {
                tracing::debug!("Loaded {} preferences from {:?}", values.len(), path);
                values
            }
            Err(e) => {
                tracing::warn!("Preferences unavailable, starting empty: {}", e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let json =
            fs::read_to_string(path).map_err(|e| StorageError::Unavailable(e.to_string()))?;

        serde_json::from_str(&json).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    fn write_file(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(values)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        fs::write(&self.path, json).map_err(|e| StorageError::WriteFailed(e.to_string()))
    }
}

impl PreferenceStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut cache = self.cache.write();
        cache.insert(key.to_string(), value.to_string());
        self.write_file(&cache)?;
        tracing::debug!("Stored preference {}={}", key, value);
        Ok(())
    }
}
