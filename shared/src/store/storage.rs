//! Durable key-value storage the store persists into

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{NmpError, NmpResult};

/// Key the app state is saved under
pub const STATE_KEY: &str = "nmp-app-state";

/// Synchronous string storage, e.g. browser `localStorage` or a directory of files
pub trait DurableStorage {
    /// `Ok(None)` when nothing has been saved under `key`
    fn read(&self, key: &str) -> NmpResult<Option<String>>;

    fn write(&self, key: &str, value: &str) -> NmpResult<()>;
}

/// In-process storage for tests and headless use
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl DurableStorage for MemoryStorage {
    fn read(&self, key: &str) -> NmpResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| NmpError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> NmpResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| NmpError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
