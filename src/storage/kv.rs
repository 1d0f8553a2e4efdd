use std::{collections::HashMap, sync::RwLock};

use crate::errors::{AppError, AppResult};

/// String-keyed durable slots, the client-side equivalent of browser local storage.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> AppError {
    AppError::Storage("store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}
