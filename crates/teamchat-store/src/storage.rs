//! Key-value persistence seam.
//!
//! The [`Store`](crate::Store) only ever reads and writes whole JSON
//! documents by key, so any string-to-string map can back it.  Two
//! implementations ship with the crate: [`SqliteStorage`](crate::SqliteStorage)
//! for on-disk state and [`MemoryStorage`] for tests and throwaway sessions.

use std::collections::HashMap;

use crate::error::Result;

/// Minimal string key-value storage.
pub trait KvStorage: Send {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`.  Returns `true` if a value was removed.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// Delete every key starting with `prefix`.  Returns the number removed.
    fn clear_prefix(&mut self, prefix: &str) -> Result<usize>;
}

/// Volatile in-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn clear_prefix(&mut self, prefix: &str) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|k, _| !k.starts_with(prefix));
        Ok(before - self.entries.len())
    }
}
