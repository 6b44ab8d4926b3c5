//! In-memory storage backend

use parking_lot::Mutex;
use std::collections::HashMap;

use super::{KeyValueStorage, Result};

/// Process-local key-value map
///
/// Contents vanish with the process. Cloning is not supported; share one
/// instance through `Arc` when two stores must see the same tier.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys present
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no key is present
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
