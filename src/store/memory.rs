//! In-process preference store.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{PreferenceStore, StoreError};
use crate::sync::lock;

/// A store that keeps values in memory for the life of the process.
///
/// This is the default store of a [`ThemeResolver`](crate::ThemeResolver)
/// and the usual substitute for a durable store in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `key = value`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        lock(&store.values).insert(key.to_string(), value.to_string());
        store
    }

    pub fn len(&self) -> usize {
        lock(&self.values).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.values).is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.values).remove(key);
        Ok(())
    }
}
