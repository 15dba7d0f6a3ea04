//! In-memory storage backend

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::Storage;
use crate::error::DroverResult;

/// In-memory storage, used by tests and short-lived embeddings
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_value(&self, key: &str) -> DroverResult<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: Value) -> DroverResult<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> DroverResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
