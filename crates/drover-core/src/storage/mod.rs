//! Persisted key-value storage
//!
//! The approval store keeps its whole rule list under a single key. Backends
//! only need to provide raw JSON get/set; [`StorageExt`] adds typed access.

mod file_storage;
mod memory_storage;


use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DroverError, DroverResult};

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Raw key-value storage backend
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`
    async fn get_value(&self, key: &str) -> DroverResult<Option<Value>>;

    /// Replace the value stored under `key`
    async fn set_value(&self, key: &str, value: Value) -> DroverResult<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> DroverResult<()>;
}

/// Shared storage handle
pub type SharedStorage = Arc<dyn Storage>;

/// Typed access on top of [`Storage`]
#[async_trait]
pub trait StorageExt: Storage {
    /// Read and deserialize the value under `key`
    async fn get<T>(&self, key: &str) -> DroverResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_value(key).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                DroverError::storage_with_context(
                    format!("Stored value has unexpected shape: {}", e),
                    format!("Reading key '{}'", key),
                )
            }),
            None => Ok(None),
        }
    }

    /// Serialize and store `value` under `key`
    async fn set<T>(&self, key: &str, value: &T) -> DroverResult<()>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value).await
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}
