//! JSON file storage backend

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;

use super::Storage;
use crate::error::{DroverError, DroverResult};

/// Storage backed by a single JSON object on disk
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename. Writers inside one process are serialized by an internal lock.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Create a file storage at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> DroverResult<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(DroverError::storage_with_context(
                    format!("Failed to read state file: {}", e),
                    self.path.display().to_string(),
                ));
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(DroverError::storage_with_context(
                "State file does not contain a JSON object",
                self.path.display().to_string(),
            )),
            Err(e) => Err(DroverError::storage_with_context(
                format!("State file is not valid JSON: {}", e),
                self.path.display().to_string(),
            )),
        }
    }

    async fn write_all(&self, map: Map<String, Value>) -> DroverResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    DroverError::storage(format!("Failed to create state directory: {}", e))
                })?;
            }
        }

        let body = serde_json::to_string_pretty(&Value::Object(map))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .map_err(|e| DroverError::storage(format!("Failed to write state file: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| DroverError::storage(format!("Failed to replace state file: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_value(&self, key: &str) -> DroverResult<Option<Value>> {
        let mut map = self.read_all().await?;
        Ok(map.remove(key))
    }

    async fn set_value(&self, key: &str, value: Value) -> DroverResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_all().await?;
        map.insert(key.to_string(), value);
        self.write_all(map).await?;
        tracing::debug!(key = key, path = %self.path.display(), "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> DroverResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_all().await?;
        if map.remove(key).is_some() {
            self.write_all(map).await?;
        }
        Ok(())
    }
}
