//! Checkpoint manager

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::config::EngineConfig;
use crate::error::{DroverError, DroverResult};
use crate::llm::Content;

const FILE_PREFIX: &str = "checkpoint-";
const FILE_SUFFIX: &str = ".json";

/// A saved conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub tag: String,
    pub created_at: DateTime<Utc>,
    pub history: Vec<Content>,
}

/// Saves and restores tagged histories as JSON files in one directory
///
/// ```text
/// dir/
///   checkpoint-<encoded tag>.json
/// ```
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Manager for the configured checkpoint directory
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.checkpoint_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, tag: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", FILE_PREFIX, encode_tag(tag), FILE_SUFFIX))
    }

    /// Save `history` under `tag`, replacing any earlier checkpoint with that tag
    pub async fn save_checkpoint(&self, history: &[Content], tag: &str) -> DroverResult<()> {
        if tag.is_empty() {
            return Err(DroverError::validation_field("checkpoint tag must not be empty", "tag"));
        }

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            DroverError::storage_with_context(
                format!("Failed to create checkpoint directory: {}", e),
                self.dir.display().to_string(),
            )
        })?;

        let checkpoint = Checkpoint {
            tag: tag.to_string(),
            created_at: Utc::now(),
            history: history.to_vec(),
        };
        let body = serde_json::to_string_pretty(&checkpoint)?;

        let path = self.path_for(tag);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .await
            .map_err(|e| DroverError::storage(format!("Failed to write checkpoint: {}", e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| DroverError::storage(format!("Failed to write checkpoint: {}", e)))?;

        tracing::debug!(tag = %tag, entries = history.len(), "Saved checkpoint");
        Ok(())
    }

    /// History saved under `tag`, or `None` if there is none
    pub async fn load_checkpoint(&self, tag: &str) -> DroverResult<Option<Vec<Content>>> {
        let path = self.path_for(tag);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DroverError::storage_with_context(
                    format!("Failed to read checkpoint: {}", e),
                    path.display().to_string(),
                ));
            }
        };

        let checkpoint: Checkpoint = serde_json::from_str(&content).map_err(|e| {
            DroverError::storage_with_context(
                format!("Checkpoint is not valid: {}", e),
                path.display().to_string(),
            )
        })?;
        Ok(Some(checkpoint.history))
    }

    /// Tags of all saved checkpoints, sorted
    pub async fn list_checkpoints(&self) -> DroverResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DroverError::storage(format!("Failed to list checkpoints: {}", e))),
        };

        let mut tags = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(encoded) = name
                .strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            {
                match decode_tag(encoded) {
                    Some(tag) => tags.push(tag),
                    None => tracing::warn!(file = %name, "Skipping checkpoint with malformed name"),
                }
            }
        }
        tags.sort();
        Ok(tags)
    }

    /// Delete the checkpoint saved under `tag`; returns whether one existed
    pub async fn delete_checkpoint(&self, tag: &str) -> DroverResult<bool> {
        match fs::remove_file(self.path_for(tag)).await {
            Ok(()) => {
                tracing::debug!(tag = %tag, "Deleted checkpoint");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DroverError::storage(format!("Failed to delete checkpoint: {}", e))),
        }
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_-]`
fn encode_tag(tag: &str) -> String {
    let mut encoded = String::with_capacity(tag.len());
    for byte in tag.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

fn decode_tag(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_encoding() {
        assert_eq!(encode_tag("plain-tag_1"), "plain-tag_1");
        assert_eq!(encode_tag("a/b c"), "a%2Fb%20c");
        assert_eq!(decode_tag("a%2Fb%20c").as_deref(), Some("a/b c"));
        assert_eq!(decode_tag(&encode_tag("ünï")).as_deref(), Some("ünï"));
        assert!(decode_tag("bad%2").is_none());
    }
}
