//! File-backed store: one JSON envelope per key under a directory.
//!
//! ```json
//! { "value": "...", "expiresAt": "2026-01-01T00:00:00Z" }
//! ```
//!
//! Writes go to a temp file in the same directory and are renamed over the
//! target, so readers never observe a half-written envelope.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{expiry_from_now, KeyValueStore, StoreError};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| io_error(&dir, source))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.entry_path(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key, "store miss");
                return Ok(None);
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode {
                key: key.to_owned(),
                source,
            })?;

        if envelope.expires_at <= Utc::now() {
            debug!(key, expired_at = %envelope.expires_at, "store entry expired");
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&path, e)),
            }
            return Ok(None);
        }

        debug!(key, "store hit");
        Ok(Some(envelope.value))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        let envelope = Envelope {
            value,
            expires_at: expiry_from_now(ttl),
        };
        let bytes = serde_json::to_vec(&envelope).map_err(|source| StoreError::Encode {
            key: key.to_owned(),
            source,
        })?;

        // Unique per write: concurrent puts to one key must not share a temp file.
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_error(&path, e));
        }

        debug!(key, path = %path.display(), expires_at = %envelope.expires_at, "store put");
        Ok(())
    }
}
