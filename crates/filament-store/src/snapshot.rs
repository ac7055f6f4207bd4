//! The snapshot cache: one slot, key `"latest"`, bounded retention.

use std::sync::Arc;
use std::time::Duration;

use filament_core::Snapshot;

use crate::{KeyValueStore, StoreError};

pub const SNAPSHOT_KEY: &str = "latest";

/// Seven days.
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Holds at most one [`Snapshot`]. A snapshot is either returned in full or
/// absent; expiry is indistinguishable from never having been written.
#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            ttl: DEFAULT_SNAPSHOT_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backend fails or the stored text is
    /// not a valid snapshot document.
    pub async fn get(&self) -> Result<Option<Snapshot>, StoreError> {
        let Some(text) = self.backend.get(SNAPSHOT_KEY).await? else {
            return Ok(None);
        };
        let snapshot = serde_json::from_str(&text).map_err(|source| StoreError::Decode {
            key: SNAPSHOT_KEY.to_owned(),
            source,
        })?;
        Ok(Some(snapshot))
    }

    /// Replaces the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if encoding or the backend write fails.
    pub async fn put(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let text = serde_json::to_string(snapshot).map_err(|source| StoreError::Encode {
            key: SNAPSHOT_KEY.to_owned(),
            source,
        })?;
        self.backend.put(SNAPSHOT_KEY, text, self.ttl).await?;
        tracing::info!(
            rows = snapshot.rows.len(),
            updated_at = %snapshot.updated_at,
            "snapshot stored"
        );
        Ok(())
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
