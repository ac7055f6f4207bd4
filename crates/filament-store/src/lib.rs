//! Time-bounded key-value storage and the single-slot snapshot cache built on it.

pub mod error;
pub mod file;
pub mod memory;
pub mod snapshot;

use std::time::Duration;

use async_trait::async_trait;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshot::{SnapshotStore, DEFAULT_SNAPSHOT_TTL, SNAPSHOT_KEY};

/// Text values keyed by string, each written with its own expiry.
///
/// An expired value reads as absent whether or not it was ever deleted.
/// Writes fully replace the previous value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the live value for `key`, or `None` if it is missing or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;
}

/// Absolute expiry for a value written now with `ttl`.
///
/// A ttl too large to represent saturates to the maximum timestamp.
pub(crate) fn expiry_from_now(ttl: Duration) -> chrono::DateTime<chrono::Utc> {
    let now = chrono::Utc::now();
    chrono::TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC)
}
