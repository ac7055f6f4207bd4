use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{expiry_from_now, KeyValueStore, StoreError};

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        {
            let entries = self.inner.read().await;
            match entries.get(key) {
                None => {
                    debug!(key, "store miss");
                    return Ok(None);
                }
                Some(entry) if entry.expires_at > Utc::now() => {
                    debug!(key, "store hit");
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
            }
        }

        // Expired: drop it, unless a writer replaced it in the meantime.
        let mut entries = self.inner.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= Utc::now())
        {
            entries.remove(key);
            debug!(key, "store entry expired");
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let entry = Entry {
            value,
            expires_at: expiry_from_now(ttl),
        };
        self.inner.write().await.insert(key.to_owned(), entry);
        debug!(key, ttl_secs = ttl.as_secs(), "store put");
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}
