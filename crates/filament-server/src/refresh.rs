//! Build-and-persist, shared by the read path, manual refresh, and the scheduler.

use filament_core::Snapshot;
use filament_scraper::scrape_all;
use filament_store::StoreError;

use crate::api::AppState;

/// Scrape the whole catalog and replace the stored snapshot.
///
/// Concurrent callers each build their own snapshot; the last write wins.
pub async fn refresh_snapshot(state: &AppState) -> Result<Snapshot, StoreError> {
    let snapshot = scrape_all(&state.fetcher, &state.catalog).await;
    state.store.put(&snapshot).await?;
    Ok(snapshot)
}

/// The stored snapshot, or a freshly built one when nothing live is stored.
pub async fn load_or_refresh(state: &AppState) -> Result<Snapshot, StoreError> {
    if let Some(snapshot) = state.store.get().await? {
        tracing::debug!(updated_at = %snapshot.updated_at, "serving stored snapshot");
        return Ok(snapshot);
    }
    tracing::info!("no stored snapshot; building one");
    refresh_snapshot(state).await
}
