//! Builds a full-catalog [`Snapshot`].

use chrono::Utc;
use filament_core::{CatalogEntry, Snapshot};
use futures::future::join_all;

use crate::fetch::PageFetcher;

/// Scrape every catalog entry concurrently and assemble a snapshot.
///
/// All fetches are in flight at once and the build waits for the slowest;
/// rows come back in catalog order regardless of completion order. There is
/// no per-entry retry and no early abort, so the result always has exactly
/// one row per entry. `updated_at` is the completion time.
pub async fn scrape_all(fetcher: &PageFetcher, catalog: &[CatalogEntry]) -> Snapshot {
    tracing::info!(entries = catalog.len(), "starting catalog scrape");

    let rows = join_all(catalog.iter().map(|entry| fetcher.fetch_one(entry))).await;
    let snapshot = Snapshot {
        updated_at: Utc::now(),
        rows,
    };

    tracing::info!(
        entries = snapshot.rows.len(),
        priced = snapshot.priced_count(),
        "catalog scrape complete"
    );
    snapshot
}
