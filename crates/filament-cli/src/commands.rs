//! Command handlers, called from `main` once configuration is loaded.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use filament_core::{AppConfig, CatalogEntry};
use filament_scraper::{extract_price, scrape_all, PageFetcher};
use filament_store::{FileStore, SnapshotStore};

/// Scrape the configured catalog and print the snapshot.
///
/// With `persist`, the snapshot also replaces whatever the file store holds,
/// so a running server picks it up on its next read.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the HTTP client cannot
/// be built, `persist` is requested without `FILAMENT_STORE_PATH`, or the
/// store write fails.
pub(crate) async fn run_scrape(config: &AppConfig, persist: bool) -> anyhow::Result<()> {
    // Resolve the store first so a misconfiguration fails before any fetching.
    let store = if persist {
        let dir = config
            .store_path
            .as_ref()
            .context("--persist requires FILAMENT_STORE_PATH to be set")?;
        let backend = FileStore::open(dir)
            .await
            .with_context(|| format!("failed to open store at {}", dir.display()))?;
        Some(
            SnapshotStore::new(Arc::new(backend))
                .with_ttl(Duration::from_secs(config.snapshot_ttl_secs)),
        )
    } else {
        None
    };

    let catalog = filament_core::load_catalog(&config.catalog_path)?;
    let fetcher = PageFetcher::new(
        &config.scraper_user_agent,
        config.scraper_request_timeout_secs,
    )?;

    let snapshot = scrape_all(&fetcher, &catalog).await;

    if let Some(store) = store {
        store.put(&snapshot).await?;
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Print the observation the extractor finds in a saved page.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8 text.
pub(crate) fn run_extract(file: &Path) -> anyhow::Result<()> {
    let markup = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let observation = extract_price(&markup);
    if observation.price.is_none() {
        tracing::warn!(file = %file.display(), "no price found");
    }
    println!("{}", serde_json::to_string_pretty(&observation)?);
    Ok(())
}

/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) fn run_catalog(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = filament_core::load_catalog(&config.catalog_path)?;
    print!("{}", format_catalog(&catalog));
    Ok(())
}

/// One line per entry, in catalog order.
pub(crate) fn format_catalog(catalog: &[CatalogEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in catalog.iter().enumerate() {
        let abrasive = if entry.abrasive { " [abrasive]" } else { "" };
        let _ = writeln!(
            out,
            "{:>3}  {:<14} {:<8} {} ({} kg){abrasive}  {}",
            i + 1,
            entry.brand,
            entry.material.as_str(),
            entry.product,
            entry.weight_kg,
            entry.url,
        );
    }
    out
}
