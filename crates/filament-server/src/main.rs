mod api;
mod middleware;
mod refresh;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use filament_scraper::PageFetcher;
use filament_store::{FileStore, KeyValueStore, MemoryStore, SnapshotStore};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RefreshAuth,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = filament_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let catalog = filament_core::load_catalog(&config.catalog_path)?;
    tracing::info!(
        entries = catalog.len(),
        path = %config.catalog_path.display(),
        env = %config.env,
        "catalog loaded"
    );

    let fetcher = PageFetcher::new(
        &config.scraper_user_agent,
        config.scraper_request_timeout_secs,
    )?;

    let backend: Arc<dyn KeyValueStore> = match &config.store_path {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using file-backed snapshot store");
            Arc::new(FileStore::open(dir).await?)
        }
        None => {
            tracing::info!("using in-memory snapshot store");
            Arc::new(MemoryStore::new())
        }
    };
    let store =
        SnapshotStore::new(backend).with_ttl(Duration::from_secs(config.snapshot_ttl_secs));

    let state = AppState {
        fetcher,
        catalog: Arc::new(catalog),
        store,
    };

    let _scheduler =
        scheduler::build_scheduler(state.clone(), config.refresh_cron.as_deref()).await?;

    let auth = RefreshAuth::new(config.update_token.clone());
    let app = build_app(state, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
