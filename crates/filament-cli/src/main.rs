mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use filament_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "filament-cli")]
#[command(about = "Filament price tracker command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape every catalog entry and print the snapshot as JSON
    Scrape {
        /// Also write the snapshot to the configured store
        #[arg(long)]
        persist: bool,
    },
    /// Run the price extractor over a saved HTML page
    Extract {
        /// Path to the saved page
        file: PathBuf,
    },
    /// List catalog entries in order
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        // Needs no configuration, so a broken environment does not block it.
        Commands::Extract { file } => {
            init_tracing("warn")?;
            commands::run_extract(&file)
        }
        Commands::Scrape { persist } => {
            let config = load_config()?;
            commands::run_scrape(&config, persist).await
        }
        Commands::Catalog => {
            let config = load_config()?;
            commands::run_catalog(&config)
        }
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = filament_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    Ok(config)
}

/// Logs go to stderr so stdout stays pipeable JSON.
fn init_tracing(fallback_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
