use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Client identifier sent with every outbound product-page request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; P1SPriceTracker/1.0; +https://example.invalid)";

/// Retention window for the latest snapshot: 7 days.
pub const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// Every six hours, on the hour (seconds-resolution cron syntax).
pub const DEFAULT_REFRESH_CRON: &str = "0 0 */6 * * *";

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub catalog_path: PathBuf,
    /// Shared secret for the manual refresh path. `None` leaves it open.
    pub update_token: Option<String>,
    /// Directory for the file-backed snapshot store. `None` keeps snapshots in memory.
    pub store_path: Option<PathBuf>,
    pub snapshot_ttl_secs: u64,
    /// Cron expression for scheduled refreshes. `None` disables the job.
    pub refresh_cron: Option<String>,
    pub scraper_user_agent: String,
    pub scraper_request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field(
                "update_token",
                &self.update_token.as_ref().map(|_| "[redacted]"),
            )
            .field("store_path", &self.store_path)
            .field("snapshot_ttl_secs", &self.snapshot_ttl_secs)
            .field("refresh_cron", &self.refresh_cron)
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .finish()
    }
}
