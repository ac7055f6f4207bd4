use crate::app_config::{
    AppConfig, Environment, DEFAULT_REFRESH_CRON, DEFAULT_SNAPSHOT_TTL_SECS, DEFAULT_USER_AGENT,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates can leave a slot blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let env = parse_environment(&or_default("FILAMENT_ENV", "development"))?;

    let bind_addr = or_default("FILAMENT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("FILAMENT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("FILAMENT_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default(
        "FILAMENT_CATALOG_PATH",
        "./config/catalog.yaml",
    ));
    let update_token = optional("FILAMENT_UPDATE_TOKEN");
    let store_path = optional("FILAMENT_STORE_PATH").map(PathBuf::from);

    let snapshot_ttl_secs = or_default(
        "FILAMENT_SNAPSHOT_TTL_SECS",
        &DEFAULT_SNAPSHOT_TTL_SECS.to_string(),
    )
    .parse::<u64>()
    .map_err(|e| invalid("FILAMENT_SNAPSHOT_TTL_SECS", e.to_string()))?;
    if snapshot_ttl_secs == 0 {
        return Err(invalid(
            "FILAMENT_SNAPSHOT_TTL_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let refresh_cron = match lookup("FILAMENT_REFRESH_CRON") {
        Ok(raw) => Some(raw.trim().to_string()).filter(|v| !v.is_empty()),
        Err(_) => Some(DEFAULT_REFRESH_CRON.to_string()),
    };

    let scraper_user_agent = or_default("FILAMENT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_request_timeout_secs = optional("FILAMENT_SCRAPER_REQUEST_TIMEOUT_SECS")
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|e| invalid("FILAMENT_SCRAPER_REQUEST_TIMEOUT_SECS", e.to_string()))
        })
        .transpose()?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_path,
        update_token,
        store_path,
        snapshot_ttl_secs,
        refresh_cron,
        scraper_user_agent,
        scraper_request_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FILAMENT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
