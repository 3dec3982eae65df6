use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_REFRESH_CRON: &str = "0 0 */6 * * *";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("FOLIO_ENV", "development"));

    let bind_raw = or_default("FOLIO_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "FOLIO_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;

    let log_level = or_default("FOLIO_LOG_LEVEL", "info");
    let platforms_path = PathBuf::from(or_default(
        "FOLIO_PLATFORMS_PATH",
        "./config/platforms.yaml",
    ));

    let stats_request_timeout_secs = parse_u64("FOLIO_STATS_REQUEST_TIMEOUT_SECS", "10")?;
    let stats_connect_timeout_secs = parse_u64("FOLIO_STATS_CONNECT_TIMEOUT_SECS", "5")?;
    if stats_connect_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FOLIO_STATS_CONNECT_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let stats_user_agent = or_default("FOLIO_STATS_USER_AGENT", "folio/0.1 (achievements)");

    let refresh_cron = non_blank(or_default("FOLIO_REFRESH_CRON", DEFAULT_REFRESH_CRON));
    let api_keys = lookup("FOLIO_API_KEYS").ok().and_then(non_blank);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        platforms_path,
        stats_request_timeout_secs,
        stats_connect_timeout_secs,
        stats_user_agent,
        refresh_cron,
        api_keys,
    })
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
