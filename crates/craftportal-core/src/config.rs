use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let backend_url = require("CRAFTPORTAL_BACKEND_URL")?;
    let website_id = require("CRAFTPORTAL_WEBSITE_ID")?;

    let env = parse_environment(&or_default("CRAFTPORTAL_ENV", "development"));

    let bind_addr = parse_addr("CRAFTPORTAL_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CRAFTPORTAL_LOG_LEVEL", "info");
    let api_token = lookup("CRAFTPORTAL_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let request_timeout_secs = parse_u64("CRAFTPORTAL_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CRAFTPORTAL_USER_AGENT", "craftportal/0.1");
    let status_api_url = or_default("CRAFTPORTAL_STATUS_API_URL", "https://mcapi.tr");
    let status_timeout_secs = parse_u64("CRAFTPORTAL_STATUS_TIMEOUT_SECS", "10")?;

    let rate_limit_max_requests = parse_usize("CRAFTPORTAL_RATE_LIMIT_MAX_REQUESTS", "120")?;
    let rate_limit_window_secs = parse_u64("CRAFTPORTAL_RATE_LIMIT_WINDOW_SECS", "60")?;
    if rate_limit_window_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CRAFTPORTAL_RATE_LIMIT_WINDOW_SECS".to_string(),
            reason: "window must be at least one second".to_string(),
        });
    }

    let cart_path = PathBuf::from(or_default(
        "CRAFTPORTAL_CART_PATH",
        "./.craftportal/cart.json",
    ));

    Ok(AppConfig {
        backend_url,
        website_id,
        env,
        bind_addr,
        log_level,
        api_token,
        request_timeout_secs,
        user_agent,
        status_api_url,
        status_timeout_secs,
        rate_limit_max_requests,
        rate_limit_window_secs,
        cart_path,
    })
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
