use crate::app_config::{AppConfig, Environment, GoogleAdsCredentials, SourceKind};
use crate::ConfigError;

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
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

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

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SOSB_ENV", "development"));

    let bind_addr = or_default("SOSB_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SOSB_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SOSB_LOG_LEVEL", "info");
    let brands_path = PathBuf::from(or_default("SOSB_BRANDS_PATH", "./config/brands.yaml"));
    let source = SourceKind::from_str(&or_default("SOSB_SOURCE", "synthetic"))
        .map_err(|e| invalid("SOSB_SOURCE", e))?;
    let synthetic_seed = parse_u64("SOSB_SYNTHETIC_SEED", "42")?;

    let ads_request_timeout_secs = parse_u64("SOSB_ADS_REQUEST_TIMEOUT_SECS", "30")?;
    let ads_max_retries = parse_u32("SOSB_ADS_MAX_RETRIES", "3")?;
    let ads_retry_backoff_base_ms = parse_u64("SOSB_ADS_RETRY_BACKOFF_BASE_MS", "1000")?;
    let ads_max_concurrent_brands = parse_usize("SOSB_ADS_MAX_CONCURRENT_BRANDS", "2")?;
    if ads_max_concurrent_brands == 0 {
        return Err(invalid(
            "SOSB_ADS_MAX_CONCURRENT_BRANDS",
            "must be at least 1".to_string(),
        ));
    }

    let google_ads = GoogleAdsCredentials {
        developer_token: optional("GOOGLE_DEVELOPER_TOKEN"),
        client_id: optional("GOOGLE_CLIENT_ID"),
        client_secret: optional("GOOGLE_CLIENT_SECRET"),
        refresh_token: optional("GOOGLE_REFRESH_TOKEN"),
        customer_id: optional("GOOGLE_CUSTOMER_ID").map(|id| id.replace('-', "")),
        login_customer_id: optional("GOOGLE_LOGIN_CUSTOMER_ID").map(|id| id.replace('-', "")),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        brands_path,
        source,
        synthetic_seed,
        ads_request_timeout_secs,
        ads_max_retries,
        ads_retry_backoff_base_ms,
        ads_max_concurrent_brands,
        google_ads,
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
