use crate::app_config::{AppConfig, Environment};
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
/// Parsing and validation live here, decoupled from the real environment, so
/// tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("PLACEFINDER_ENV", "development"))?;
    let log_level = or_default("PLACEFINDER_LOG_LEVEL", "info");
    let partners_path = PathBuf::from(or_default(
        "PLACEFINDER_PARTNERS_PATH",
        "./config/partners.yaml",
    ));
    let places_api_key = lookup("PLACEFINDER_PLACES_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let places_base_url = or_default(
        "PLACEFINDER_PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/place/",
    );

    let directory_timeout_ms = parse_positive_u64("PLACEFINDER_DIRECTORY_TIMEOUT_MS", "2000")?;
    let search_timeout_ms = parse_positive_u64("PLACEFINDER_SEARCH_TIMEOUT_MS", "5000")?;

    let default_result_limit = parse_usize("PLACEFINDER_DEFAULT_RESULT_LIMIT", "15")?;
    if default_result_limit == 0 {
        return Err(invalid(
            "PLACEFINDER_DEFAULT_RESULT_LIMIT",
            "must be greater than zero".to_string(),
        ));
    }

    let utc_offset_hours = or_default("PLACEFINDER_UTC_OFFSET_HOURS", "-5")
        .parse::<i32>()
        .map_err(|e| invalid("PLACEFINDER_UTC_OFFSET_HOURS", e.to_string()))?;
    if !(-12..=14).contains(&utc_offset_hours) {
        return Err(invalid(
            "PLACEFINDER_UTC_OFFSET_HOURS",
            format!("{utc_offset_hours} is outside -12..=14"),
        ));
    }

    let cache_max_entries = parse_usize("PLACEFINDER_CACHE_MAX_ENTRIES", "10000")?;
    let cache_sweep_interval_secs =
        parse_positive_u64("PLACEFINDER_CACHE_SWEEP_INTERVAL_SECS", "300")?;
    let cache_lodging_ttl_secs = parse_u64("PLACEFINDER_CACHE_LODGING_TTL_SECS", "604800")?;
    let cache_tourism_ttl_secs = parse_u64("PLACEFINDER_CACHE_TOURISM_TTL_SECS", "86400")?;
    let cache_proximity_ttl_secs = parse_u64("PLACEFINDER_CACHE_PROXIMITY_TTL_SECS", "1800")?;

    Ok(AppConfig {
        env,
        log_level,
        partners_path,
        places_api_key,
        places_base_url,
        directory_timeout_ms,
        search_timeout_ms,
        default_result_limit,
        utc_offset_hours,
        cache_max_entries,
        cache_sweep_interval_secs,
        cache_lodging_ttl_secs,
        cache_tourism_ttl_secs,
        cache_proximity_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PLACEFINDER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
