use crate::app_config::{AppConfig, MapDefaults, RatingFallback};
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
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if required values are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let cms_base_url = require("LOCFINDER_CMS_BASE_URL")?;
    // An empty token is treated the same as a missing one.
    let mapbox_token = lookup("LOCFINDER_MAPBOX_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let log_level = or_default("LOCFINDER_LOG_LEVEL", "info");
    let language = or_default("LOCFINDER_LANGUAGE", "en");
    let geocoder_country = or_default("LOCFINDER_GEOCODER_COUNTRY", "ae");
    let geocoder_limit = parse_u32("LOCFINDER_GEOCODER_LIMIT", "10")?;
    let geocoder_proximity = or_default("LOCFINDER_GEOCODER_PROXIMITY", "25.276987,55.296249");
    let search_debounce_ms = parse_u64("LOCFINDER_SEARCH_DEBOUNCE_MS", "500")?;
    let search_min_query_len = parse_usize("LOCFINDER_SEARCH_MIN_QUERY_LEN", "3")?;
    let request_timeout_secs = parse_u64("LOCFINDER_REQUEST_TIMEOUT_SECS", "30")?;
    let cms_max_retries = parse_u32("LOCFINDER_CMS_MAX_RETRIES", "2")?;
    let cms_retry_backoff_ms = parse_u64("LOCFINDER_CMS_RETRY_BACKOFF_MS", "500")?;
    let rating_fallback =
        parse_rating_fallback(&or_default("LOCFINDER_RATING_FALLBACK", "placeholder"))
            .ok_or_else(|| ConfigError::InvalidEnvVar {
                var: "LOCFINDER_RATING_FALLBACK".to_string(),
                reason: "expected \"placeholder\" or \"omit\"".to_string(),
            })?;

    Ok(AppConfig {
        log_level,
        cms_base_url,
        mapbox_token,
        language,
        geocoder_country,
        geocoder_limit,
        geocoder_proximity,
        search_debounce_ms,
        search_min_query_len,
        request_timeout_secs,
        cms_max_retries,
        cms_retry_backoff_ms,
        rating_fallback,
        map: MapDefaults::default(),
    })
}

fn parse_rating_fallback(s: &str) -> Option<RatingFallback> {
    match s.trim().to_ascii_lowercase().as_str() {
        "placeholder" => Some(RatingFallback::Placeholder),
        "omit" => Some(RatingFallback::Omit),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
