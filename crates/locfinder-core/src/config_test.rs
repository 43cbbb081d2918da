use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("LOCFINDER_CMS_BASE_URL", "https://cms.example.com");
    m
}

#[test]
fn unknown_variables_are_ignored() {
    let mut map = full_env();
    map.insert("LOCFINDER_ENV", "production");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(debug.starts_with("AppConfig { log_level: \"info\""), "{debug}");
}

#[test]
fn build_app_config_fails_without_cms_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "LOCFINDER_CMS_BASE_URL"),
        "expected MissingEnvVar(LOCFINDER_CMS_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_cms_base_url_as_missing() {
    let mut map = HashMap::new();
    map.insert("LOCFINDER_CMS_BASE_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.mapbox_token.is_none());
    assert_eq!(cfg.language, "en");
    assert_eq!(cfg.geocoder_country, "ae");
    assert_eq!(cfg.geocoder_limit, 10);
    assert_eq!(cfg.geocoder_proximity, "25.276987,55.296249");
    assert_eq!(cfg.search_debounce_ms, 500);
    assert_eq!(cfg.search_min_query_len, 3);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.cms_max_retries, 2);
    assert_eq!(cfg.cms_retry_backoff_ms, 500);
    assert_eq!(cfg.rating_fallback, RatingFallback::Placeholder);
    assert!((cfg.map.zoom - 7.0).abs() < f64::EPSILON);
}

#[test]
fn build_app_config_reads_token() {
    let mut map = full_env();
    map.insert("LOCFINDER_MAPBOX_TOKEN", "pk.test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.mapbox_token.as_deref(), Some("pk.test"));
}

#[test]
fn build_app_config_ignores_blank_token() {
    let mut map = full_env();
    map.insert("LOCFINDER_MAPBOX_TOKEN", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.mapbox_token.is_none());
}

#[test]
fn build_app_config_debounce_override() {
    let mut map = full_env();
    map.insert("LOCFINDER_SEARCH_DEBOUNCE_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_debounce_ms, 250);
}

#[test]
fn build_app_config_debounce_invalid() {
    let mut map = full_env();
    map.insert("LOCFINDER_SEARCH_DEBOUNCE_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LOCFINDER_SEARCH_DEBOUNCE_MS"),
        "expected InvalidEnvVar(LOCFINDER_SEARCH_DEBOUNCE_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_min_query_len_invalid() {
    let mut map = full_env();
    map.insert("LOCFINDER_SEARCH_MIN_QUERY_LEN", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LOCFINDER_SEARCH_MIN_QUERY_LEN")
    );
}

#[test]
fn build_app_config_rating_fallback_omit() {
    let mut map = full_env();
    map.insert("LOCFINDER_RATING_FALLBACK", "Omit");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.rating_fallback, RatingFallback::Omit);
}

#[test]
fn build_app_config_rating_fallback_invalid() {
    let mut map = full_env();
    map.insert("LOCFINDER_RATING_FALLBACK", "fake");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LOCFINDER_RATING_FALLBACK")
    );
}

#[test]
fn debug_output_redacts_token() {
    let mut map = full_env();
    map.insert("LOCFINDER_MAPBOX_TOKEN", "pk.secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("pk.secret-value"));
    assert!(rendered.contains("[redacted]"));
}
