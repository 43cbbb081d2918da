//! Shared domain types and configuration for the location finder.

pub mod app_config;
pub mod config;
pub mod direction;
pub mod location;

pub use app_config::{AppConfig, MapDefaults, RatingFallback};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use direction::{ControlPosition, TextDirection};
pub use location::{CategoryFilter, Coordinate, CountryTab, LocationRecord, ReviewSummary};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate ({lat}, {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
}
