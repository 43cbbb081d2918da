//! HTTP client for the geocoding place-search endpoint.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use locfinder_core::{AppConfig, Coordinate};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};

use crate::error::GeocoderError;
use crate::types::FeatureCollection;
use crate::{Geocode, GeocodeResult};

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/";
const PLACES_PATH: &str = "geocoding/v5/mapbox.places";

/// Request parameters sent with every query.
#[derive(Clone)]
pub struct GeocoderSettings {
    pub access_token: String,
    pub language: String,
    pub country: String,
    pub limit: u32,
    /// Bias anchor, passed to the API verbatim.
    pub proximity: String,
    pub timeout_secs: u64,
}

impl GeocoderSettings {
    /// Builds settings from the app config.
    ///
    /// Returns `None` when no access token is configured; the geocoder is
    /// disabled in that case.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let access_token = config.mapbox_token.clone()?;
        Some(Self {
            access_token,
            language: config.language.clone(),
            country: config.geocoder_country.clone(),
            limit: config.geocoder_limit,
            proximity: config.geocoder_proximity.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }
}

impl std::fmt::Debug for GeocoderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderSettings")
            .field("access_token", &"[redacted]")
            .field("language", &self.language)
            .field("country", &self.country)
            .field("limit", &self.limit)
            .field("proximity", &self.proximity)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Client for the place-search API.
///
/// Use [`GeocoderClient::new`] for production or
/// [`GeocoderClient::with_base_url`] to point at a mock server in tests.
pub struct GeocoderClient {
    client: Client,
    base_url: Url,
    settings: GeocoderSettings,
}

impl GeocoderClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GeocoderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: GeocoderSettings) -> Result<Self, GeocoderError> {
        Self::with_base_url(settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocoderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocoderError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(settings: GeocoderSettings, base_url: &str) -> Result<Self, GeocoderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("locfinder/0.1 (location-finder)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocoderError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            settings,
        })
    }

    /// Searches for places matching `query`.
    ///
    /// Blank input returns an empty result without a request.
    ///
    /// # Errors
    ///
    /// - [`GeocoderError::Http`] on network failure.
    /// - [`GeocoderError::UnexpectedStatus`] on a non-2xx response.
    /// - [`GeocoderError::Deserialize`] if the body is not a feature
    ///   collection.
    pub async fn search(&self, query: &str) -> Result<GeocodeResult, GeocoderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(GeocodeResult::default());
        }

        let url = self.build_url(query)?;
        tracing::debug!(query = %query, "geocoding query");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocoderError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let collection: FeatureCollection =
            serde_json::from_str(&body).map_err(|source| GeocoderError::Deserialize { source })?;

        Ok(to_result(collection))
    }

    /// Like [`search`](Self::search) but logs failures and returns an empty
    /// result instead of an error.
    pub async fn suggest(&self, query: &str) -> GeocodeResult {
        match self.search(query).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "geocoder request failed");
                GeocodeResult::default()
            }
        }
    }

    fn build_url(&self, query: &str) -> Result<Url, GeocoderError> {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
        let path = format!("{PLACES_PATH}/{encoded}.json");
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| GeocoderError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.settings.access_token)
            .append_pair("language", &self.settings.language)
            .append_pair("limit", &self.settings.limit.to_string())
            .append_pair("country", &self.settings.country)
            .append_pair("proximity", &self.settings.proximity);
        Ok(url)
    }
}

impl Geocode for GeocoderClient {
    fn geocode<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<GeocodeResult, GeocoderError>> {
        self.search(query).boxed()
    }
}

/// Keeps API order. Features without a name are not offered as suggestions;
/// the top coordinate comes from the first feature only.
fn to_result(collection: FeatureCollection) -> GeocodeResult {
    let top = collection
        .features
        .first()
        .and_then(crate::types::Feature::lng_lat)
        .and_then(|(lng, lat)| Coordinate::try_new(lat, lng).ok());

    let suggestions = collection
        .features
        .into_iter()
        .filter_map(|f| f.place_name)
        .filter(|name| !name.trim().is_empty())
        .collect();

    GeocodeResult { suggestions, top }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
