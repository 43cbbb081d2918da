//! HTTP client for the CMS content API.

use std::collections::HashMap;
use std::time::Duration;

use locfinder_core::{CategoryFilter, CountryTab, LocationRecord, ReviewSummary};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::blocks::{parse_page_blocks, PageBlock};
use crate::error::CmsError;
use crate::normalize::{normalize_countries, normalize_filters, normalize_locations, normalize_ratings};
use crate::retry::{with_retries, RetryPolicy};
use crate::types::{CityLocationResponse, FilterListResponse, LocationRatingItem};

const CONTENT_PATH: &str = "umbraco/api/CommonContent/GetContentWithSasUrls";
const CITY_LOCATION_PAGE: &str = "site-settings/city-location";
const DELIVERY_PATH: &str = "umbraco/delivery/api/v2/content";
const RATINGS_PATH: &str = "umbraco/api/CommonApi/GetAllLocationRatings";
const DEFAULT_FILTERS_ROOT_ID: &str = "254af728-c37c-44bd-9c6f-2e18e2db940f";

/// Country tabs and venues from the city-location content item.
#[derive(Debug, Clone, Default)]
pub struct CityLocations {
    pub countries: Vec<CountryTab>,
    pub locations: Vec<LocationRecord>,
}

/// Client for the CMS content API.
///
/// All requests are GETs. Transient failures (timeouts, connect errors, 429
/// and 5xx) are retried with jittered exponential back-off.
pub struct CmsClient {
    client: Client,
    base_url: Url,
    filters_root_id: String,
    retry: RetryPolicy,
}

impl CmsClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`CmsError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, CmsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("locfinder/0.1 (location-finder)")
            .build()?;

        // A trailing slash keeps `Url::join` from replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CmsError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            filters_root_id: DEFAULT_FILTERS_ROOT_ID.to_owned(),
            retry: RetryPolicy::new(max_retries, backoff_base_ms),
        })
    }

    /// Overrides the content node whose children are the category filters.
    #[must_use]
    pub fn with_filters_root(mut self, root_id: &str) -> Self {
        root_id.clone_into(&mut self.filters_root_id);
        self
    }

    /// Fetches the country tabs and the full venue list.
    ///
    /// Records that fail to decode or carry no id are skipped; records with
    /// unusable coordinates are kept without geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`CmsError`] if the request fails or the envelope does not
    /// decode.
    pub async fn fetch_city_locations(&self) -> Result<CityLocations, CmsError> {
        let url = self.build_url(
            CONTENT_PATH,
            &[
                ("pagename", CITY_LOCATION_PAGE),
                ("expand", "properties[$all]"),
            ],
        )?;
        let response: CityLocationResponse = self.get_json(url, "city-location content").await?;
        let props = response.properties;

        let locations = normalize_locations(&props.api_locations);
        tracing::debug!(
            raw = props.api_locations.len(),
            kept = locations.len(),
            "loaded CMS locations"
        );

        Ok(CityLocations {
            countries: normalize_countries(props.countries.items),
            locations,
        })
    }

    /// Fetches the category filter groups shown in the filter panel.
    ///
    /// # Errors
    ///
    /// Returns a [`CmsError`] if the request fails or the body does not decode.
    pub async fn fetch_location_filters(&self) -> Result<Vec<CategoryFilter>, CmsError> {
        let fetch = format!("children:{}", self.filters_root_id);
        let url = self.build_url(DELIVERY_PATH, &[("fetch", &fetch)])?;
        let response: FilterListResponse = self.get_json(url, "location filters").await?;
        if let Some(total) = response.total {
            tracing::debug!(total, returned = response.items.len(), "loaded location filters");
        }
        Ok(normalize_filters(response.items))
    }

    /// Fetches review aggregates keyed by location id.
    ///
    /// # Errors
    ///
    /// Returns a [`CmsError`] if the request fails or the body does not decode.
    pub async fn fetch_location_ratings(
        &self,
    ) -> Result<HashMap<String, ReviewSummary>, CmsError> {
        let url = self.build_url(RATINGS_PATH, &[])?;
        let items: Vec<LocationRatingItem> = self.get_json(url, "location ratings").await?;
        Ok(normalize_ratings(items))
    }

    /// Fetches a page by slug and returns its typed content blocks.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] for an unknown slug, or another
    /// [`CmsError`] if the request fails.
    pub async fn fetch_page_blocks(&self, slug: &str) -> Result<Vec<PageBlock>, CmsError> {
        let url = self.build_url(CONTENT_PATH, &[("pagename", slug)])?;
        let page: serde_json::Value = self.get_json(url, "page content").await?;
        Ok(parse_page_blocks(&page))
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CmsError> {
        let mut url = self.base_url.join(path).map_err(|e| CmsError::InvalidBaseUrl {
            base_url: self.base_url.to_string(),
            reason: format!("cannot join \"{path}\": {e}"),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GETs `url` with retries, maps status codes to typed errors, and
    /// decodes the body as `T`. `context` names the content in errors and
    /// log events.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, CmsError> {
        with_retries(self.retry, context, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(CmsError::NotFound {
                        url: url.to_string(),
                    });
                }
                if !status.is_success() {
                    return Err(CmsError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| CmsError::Deserialize {
                    context: format!("{context} from {url}"),
                    source: e,
                })
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> CmsClient {
        CmsClient::new(base_url, 5, 0, 0).expect("client construction should not fail")
    }

    #[test]
    fn build_url_joins_path_under_base_prefix() {
        let client = test_client("https://cms.example.com/prefix/");
        let url = client.build_url(RATINGS_PATH, &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cms.example.com/prefix/umbraco/api/CommonApi/GetAllLocationRatings"
        );
    }

    #[test]
    fn build_url_encodes_query_values() {
        let client = test_client("https://cms.example.com");
        let url = client
            .build_url(CONTENT_PATH, &[("pagename", CITY_LOCATION_PAGE)])
            .unwrap();
        assert_eq!(
            url.query(),
            Some("pagename=site-settings%2Fcity-location")
        );
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let result = CmsClient::new("not a url", 5, 0, 0);
        assert!(matches!(result, Err(CmsError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn retry_policy_comes_from_constructor() {
        let client = CmsClient::new("https://cms.example.com", 5, 4, 250).unwrap();
        assert_eq!(client.retry, RetryPolicy::new(4, 250));
    }

    #[test]
    fn filters_root_can_be_overridden() {
        let client = test_client("https://cms.example.com").with_filters_root("abc");
        assert_eq!(client.filters_root_id, "abc");
    }
}
