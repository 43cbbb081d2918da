use crate::location::Coordinate;

/// What to show in a popup when a location has no review aggregate.
///
/// `Placeholder` reproduces the fixed 4.5 / 123 block the site has always
/// rendered. It is almost certainly placeholder content; `Omit` hides the
/// rating block instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingFallback {
    #[default]
    Placeholder,
    Omit,
}

impl std::fmt::Display for RatingFallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingFallback::Placeholder => write!(f, "placeholder"),
            RatingFallback::Omit => write!(f, "omit"),
        }
    }
}

/// Map engine settings used when the map surface initializes.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDefaults {
    pub style: String,
    pub center: Coordinate,
    pub zoom: f64,
    pub cooperative_gestures: bool,
    pub attribution_control: bool,
    pub show_compass: bool,
    /// Zoom used when a card, marker or search result is selected.
    pub focus_zoom: f64,
    /// Zoom used when the visible set changes and the map re-centers on its
    /// first entry.
    pub overview_zoom: f64,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            style: "mapbox://styles/mapbox/outdoors-v12".to_string(),
            center: Coordinate {
                lat: 24.237_763_395_014_575,
                lng: 55.720_686_215_326_88,
            },
            zoom: 7.0,
            cooperative_gestures: true,
            attribution_control: false,
            show_compass: false,
            focus_zoom: 15.0,
            overview_zoom: 10.0,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub cms_base_url: String,
    pub mapbox_token: Option<String>,
    pub language: String,
    pub geocoder_country: String,
    pub geocoder_limit: u32,
    pub geocoder_proximity: String,
    pub search_debounce_ms: u64,
    pub search_min_query_len: usize,
    pub request_timeout_secs: u64,
    pub cms_max_retries: u32,
    pub cms_retry_backoff_ms: u64,
    pub rating_fallback: RatingFallback,
    pub map: MapDefaults,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("cms_base_url", &self.cms_base_url)
            .field(
                "mapbox_token",
                &self.mapbox_token.as_ref().map(|_| "[redacted]"),
            )
            .field("language", &self.language)
            .field("geocoder_country", &self.geocoder_country)
            .field("geocoder_limit", &self.geocoder_limit)
            .field("geocoder_proximity", &self.geocoder_proximity)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("search_min_query_len", &self.search_min_query_len)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cms_max_retries", &self.cms_max_retries)
            .field("cms_retry_backoff_ms", &self.cms_retry_backoff_ms)
            .field("rating_fallback", &self.rating_fallback)
            .field("map", &self.map)
            .finish()
    }
}
