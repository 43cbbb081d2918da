//! Venue records and the geometry they carry.

use serde::{Deserialize, Serialize};

use crate::CoreError;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point. Values are treated as opaque floats beyond range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either is NaN/inf.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(CoreError::InvalidCoordinate { lat, lng })
        }
    }

    /// Parses the string latitude/longitude pair the CMS stores.
    ///
    /// Returns `None` for missing, blank, unparsable or out-of-range input.
    #[must_use]
    pub fn parse(lat: Option<&str>, lng: Option<&str>) -> Option<Self> {
        let lat = lat?.trim().parse::<f64>().ok()?;
        let lng = lng?.trim().parse::<f64>().ok()?;
        Self::try_new(lat, lng).ok()
    }

    /// Great-circle distance in kilometres (haversine).
    #[must_use]
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let (lat1, lng1) = (self.lat.to_radians(), self.lng.to_radians());
        let (lat2, lng2) = (other.lat.to_radians(), other.lng.to_radians());
        let dlat = lat2 - lat1;
        let dlng = lng2 - lng1;
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Aggregate of a venue's reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub total_reviews: u32,
}

impl ReviewSummary {
    /// The fixed values the site shows when a venue has no reviews.
    pub const PLACEHOLDER: ReviewSummary = ReviewSummary {
        average_rating: 4.5,
        total_reviews: 123,
    };
}

/// One venue as shown in the finder list and on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Stable CMS id.
    pub id: String,
    pub name: String,
    /// `None` when the CMS coordinates did not parse; such records are listed
    /// but never mapped.
    pub coordinate: Option<Coordinate>,
    pub address: Option<String>,
    /// City used by the single-value city filter.
    pub city: Option<String>,
    /// Category/status label from the CMS, e.g. "Ladies only".
    pub status: Option<String>,
    pub is_coming_soon: bool,
    /// KSA vs UAE grouping, used only for display.
    pub is_ksa: bool,
    pub image_url: Option<String>,
    /// External booking/directions URL.
    pub booking_url: Option<String>,
    /// Site path of the venue's own page.
    pub page_path: Option<String>,
    pub review: Option<ReviewSummary>,
}

impl LocationRecord {
    /// Minimal record with everything optional left empty.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate: None,
            address: None,
            city: None,
            status: None,
            is_coming_soon: false,
            is_ksa: false,
            image_url: None,
            booking_url: None,
            page_path: None,
            review: None,
        }
    }

    #[must_use]
    pub fn with_coordinate(mut self, lat: f64, lng: f64) -> Self {
        self.coordinate = Coordinate::try_new(lat, lng).ok();
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Booking link; hidden while the venue is coming soon.
    #[must_use]
    pub fn join_link(&self) -> Option<&str> {
        if self.is_coming_soon {
            None
        } else {
            self.booking_url.as_deref()
        }
    }

    /// Link to the venue page; hidden while the venue is coming soon.
    #[must_use]
    pub fn info_link(&self) -> Option<&str> {
        if self.is_coming_soon {
            None
        } else {
            self.page_path.as_deref()
        }
    }

    /// Pre-registration link, only offered while the venue is coming soon.
    #[must_use]
    pub fn register_link(&self) -> Option<&str> {
        if self.is_coming_soon {
            self.page_path.as_deref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn status_label(&self) -> Option<&str> {
        if self.is_coming_soon {
            Some("Coming soon")
        } else {
            self.status.as_deref()
        }
    }

    #[must_use]
    pub fn region_label(&self) -> &'static str {
        if self.is_ksa {
            "KSA"
        } else {
            "UAE"
        }
    }

    /// Case-insensitive exact match against the record's city.
    #[must_use]
    pub fn in_city(&self, city: &str) -> bool {
        self.city
            .as_deref()
            .is_some_and(|c| c.to_lowercase() == city.to_lowercase())
    }
}

/// A category checkbox in the finder's filter panel and the venues it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    pub id: String,
    pub name: String,
    pub location_ids: Vec<String>,
}

/// A country tab and the cities offered once it is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryTab {
    pub name: String,
    pub cities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_padded_numbers() {
        let c = Coordinate::parse(Some(" 25.2 "), Some("55.3")).unwrap();
        assert!((c.lat - 25.2).abs() < 1e-9);
        assert!((c.lng - 55.3).abs() < 1e-9);
    }

    #[test]
    fn parse_rejects_garbage_and_blank() {
        assert!(Coordinate::parse(Some("abc"), Some("55.3")).is_none());
        assert!(Coordinate::parse(Some(""), Some("55.3")).is_none());
        assert!(Coordinate::parse(None, Some("55.3")).is_none());
        assert!(Coordinate::parse(Some("25.2"), None).is_none());
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert!(Coordinate::parse(Some("95.0"), Some("55.3")).is_none());
        assert!(Coordinate::parse(Some("25.0"), Some("181")).is_none());
        assert!(Coordinate::parse(Some("NaN"), Some("55.3")).is_none());
    }

    #[test]
    fn distance_dubai_to_abu_dhabi() {
        let dubai = Coordinate { lat: 25.2, lng: 55.3 };
        let abu_dhabi = Coordinate { lat: 24.4, lng: 54.6 };
        let d = dubai.distance_km(&abu_dhabi);
        assert!(d > 100.0 && d < 120.0, "got {d}");
        assert!(dubai.distance_km(&dubai).abs() < 1e-9);
    }

    #[test]
    fn links_follow_coming_soon_flag() {
        let mut rec = LocationRecord::new("a", "Marina");
        rec.booking_url = Some("https://book.example.com/marina".to_string());
        rec.page_path = Some("/locations/marina".to_string());
        assert_eq!(rec.join_link(), Some("https://book.example.com/marina"));
        assert_eq!(rec.info_link(), Some("/locations/marina"));
        assert_eq!(rec.register_link(), None);

        rec.is_coming_soon = true;
        assert_eq!(rec.join_link(), None);
        assert_eq!(rec.info_link(), None);
        assert_eq!(rec.register_link(), Some("/locations/marina"));
    }

    #[test]
    fn coming_soon_overrides_status_label() {
        let mut rec = LocationRecord::new("a", "Marina");
        assert_eq!(rec.status_label(), None);
        rec.status = Some("Ladies only".to_string());
        assert_eq!(rec.status_label(), Some("Ladies only"));
        rec.is_coming_soon = true;
        assert_eq!(rec.status_label(), Some("Coming soon"));
    }

    #[test]
    fn in_city_ignores_case() {
        let rec = LocationRecord::new("a", "Marina").with_city("Dubai");
        assert!(rec.in_city("dubai"));
        assert!(rec.in_city("DUBAI"));
        assert!(!rec.in_city("Abu Dhabi"));
        assert!(!LocationRecord::new("b", "No city").in_city("dubai"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let rec = LocationRecord::new("a", "Marina").with_coordinate(25.2, 55.3);
        let json = serde_json::to_string(&rec).unwrap();
        let back: LocationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
