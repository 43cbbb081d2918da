//! Place-search client used by the finder's autocomplete.
//!
//! [`Geocode`] is the seam the search controller depends on;
//! [`GeocoderClient`] implements it against a Mapbox-style geocoding API.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeocoderClient, GeocoderSettings};
pub use error::GeocoderError;

use futures::future::BoxFuture;
use locfinder_core::Coordinate;

/// Ranked place names for one query plus the top result's coordinate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeResult {
    pub suggestions: Vec<String>,
    pub top: Option<Coordinate>,
}

impl GeocodeResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty() && self.top.is_none()
    }
}

/// Free-text place search.
///
/// Implementations must return an empty result without doing any I/O for
/// blank input. Dropping the returned future cancels the request.
pub trait Geocode: Send + Sync {
    fn geocode<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<GeocodeResult, GeocoderError>>;
}
