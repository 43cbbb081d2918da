//! Wire types for the place-search response. Only the fields the finder
//! reads are modelled.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    /// `[lng, lat]`, present on most features alongside `geometry`.
    #[serde(default)]
    pub center: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// `[lng, lat]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl Feature {
    /// The feature's `[lng, lat]` pair, preferring `geometry` over `center`.
    #[must_use]
    pub fn lng_lat(&self) -> Option<(f64, f64)> {
        let pair = self
            .geometry
            .as_ref()
            .map(|g| g.coordinates.as_slice())
            .filter(|c| c.len() >= 2)
            .or_else(|| self.center.as_deref().filter(|c| c.len() >= 2))?;
        Some((pair[0], pair[1]))
    }
}
