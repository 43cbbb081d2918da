//! The read-only venue collection the finder works over.

use std::collections::{HashMap, HashSet};

use locfinder_cms::{attach_reviews, CityLocations};
use locfinder_core::{CategoryFilter, Coordinate, CountryTab, LocationRecord, ReviewSummary};

/// Venues, country tabs and category groups loaded once from the CMS.
///
/// Never mutated after construction; filtering produces derived views.
#[derive(Debug, Clone, Default)]
pub struct LocationDataset {
    records: Vec<LocationRecord>,
    countries: Vec<CountryTab>,
    filters: Vec<CategoryFilter>,
}

impl LocationDataset {
    /// Builds a dataset, dropping records whose id was already seen.
    #[must_use]
    pub fn new(
        records: Vec<LocationRecord>,
        countries: Vec<CountryTab>,
        filters: Vec<CategoryFilter>,
    ) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        Self {
            records,
            countries,
            filters,
        }
    }

    /// Assembles a dataset from the three CMS responses.
    #[must_use]
    pub fn from_content(
        content: CityLocations,
        filters: Vec<CategoryFilter>,
        ratings: &HashMap<String, ReviewSummary>,
    ) -> Self {
        let mut records = content.locations;
        attach_reviews(&mut records, ratings);
        Self::new(records, content.countries, filters)
    }

    #[must_use]
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    #[must_use]
    pub fn countries(&self) -> &[CountryTab] {
        &self.countries
    }

    #[must_use]
    pub fn filters(&self) -> &[CategoryFilter] {
        &self.filters
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LocationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Member ids of a category group, or `None` for an unknown filter id.
    #[must_use]
    pub fn filter_members(&self, filter_id: &str) -> Option<&[String]> {
        self.filters
            .iter()
            .find(|f| f.id == filter_id)
            .map(|f| f.location_ids.as_slice())
    }

    /// The record closest to `point` by great-circle distance.
    ///
    /// Records without coordinates are ignored. Ties go to the earlier record.
    #[must_use]
    pub fn nearest(&self, point: &Coordinate) -> Option<&LocationRecord> {
        self.records
            .iter()
            .filter_map(|r| r.coordinate.map(|c| (r, c.distance_km(point))))
            .fold(None, |best: Option<(&LocationRecord, f64)>, (rec, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((rec, d)),
            })
            .map(|(rec, _)| rec)
    }
}
