//! Converts CMS wire types into finder domain types.

use std::collections::HashMap;

use locfinder_core::{CategoryFilter, Coordinate, CountryTab, LocationRecord, ReviewSummary};

use crate::types::{ApiLocation, CountryItem, FilterItem, LocationRatingItem};

/// Decodes and normalises one raw location value.
///
/// Returns `None` when the value does not decode or has no usable id.
/// Unparsable coordinates do not drop the record; it simply carries no
/// geometry.
#[must_use]
pub fn normalize_location(raw: &serde_json::Value) -> Option<LocationRecord> {
    let location = match serde_json::from_value::<ApiLocation>(raw.clone()) {
        Ok(loc) => loc,
        Err(e) => {
            tracing::warn!(error = %e, "skipping undecodable CMS location");
            return None;
        }
    };

    let id = location
        .sys
        .as_ref()
        .and_then(|s| s.id.clone())
        .or(location.id)
        .filter(|id| !id.trim().is_empty())?;

    let props = location.properties;
    let coordinate = Coordinate::parse(
        props.location_latitude.as_deref(),
        props.location_longitude.as_deref(),
    );
    if coordinate.is_none() {
        tracing::debug!(
            location_id = %id,
            lat = ?props.location_latitude,
            lng = ?props.location_longitude,
            "location has no usable coordinates; it will not be mapped"
        );
    }

    Some(LocationRecord {
        name: location.name.unwrap_or_default(),
        coordinate,
        address: non_blank(props.map_address),
        city: non_blank(props.city_name),
        status: non_blank(props.location_status),
        is_coming_soon: props.is_coming_soon.unwrap_or(false),
        is_ksa: props.is_ksa.unwrap_or(false),
        image_url: props
            .map_image
            .into_iter()
            .find_map(|m| non_blank(m.url)),
        booking_url: non_blank(props.map_direction_url),
        page_path: location.route.and_then(|r| non_blank(r.path)),
        review: None,
        id,
    })
}

/// Normalises every raw location, keeping dataset order and dropping
/// duplicates of an id already seen.
#[must_use]
pub fn normalize_locations(raw: &[serde_json::Value]) -> Vec<LocationRecord> {
    let mut seen = std::collections::HashSet::new();
    let mut records = Vec::with_capacity(raw.len());
    for value in raw {
        let Some(record) = normalize_location(value) else {
            continue;
        };
        if !seen.insert(record.id.clone()) {
            tracing::warn!(location_id = %record.id, "duplicate CMS location id; keeping first");
            continue;
        }
        records.push(record);
    }
    records
}

#[must_use]
pub fn normalize_countries(items: Vec<CountryItem>) -> Vec<CountryTab> {
    items
        .into_iter()
        .map(|item| {
            let props = item.content.properties;
            CountryTab {
                name: props.country_name.unwrap_or_default(),
                cities: props
                    .city_list
                    .items
                    .into_iter()
                    .filter_map(|c| non_blank(c.content.properties.city_name))
                    .collect(),
            }
        })
        .collect()
}

#[must_use]
pub fn normalize_filters(items: Vec<FilterItem>) -> Vec<CategoryFilter> {
    items
        .into_iter()
        .map(|item| CategoryFilter {
            name: item.name.unwrap_or_else(|| item.id.clone()),
            location_ids: item
                .properties
                .category_locations
                .unwrap_or_default()
                .into_iter()
                .map(|r| r.id)
                .collect(),
            id: item.id,
        })
        .collect()
}

#[must_use]
pub fn normalize_ratings(items: Vec<LocationRatingItem>) -> HashMap<String, ReviewSummary> {
    items
        .into_iter()
        .filter_map(|item| {
            let average_rating = item.average_rating.filter(|r| r.is_finite())?;
            Some((
                item.location_id,
                ReviewSummary {
                    average_rating,
                    total_reviews: item.total_reviews.unwrap_or(0),
                },
            ))
        })
        .collect()
}

/// Copies each location's review aggregate onto its record.
pub fn attach_reviews(records: &mut [LocationRecord], ratings: &HashMap<String, ReviewSummary>) {
    for record in records {
        record.review = ratings.get(&record.id).copied();
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_location() -> serde_json::Value {
        json!({
            "id": "content-id",
            "sys": { "id": "sys-id" },
            "name": "Marina",
            "route": { "path": "/locations/marina/" },
            "properties": {
                "locationLatitude": "25.08",
                "locationLongitude": "55.14",
                "cityName": "Dubai",
                "isKSA": false,
                "mapAddress": "Marina Walk",
                "mapDirectionUrl": "https://maps.example.com/marina",
                "isComingSoon": false,
                "locationStatus": "Ladies only",
                "mapImage": [{ "url": "https://cdn.example.com/marina.jpg" }]
            }
        })
    }

    #[test]
    fn normalizes_full_location() {
        let rec = normalize_location(&raw_location()).unwrap();
        assert_eq!(rec.id, "sys-id");
        assert_eq!(rec.name, "Marina");
        assert_eq!(rec.city.as_deref(), Some("Dubai"));
        assert_eq!(rec.address.as_deref(), Some("Marina Walk"));
        assert_eq!(rec.page_path.as_deref(), Some("/locations/marina/"));
        assert_eq!(rec.status_label(), Some("Ladies only"));
        assert_eq!(
            rec.image_url.as_deref(),
            Some("https://cdn.example.com/marina.jpg")
        );
        let c = rec.coordinate.unwrap();
        assert!((c.lat - 25.08).abs() < 1e-9);
    }

    #[test]
    fn falls_back_to_content_id_without_sys() {
        let mut raw = raw_location();
        raw.as_object_mut().unwrap().remove("sys");
        assert_eq!(normalize_location(&raw).unwrap().id, "content-id");
    }

    #[test]
    fn keeps_record_with_bad_coordinates_but_without_geometry() {
        let mut raw = raw_location();
        raw["properties"]["locationLatitude"] = json!("not a number");
        let rec = normalize_location(&raw).unwrap();
        assert!(rec.coordinate.is_none());
    }

    #[test]
    fn tolerates_missing_image() {
        let mut raw = raw_location();
        raw["properties"]["mapImage"] = json!([]);
        assert!(normalize_location(&raw).unwrap().image_url.is_none());
    }

    #[test]
    fn skips_record_without_id() {
        let raw = json!({ "name": "Nameless", "properties": {} });
        assert!(normalize_location(&raw).is_none());
    }

    #[test]
    fn normalize_locations_drops_bad_and_duplicate_entries() {
        let second = json!({ "id": "b", "name": "Second", "properties": {} });
        let raw = vec![raw_location(), json!("garbage"), second, raw_location()];
        let records = normalize_locations(&raw);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["sys-id", "b"]);
    }

    #[test]
    fn ratings_without_average_are_dropped() {
        let ratings = normalize_ratings(vec![
            LocationRatingItem {
                location_id: "a".into(),
                average_rating: Some(4.8),
                total_reviews: Some(210),
            },
            LocationRatingItem {
                location_id: "b".into(),
                average_rating: None,
                total_reviews: Some(3),
            },
        ]);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings["a"].total_reviews, 210);
    }

    #[test]
    fn attach_reviews_sets_and_clears() {
        let mut records = vec![
            LocationRecord::new("a", "A"),
            LocationRecord::new("b", "B"),
        ];
        let mut ratings = HashMap::new();
        ratings.insert(
            "a".to_string(),
            ReviewSummary {
                average_rating: 4.0,
                total_reviews: 10,
            },
        );
        attach_reviews(&mut records, &ratings);
        assert!(records[0].review.is_some());
        assert!(records[1].review.is_none());
    }
}
