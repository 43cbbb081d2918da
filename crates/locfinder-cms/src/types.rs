//! Wire types for the CMS responses the finder reads.
//!
//! Every field is optional or defaulted: the CMS returns loosely shaped
//! trees and a missing property must never fail the whole response.

use serde::{Deserialize, Deserializer};

/// `{ "items": [...] }` wrapper used throughout the CMS block model.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemList<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ItemList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// Top level of the `site-settings/city-location` content item.
#[derive(Debug, Clone, Deserialize)]
pub struct CityLocationResponse {
    #[serde(default)]
    pub properties: CityLocationProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityLocationProperties {
    #[serde(default)]
    pub countries: ItemList<CountryItem>,
    /// Kept as raw values so each location can be decoded on its own.
    #[serde(default, rename = "aPILocations")]
    pub api_locations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryItem {
    #[serde(default)]
    pub content: CountryContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryContent {
    #[serde(default)]
    pub properties: CountryProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryProperties {
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub city_list: ItemList<CityItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityItem {
    #[serde(default)]
    pub content: CityContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityContent {
    #[serde(default)]
    pub properties: CityProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityProperties {
    #[serde(default)]
    pub city_name: Option<String>,
}

/// One venue as the CMS delivers it.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiLocation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sys: Option<SysRef>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub route: Option<RouteRef>,
    #[serde(default)]
    pub properties: ApiLocationProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SysRef {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteRef {
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaRef {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocationProperties {
    #[serde(default, deserialize_with = "string_or_number")]
    pub location_latitude: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub location_longitude: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default, rename = "isKSA")]
    pub is_ksa: Option<bool>,
    #[serde(default)]
    pub map_address: Option<String>,
    #[serde(default)]
    pub map_direction_url: Option<String>,
    #[serde(default)]
    pub is_coming_soon: Option<bool>,
    #[serde(default)]
    pub location_status: Option<String>,
    #[serde(default)]
    pub map_image: Vec<MediaRef>,
}

/// Response of the category filter children query.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterListResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub items: Vec<FilterItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: FilterProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterProperties {
    /// The CMS property really is spelled `catagoryLocations`.
    #[serde(default, rename = "catagoryLocations", alias = "categoryLocations")]
    pub category_locations: Option<Vec<FilterLocationRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterLocationRef {
    pub id: String,
}

/// One row of the location ratings endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRatingItem {
    pub location_id: String,
    #[serde(default, alias = "rating")]
    pub average_rating: Option<f64>,
    #[serde(default, alias = "userRatingsTotal")]
    pub total_reviews: Option<u32>,
}

/// Accepts `"25.2"`, `25.2`, or `null` and yields the textual form.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_properties_accept_numeric_coordinates() {
        let props: ApiLocationProperties = serde_json::from_value(serde_json::json!({
            "locationLatitude": 25.2,
            "locationLongitude": "55.3",
            "isKSA": true
        }))
        .unwrap();
        assert_eq!(props.location_latitude.as_deref(), Some("25.2"));
        assert_eq!(props.location_longitude.as_deref(), Some("55.3"));
        assert_eq!(props.is_ksa, Some(true));
    }

    #[test]
    fn filter_item_accepts_both_spellings() {
        let typo: FilterItem = serde_json::from_value(serde_json::json!({
            "id": "f1",
            "properties": { "catagoryLocations": [{ "id": "a" }] }
        }))
        .unwrap();
        let fixed: FilterItem = serde_json::from_value(serde_json::json!({
            "id": "f2",
            "properties": { "categoryLocations": [{ "id": "b" }] }
        }))
        .unwrap();
        assert_eq!(typo.properties.category_locations.unwrap()[0].id, "a");
        assert_eq!(fixed.properties.category_locations.unwrap()[0].id, "b");
    }

    #[test]
    fn empty_city_location_tree_decodes() {
        let resp: CityLocationResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(resp.properties.countries.items.is_empty());
        assert!(resp.properties.api_locations.is_empty());
    }
}
