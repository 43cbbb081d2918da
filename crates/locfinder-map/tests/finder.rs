//! End-to-end finder behaviour against a mocked CMS and the recording map
//! engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use locfinder_cms::CmsClient;
use locfinder_core::{
    build_app_config, AppConfig, CategoryFilter, Coordinate, CountryTab, LocationRecord,
    TextDirection,
};
use locfinder_geocoder::{Geocode, GeocodeResult, GeocoderError};
use locfinder_map::{
    FinderView, LocationDataset, LocationFinder, MapEvent, RecordingEngine, Suggestions,
};

fn config(token: Option<&str>) -> AppConfig {
    let mut env = HashMap::from([
        ("LOCFINDER_CMS_BASE_URL".to_string(), "http://cms.invalid".to_string()),
        ("LOCFINDER_CMS_MAX_RETRIES".to_string(), "0".to_string()),
        ("LOCFINDER_CMS_RETRY_BACKOFF_MS".to_string(), "0".to_string()),
    ]);
    if let Some(token) = token {
        env.insert("LOCFINDER_MAPBOX_TOKEN".to_string(), token.to_string());
    }
    build_app_config(|key| env.get(key).cloned().ok_or(std::env::VarError::NotPresent))
        .expect("test config")
}

fn finder(token: Option<&str>) -> LocationFinder<RecordingEngine> {
    LocationFinder::new(&config(token), RecordingEngine::new(), None, TextDirection::Ltr)
}

fn ready_finder() -> LocationFinder<RecordingEngine> {
    let mut finder = finder(Some("pk.test"));
    finder.map_visible();
    finder.handle_map_event(MapEvent::Loaded);
    finder
}

fn dataset() -> LocationDataset {
    LocationDataset::new(
        vec![
            LocationRecord::new("A", "Marina")
                .with_coordinate(25.2, 55.3)
                .with_city("Dubai"),
            LocationRecord::new("B", "Corniche")
                .with_coordinate(24.4, 54.6)
                .with_city("Abu Dhabi"),
            LocationRecord::new("C", "Khalidiya")
                .with_coordinate(24.47, 54.35)
                .with_city("Abu Dhabi"),
            LocationRecord::new("D", "No coordinates").with_city("Dubai"),
        ],
        vec![
            CountryTab {
                name: "UAE".into(),
                cities: vec!["Dubai".into(), "Abu Dhabi".into()],
            },
            CountryTab {
                name: "KSA".into(),
                cities: vec!["Riyadh".into()],
            },
        ],
        vec![
            CategoryFilter {
                id: "F1".into(),
                name: "Pool".into(),
                location_ids: vec!["A".into(), "B".into()],
            },
            CategoryFilter {
                id: "F2".into(),
                name: "Sauna".into(),
                location_ids: vec!["B".into(), "C".into()],
            },
            CategoryFilter {
                id: "F3".into(),
                name: "Ladies only".into(),
                location_ids: vec!["A".into()],
            },
            CategoryFilter {
                id: "F4".into(),
                name: "Climbing".into(),
                location_ids: vec!["C".into()],
            },
        ],
    )
}

fn visible_ids(finder: &LocationFinder<RecordingEngine>) -> Vec<&str> {
    finder.visible().iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn view_progresses_from_loading_to_ready() {
    let mut finder = ready_finder();
    assert_eq!(finder.view(), FinderView::Loading);
    finder.set_dataset(dataset());
    assert_eq!(finder.view(), FinderView::Ready);
    assert_eq!(visible_ids(&finder), vec!["A", "B", "C", "D"]);
    assert_eq!(finder.surface().engine().marker_count(), 3);
}

#[test]
fn missing_token_is_unavailable_but_list_still_filters() {
    let mut finder = finder(None);
    finder.map_visible();
    finder.set_dataset(dataset());
    assert!(!finder.map_available());
    assert_eq!(finder.view(), FinderView::Ready);
    finder.select_city(Some("dubai"));
    assert_eq!(visible_ids(&finder), vec!["A", "D"]);
    assert!(finder.surface().engine().calls().is_empty());
}

#[test]
fn no_match_is_reported_without_a_map_token() {
    let mut finder = finder(None);
    finder.map_visible();
    finder.set_dataset(dataset());

    finder.toggle_filter("F3");
    finder.toggle_filter("F4");
    finder.submit_filters();

    assert!(!finder.map_available());
    assert_eq!(finder.view(), FinderView::NoMatch);
    assert!(finder.visible().is_empty());
}

#[test]
fn country_tab_exposes_cities_and_resets_city() {
    let mut finder = ready_finder();
    finder.set_dataset(dataset());

    finder.select_country(0);
    assert_eq!(finder.city_options(), ["Dubai", "Abu Dhabi"]);
    finder.select_city(Some("ABU DHABI"));
    assert_eq!(visible_ids(&finder), vec!["B", "C"]);

    finder.select_country(1);
    assert_eq!(finder.city_options(), ["Riyadh"]);
    assert_eq!(visible_ids(&finder).len(), 4, "city reset with the tab");

    finder.select_country(7);
    assert_eq!(finder.filters().country_tab(), Some(1));
}

#[test]
fn intersecting_filters_and_no_match_state() {
    let mut finder = ready_finder();
    finder.set_dataset(dataset());

    finder.toggle_filter("F1");
    finder.toggle_filter("F2");
    assert_eq!(finder.filter_badge_count(), 2);
    assert_eq!(visible_ids(&finder).len(), 4, "staged only");
    finder.submit_filters();
    assert_eq!(visible_ids(&finder), vec!["B"]);
    assert_eq!(finder.surface().engine().marker_ids(), vec!["B"]);

    finder.toggle_filter("F1");
    finder.toggle_filter("F2");
    finder.toggle_filter("F3");
    finder.toggle_filter("F4");
    finder.submit_filters();
    assert_eq!(finder.view(), FinderView::NoMatch);
    assert!(finder.visible().is_empty());
    assert_eq!(finder.surface().engine().marker_count(), 0);

    finder.clear_filters();
    assert_eq!(finder.view(), FinderView::Ready);
    assert_eq!(finder.filter_badge_count(), 0);
    assert_eq!(finder.surface().engine().marker_count(), 3);
}

#[test]
fn filter_change_recenters_on_first_visible_once() {
    let mut finder = ready_finder();
    finder.set_dataset(dataset());
    assert_eq!(finder.surface().engine().fly_count(), 1);
    finder.handle_map_event(MapEvent::MoveEnd);
    assert_eq!(finder.surface().open_popup(), Some("A"));

    // Same first record: no new animation.
    finder.select_city(Some("dubai"));
    assert_eq!(finder.surface().engine().fly_count(), 1);

    finder.select_city(Some("abu dhabi"));
    assert_eq!(finder.surface().engine().fly_count(), 2);
}

#[test]
fn card_click_flies_and_marks_active() {
    let mut finder = ready_finder();
    finder.set_dataset(dataset());
    finder.handle_map_event(MapEvent::MoveEnd);

    finder.card_clicked(2);
    assert_eq!(finder.active_card(), Some("C"));
    assert!(finder.surface().open_popup().is_none());
    finder.handle_map_event(MapEvent::MoveEnd);
    assert_eq!(finder.surface().open_popup(), Some("C"));

    finder.slide_changed(1);
    assert_eq!(finder.active_card(), Some("B"));

    finder.card_hovered(0);
    assert_eq!(finder.surface().open_popup(), Some("A"));
    assert_eq!(finder.surface().engine().popups().len(), 1);
}

#[test]
fn teardown_releases_map() {
    let mut finder = ready_finder();
    finder.set_dataset(dataset());
    assert!(finder.map_available());
    finder.teardown();
    assert!(finder.surface().engine().is_destroyed());
    assert_eq!(finder.surface().engine().marker_count(), 0);
    assert_eq!(finder.view(), FinderView::Closed);
    assert!(!finder.map_available());
}

struct FixedGeocoder;

impl Geocode for FixedGeocoder {
    fn geocode<'a>(&'a self, query: &'a str) -> BoxFuture<'a, Result<GeocodeResult, GeocoderError>> {
        async move {
            Ok(GeocodeResult {
                suggestions: vec![
                    format!("{query} Road, Abu Dhabi"),
                    "Unrelated Place".to_string(),
                ],
                top: Some(Coordinate {
                    lat: 24.46,
                    lng: 54.36,
                }),
            })
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn picking_a_suggestion_flies_to_nearest_venue() {
    let geocoder: Arc<dyn Geocode> = Arc::new(FixedGeocoder);
    let mut finder = LocationFinder::new(
        &config(Some("pk.test")),
        RecordingEngine::new(),
        Some(geocoder),
        TextDirection::Rtl,
    );
    finder.map_visible();
    finder.handle_map_event(MapEvent::Loaded);
    finder.set_dataset(dataset());
    finder.handle_map_event(MapEvent::MoveEnd);

    finder.set_query("khalid");
    tokio::time::sleep(Duration::from_millis(100)).await;
    finder.search_settled().await;
    assert_eq!(
        finder.suggestions(),
        Suggestions::Items(vec!["khalid Road, Abu Dhabi".to_string()])
    );

    let picked = finder.select_suggestion("khalid Road, Abu Dhabi");
    assert_eq!(picked.as_deref(), Some("C"));
    finder.set_query("khalid Road, Abu Dhabi");
    assert_eq!(finder.query(), "khalid Road, Abu Dhabi");
    assert_eq!(finder.suggestions(), Suggestions::Hidden);

    finder.handle_map_event(MapEvent::MoveEnd);
    assert_eq!(finder.surface().open_popup(), Some("C"));
}

fn city_location_body() -> serde_json::Value {
    json!({
        "properties": {
            "countries": { "items": [
                { "content": { "properties": {
                    "countryName": "UAE",
                    "cityList": { "items": [ { "content": { "properties": { "cityName": "Dubai" } } } ] }
                } } }
            ] },
            "aPILocations": [
                { "id": "a", "name": "Marina",
                  "properties": { "locationLatitude": "25.2", "locationLongitude": "55.3", "cityName": "Dubai" } },
                { "id": "b", "name": "Broken",
                  "properties": { "locationLatitude": "?", "locationLongitude": "55.3", "cityName": "Dubai" } }
            ]
        }
    })
}

#[tokio::test]
async fn load_from_cms_attaches_ratings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/umbraco/api/CommonContent/GetContentWithSasUrls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(city_location_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/umbraco/delivery/api/v2/content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [ { "id": "F1", "name": "Pool", "properties": { "catagoryLocations": [ { "id": "a" } ] } } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/umbraco/api/CommonApi/GetAllLocationRatings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "locationId": "a", "averageRating": 4.9, "totalReviews": 77 }
        ])))
        .mount(&server)
        .await;

    let cms = CmsClient::new(&server.uri(), 5, 0, 0).expect("cms client");
    let mut finder = ready_finder();
    finder.load(&cms).await;

    assert_eq!(finder.view(), FinderView::Ready);
    assert_eq!(finder.dataset().records().len(), 2);
    assert_eq!(finder.dataset().filters().len(), 1);
    assert_eq!(
        finder.dataset().get("a").unwrap().review.unwrap().total_reviews,
        77
    );
    assert_eq!(finder.surface().engine().marker_ids(), vec!["a"]);

    finder.handle_map_event(MapEvent::MoveEnd);
    let popups = finder.surface().engine().popups();
    assert_eq!(popups.len(), 1);
    assert!(popups[0].html.contains("(77 reviews)"));
}

#[tokio::test]
async fn cms_outage_leaves_an_interactive_empty_finder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let cms = CmsClient::new(&server.uri(), 5, 0, 0).expect("cms client");
    let mut finder = ready_finder();
    finder.load(&cms).await;

    assert_eq!(finder.view(), FinderView::Ready);
    assert!(finder.visible().is_empty());
    finder.clear_filters();
    finder.card_clicked(0);
    assert!(finder.active_card().is_none());
}
