//! The location finder: dataset, filters, map, search and list wired
//! together.
//!
//! Every failure that reaches this layer is logged and turned into an
//! empty or unavailable state; nothing is returned to the page.

use std::collections::HashMap;
use std::sync::Arc;

use locfinder_cms::{CityLocations, CmsClient};
use locfinder_core::{AppConfig, LocationRecord, TextDirection};
use locfinder_geocoder::Geocode;

use crate::dataset::LocationDataset;
use crate::engine::{MapEngine, MapEvent};
use crate::filter::{apply_filters, FilterOutcome, FilterState};
use crate::search::{SearchController, SearchSettings, Suggestions};
use crate::surface::{MapSurface, SurfaceConfig, SurfaceState};
use crate::sync::{CardLayout, ListSync};

/// What the list section should render.
///
/// Map availability is reported separately by
/// [`LocationFinder::map_available`]; a missing credential only takes the
/// map away, never the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinderView {
    /// Content has not been loaded yet.
    Loading,
    /// The selected category filters have no venue in common.
    NoMatch,
    /// Show the visible set, which may be empty.
    Ready,
    /// The finder was torn down.
    Closed,
}

pub struct LocationFinder<E: MapEngine> {
    dataset: LocationDataset,
    filters: FilterState,
    outcome: FilterOutcome,
    loaded: bool,
    surface: MapSurface<E>,
    search: SearchController,
    sync: ListSync,
}

impl<E: MapEngine> LocationFinder<E> {
    #[must_use]
    pub fn new(
        config: &AppConfig,
        engine: E,
        geocoder: Option<Arc<dyn Geocode>>,
        direction: TextDirection,
    ) -> Self {
        Self {
            dataset: LocationDataset::default(),
            filters: FilterState::default(),
            outcome: FilterOutcome::default(),
            loaded: false,
            surface: MapSurface::new(engine, SurfaceConfig::from_app_config(config, direction)),
            search: SearchController::new(geocoder, SearchSettings::from_app_config(config)),
            sync: ListSync::new(&config.map, direction),
        }
    }

    /// Loads venues, filter groups and ratings concurrently.
    ///
    /// A failed request is logged and contributes nothing; the finder still
    /// becomes interactive.
    pub async fn load(&mut self, cms: &CmsClient) {
        let (content, filters, ratings) = futures::join!(
            cms.fetch_city_locations(),
            cms.fetch_location_filters(),
            cms.fetch_location_ratings(),
        );

        let content = content.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load locations; showing none");
            CityLocations::default()
        });
        let filters = filters.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load location filters");
            Vec::new()
        });
        let ratings = ratings.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load location ratings");
            HashMap::new()
        });

        self.set_dataset(LocationDataset::from_content(content, filters, &ratings));
    }

    /// Installs an already loaded dataset.
    pub fn set_dataset(&mut self, dataset: LocationDataset) {
        tracing::debug!(
            locations = dataset.records().len(),
            filters = dataset.filters().len(),
            "location dataset loaded"
        );
        self.dataset = dataset;
        self.loaded = true;
        self.sync.reset();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.outcome = apply_filters(&self.dataset, &self.filters);
        self.surface.set_locations(&self.outcome.visible);
        self.sync
            .on_visible_changed(&self.outcome.visible, &mut self.surface);
    }

    #[must_use]
    pub fn view(&self) -> FinderView {
        if self.surface.state() == SurfaceState::Destroyed {
            FinderView::Closed
        } else if !self.loaded {
            FinderView::Loading
        } else if self.outcome.no_match {
            FinderView::NoMatch
        } else {
            FinderView::Ready
        }
    }

    /// Whether the map can still render. False after a configuration or
    /// engine failure and after teardown.
    #[must_use]
    pub fn map_available(&self) -> bool {
        !matches!(
            self.surface.state(),
            SurfaceState::Unavailable | SurfaceState::Destroyed
        )
    }

    #[must_use]
    pub fn dataset(&self) -> &LocationDataset {
        &self.dataset
    }

    /// Cards to list, in dataset order.
    #[must_use]
    pub fn visible(&self) -> &[LocationRecord] {
        &self.outcome.visible
    }

    #[must_use]
    pub fn surface(&self) -> &MapSurface<E> {
        &self.surface
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Cities offered for the selected country tab.
    #[must_use]
    pub fn city_options(&self) -> &[String] {
        self.filters
            .country_tab()
            .and_then(|i| self.dataset.countries().get(i))
            .map(|tab| tab.cities.as_slice())
            .unwrap_or_default()
    }

    pub fn select_country(&mut self, tab: usize) {
        if tab >= self.dataset.countries().len() {
            tracing::debug!(tab, "unknown country tab");
            return;
        }
        self.filters.select_country(tab);
        self.recompute();
    }

    pub fn select_city(&mut self, city: Option<&str>) {
        self.filters.select_city(city);
        self.recompute();
    }

    /// Ticks or unticks a category checkbox without applying it.
    pub fn toggle_filter(&mut self, filter_id: &str) -> bool {
        self.filters.toggle(filter_id)
    }

    pub fn submit_filters(&mut self) {
        self.filters.submit();
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.recompute();
    }

    #[must_use]
    pub fn filter_badge_count(&self) -> usize {
        self.filters.badge_count()
    }

    /// The map container scrolled into view.
    pub fn map_visible(&mut self) {
        self.surface.on_visible();
    }

    pub fn handle_map_event(&mut self, event: MapEvent) {
        self.surface.handle_event(event);
    }

    pub fn set_layout(&mut self, layout: CardLayout) {
        self.sync.set_layout(layout);
    }

    #[must_use]
    pub fn active_card(&self) -> Option<&str> {
        self.sync.active()
    }

    pub fn card_clicked(&mut self, index: usize) {
        self.sync
            .card_clicked(index, &self.outcome.visible, &mut self.surface);
    }

    pub fn slide_changed(&mut self, index: usize) {
        self.sync
            .slide_changed(index, &self.outcome.visible, &mut self.surface);
    }

    pub fn card_hovered(&mut self, index: usize) {
        self.sync
            .card_hovered(index, &self.outcome.visible, &mut self.surface);
    }

    /// New search input. Must be called from within a Tokio runtime.
    pub fn set_query(&mut self, text: &str) {
        self.search.set_query(text);
    }

    #[must_use]
    pub fn query(&self) -> &str {
        self.search.query()
    }

    #[must_use]
    pub fn suggestions(&self) -> Suggestions {
        self.search.suggestions()
    }

    /// Picks a suggestion and flies to the nearest venue. Returns its id.
    pub fn select_suggestion(&mut self, suggestion: &str) -> Option<String> {
        self.search
            .select(suggestion, &self.dataset, &mut self.surface)
    }

    /// Waits for a pending search to complete.
    pub async fn search_settled(&mut self) {
        self.search.settled().await;
    }

    /// Aborts searches and releases the map.
    pub fn teardown(&mut self) {
        self.search.cancel();
        self.surface.teardown();
    }
}
