//! Map surface: owns the engine, its markers and the single open popup.
//!
//! State machine:
//!
//! ```text
//! Uninitialized --on_visible--> Initializing --Loaded--> Ready
//!        \                           |
//!         `--(no token / engine error)--> Unavailable
//! any --teardown--> Destroyed
//! ```
//!
//! Inside `Ready` a popup is either open or not. Opening one always removes
//! the previous one first. Work requested before `Ready` is queued (latest
//! marker set, latest navigation) and replayed on `Loaded`.

use std::collections::HashMap;

use locfinder_core::{
    AppConfig, ControlPosition, Coordinate, LocationRecord, MapDefaults, RatingFallback,
    TextDirection,
};

use crate::engine::{MapEngine, MapEvent, MapInit, MarkerHandle, PopupHandle};
use crate::error::MapError;
use crate::popup::PopupRenderer;

/// Navigation commands other components may issue. The engine itself is
/// never handed out.
pub trait MapNavigator {
    /// Recenters without opening a popup; closes any open popup first.
    fn fly_to(&mut self, center: Coordinate, zoom: Option<f64>);

    /// Recenters, then opens a popup for `record` once the move ends.
    fn fly_to_with_popup(&mut self, center: Coordinate, record: &LocationRecord, zoom: Option<f64>);

    /// Opens a popup immediately without moving the viewport.
    fn open_popup_at(&mut self, at: Coordinate, record: &LocationRecord);

    /// Closes the open popup, if any.
    fn close_popup(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Initializing,
    Ready,
    /// Configuration or engine failure. Nothing interactive is rendered.
    Unavailable,
    Destroyed,
}

/// Construction parameters for [`MapSurface`].
#[derive(Clone)]
pub struct SurfaceConfig {
    pub access_token: Option<String>,
    pub defaults: MapDefaults,
    pub direction: TextDirection,
    pub rating_fallback: RatingFallback,
}

impl SurfaceConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, direction: TextDirection) -> Self {
        Self {
            access_token: config.mapbox_token.clone(),
            defaults: config.map.clone(),
            direction,
            rating_fallback: config.rating_fallback,
        }
    }
}

#[derive(Debug, Clone)]
enum Navigation {
    FlyTo {
        center: Coordinate,
        zoom: Option<f64>,
    },
    FlyToWithPopup {
        center: Coordinate,
        record: LocationRecord,
        zoom: Option<f64>,
    },
    OpenPopup {
        at: Coordinate,
        record: LocationRecord,
    },
}

#[derive(Debug)]
struct OpenPopup {
    location_id: String,
    handle: PopupHandle,
}

#[derive(Debug)]
struct PendingPopup {
    at: Coordinate,
    record: LocationRecord,
}

pub struct MapSurface<E: MapEngine> {
    engine: E,
    access_token: Option<String>,
    defaults: MapDefaults,
    control_position: ControlPosition,
    state: SurfaceState,
    markers: Vec<MarkerHandle>,
    marker_records: HashMap<String, LocationRecord>,
    queued_locations: Option<Vec<LocationRecord>>,
    queued_navigation: Option<Navigation>,
    popup: Option<OpenPopup>,
    pending_popup: Option<PendingPopup>,
    renderer: PopupRenderer,
}

impl<E: MapEngine> MapSurface<E> {
    #[must_use]
    pub fn new(engine: E, config: SurfaceConfig) -> Self {
        Self {
            engine,
            access_token: config.access_token.filter(|t| !t.trim().is_empty()),
            defaults: config.defaults,
            control_position: config.direction.control_position(),
            state: SurfaceState::Uninitialized,
            markers: Vec::new(),
            marker_records: HashMap::new(),
            queued_locations: None,
            queued_navigation: None,
            popup: None,
            pending_popup: None,
            renderer: PopupRenderer::new(config.rating_fallback),
        }
    }

    #[must_use]
    pub fn state(&self) -> SurfaceState {
        self.state
    }

    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.state == SurfaceState::Unavailable
    }

    /// Read-only view of the engine adapter, for inspection.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Location id the open popup is bound to.
    #[must_use]
    pub fn open_popup(&self) -> Option<&str> {
        self.popup.as_ref().map(|p| p.location_id.as_str())
    }

    /// Whether a fly-then-open is waiting for the move to end.
    #[must_use]
    pub fn has_pending_popup(&self) -> bool {
        self.pending_popup.is_some()
    }

    /// Starts the engine the first time the container becomes visible.
    ///
    /// A missing access token or an engine failure leaves the surface
    /// `Unavailable`; the error is logged, never returned.
    pub fn on_visible(&mut self) {
        if self.state != SurfaceState::Uninitialized {
            return;
        }
        match self.start_engine() {
            Ok(()) => {
                tracing::debug!("map engine created; waiting for load");
                self.state = SurfaceState::Initializing;
            }
            Err(e) => {
                tracing::error!(error = %e, "map surface unavailable");
                self.state = SurfaceState::Unavailable;
                self.queued_locations = None;
                self.queued_navigation = None;
            }
        }
    }

    fn start_engine(&mut self) -> Result<(), MapError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(MapError::MissingAccessToken)?;
        let init = MapInit::new(token, &self.defaults, self.control_position);
        self.engine.create(&init)
    }

    /// Feeds an engine event into the state machine.
    pub fn handle_event(&mut self, event: MapEvent) {
        if event == MapEvent::Loaded {
            if self.state == SurfaceState::Initializing {
                self.state = SurfaceState::Ready;
                tracing::debug!("map ready");
                self.replay_queued();
            }
            return;
        }
        if self.state != SurfaceState::Ready {
            tracing::debug!(?event, state = ?self.state, "ignoring map event");
            return;
        }

        match event {
            MapEvent::MoveEnd => {
                if let Some(pending) = self.pending_popup.take() {
                    self.show_popup(pending.at, &pending.record);
                }
            }
            MapEvent::MarkerHover(id) => {
                if let Some((at, record)) = self.marker_target(&id) {
                    self.open_popup_at(at, &record);
                }
            }
            MapEvent::MarkerClick(id) => {
                if let Some((at, record)) = self.marker_target(&id) {
                    let zoom = self.defaults.focus_zoom;
                    self.fly_to_with_popup(at, &record, Some(zoom));
                }
            }
            MapEvent::MapClick | MapEvent::PopupClosed => self.close_popup(),
            MapEvent::Loaded => {}
        }
    }

    fn marker_target(&self, location_id: &str) -> Option<(Coordinate, LocationRecord)> {
        let record = self.marker_records.get(location_id)?;
        Some((record.coordinate?, record.clone()))
    }

    /// Replaces the markers with one per mapped record.
    ///
    /// Every previous marker is removed before any new one is added. Records
    /// without coordinates and repeated ids are skipped.
    pub fn set_locations(&mut self, records: &[LocationRecord]) {
        match self.state {
            SurfaceState::Ready => self.refresh_markers(records),
            SurfaceState::Uninitialized | SurfaceState::Initializing => {
                self.queued_locations = Some(records.to_vec());
            }
            SurfaceState::Unavailable | SurfaceState::Destroyed => {}
        }
    }

    fn refresh_markers(&mut self, records: &[LocationRecord]) {
        self.remove_markers();
        for record in records {
            let Some(at) = record.coordinate else {
                continue;
            };
            if self.marker_records.contains_key(&record.id) {
                continue;
            }
            let handle = self.engine.add_marker(&record.id, at);
            self.markers.push(handle);
            self.marker_records.insert(record.id.clone(), record.clone());
        }
        tracing::debug!(markers = self.markers.len(), "markers refreshed");
    }

    fn remove_markers(&mut self) {
        for handle in self.markers.drain(..) {
            self.engine.remove_marker(handle);
        }
        self.marker_records.clear();
    }

    fn replay_queued(&mut self) {
        if let Some(records) = self.queued_locations.take() {
            self.refresh_markers(&records);
        }
        match self.queued_navigation.take() {
            Some(Navigation::FlyTo { center, zoom }) => self.fly_to(center, zoom),
            Some(Navigation::FlyToWithPopup {
                center,
                record,
                zoom,
            }) => self.fly_to_with_popup(center, &record, zoom),
            Some(Navigation::OpenPopup { at, record }) => self.open_popup_at(at, &record),
            None => {}
        }
    }

    /// Queues `navigation` if the engine is still starting.
    ///
    /// Returns `true` when the caller should act now.
    fn ready_or_queue(&mut self, navigation: Navigation) -> bool {
        match self.state {
            SurfaceState::Ready => true,
            SurfaceState::Uninitialized | SurfaceState::Initializing => {
                self.queued_navigation = Some(navigation);
                false
            }
            SurfaceState::Unavailable | SurfaceState::Destroyed => false,
        }
    }

    fn show_popup(&mut self, at: Coordinate, record: &LocationRecord) {
        if let Some(previous) = self.popup.take() {
            self.engine.remove_popup(previous.handle);
        }
        let html = self.renderer.render(record);
        let handle = self.engine.show_popup(at, &html);
        self.popup = Some(OpenPopup {
            location_id: record.id.clone(),
            handle,
        });
    }

    /// Removes markers and the popup and destroys the engine instance.
    /// Safe to call more than once.
    pub fn teardown(&mut self) {
        if matches!(
            self.state,
            SurfaceState::Initializing | SurfaceState::Ready
        ) {
            self.pending_popup = None;
            if let Some(popup) = self.popup.take() {
                self.engine.remove_popup(popup.handle);
            }
            self.remove_markers();
            self.engine.destroy();
            tracing::debug!("map surface torn down");
        }
        self.queued_locations = None;
        self.queued_navigation = None;
        self.renderer.clear();
        self.state = SurfaceState::Destroyed;
    }
}

impl<E: MapEngine> MapNavigator for MapSurface<E> {
    fn fly_to(&mut self, center: Coordinate, zoom: Option<f64>) {
        if !self.ready_or_queue(Navigation::FlyTo { center, zoom }) {
            return;
        }
        self.close_popup();
        self.engine.fly_to(center, zoom);
    }

    fn fly_to_with_popup(&mut self, center: Coordinate, record: &LocationRecord, zoom: Option<f64>) {
        let queued = Navigation::FlyToWithPopup {
            center,
            record: record.clone(),
            zoom,
        };
        if !self.ready_or_queue(queued) {
            return;
        }
        self.close_popup();
        self.engine.fly_to(center, zoom);
        self.pending_popup = Some(PendingPopup {
            at: center,
            record: record.clone(),
        });
    }

    fn open_popup_at(&mut self, at: Coordinate, record: &LocationRecord) {
        let queued = Navigation::OpenPopup {
            at,
            record: record.clone(),
        };
        if !self.ready_or_queue(queued) {
            return;
        }
        self.show_popup(at, record);
    }

    fn close_popup(&mut self) {
        if self.state != SurfaceState::Ready {
            // Keep a queued move but forget the popup it would open.
            self.queued_navigation = match self.queued_navigation.take() {
                Some(Navigation::FlyToWithPopup { center, zoom, .. }) => {
                    Some(Navigation::FlyTo { center, zoom })
                }
                Some(Navigation::OpenPopup { .. }) | None => None,
                fly @ Some(Navigation::FlyTo { .. }) => fly,
            };
            return;
        }
        self.pending_popup = None;
        if let Some(popup) = self.popup.take() {
            self.engine.remove_popup(popup.handle);
        }
    }
}

impl<E: MapEngine> Drop for MapSurface<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "surface_test.rs"]
mod tests;
