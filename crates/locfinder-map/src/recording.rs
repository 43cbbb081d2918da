//! An in-memory [`MapEngine`] that records every call.
//!
//! Used by the tests and by the CLI's headless preview. It tracks the live
//! marker and popup sets so leaks and duplicates are observable.

use std::collections::BTreeMap;

use locfinder_core::Coordinate;

use crate::engine::{MapEngine, MapInit, MarkerHandle, PopupHandle};
use crate::error::MapError;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Create,
    AddMarker(String),
    RemoveMarker(String),
    FlyTo { center: Coordinate, zoom: Option<f64> },
    ShowPopup(Coordinate),
    RemovePopup,
    Destroy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LivePopup {
    pub at: Coordinate,
    pub html: String,
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    init: Option<MapInit>,
    fail_with: Option<String>,
    destroyed: bool,
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, (String, Coordinate)>,
    popups: BTreeMap<PopupHandle, LivePopup>,
    calls: Vec<EngineCall>,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose `create` fails with `reason`.
    #[must_use]
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn init(&self) -> Option<&MapInit> {
        self.init.as_ref()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Location ids of the live markers, in creation order.
    #[must_use]
    pub fn marker_ids(&self) -> Vec<&str> {
        self.markers.values().map(|(id, _)| id.as_str()).collect()
    }

    #[must_use]
    pub fn popups(&self) -> Vec<&LivePopup> {
        self.popups.values().collect()
    }

    #[must_use]
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Number of `fly_to` calls recorded.
    #[must_use]
    pub fn fly_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, EngineCall::FlyTo { .. }))
            .count()
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl MapEngine for RecordingEngine {
    fn create(&mut self, init: &MapInit) -> Result<(), MapError> {
        if let Some(reason) = &self.fail_with {
            return Err(MapError::EngineInit {
                reason: reason.clone(),
            });
        }
        self.calls.push(EngineCall::Create);
        self.init = Some(init.clone());
        Ok(())
    }

    fn add_marker(&mut self, location_id: &str, at: Coordinate) -> MarkerHandle {
        let handle = MarkerHandle(self.handle());
        self.markers.insert(handle, (location_id.to_owned(), at));
        self.calls.push(EngineCall::AddMarker(location_id.to_owned()));
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        if let Some((id, _)) = self.markers.remove(&marker) {
            self.calls.push(EngineCall::RemoveMarker(id));
        }
    }

    fn fly_to(&mut self, center: Coordinate, zoom: Option<f64>) {
        self.calls.push(EngineCall::FlyTo { center, zoom });
    }

    fn show_popup(&mut self, at: Coordinate, html: &str) -> PopupHandle {
        let handle = PopupHandle(self.handle());
        self.popups.insert(
            handle,
            LivePopup {
                at,
                html: html.to_owned(),
            },
        );
        self.calls.push(EngineCall::ShowPopup(at));
        handle
    }

    fn remove_popup(&mut self, popup: PopupHandle) {
        if self.popups.remove(&popup).is_some() {
            self.calls.push(EngineCall::RemovePopup);
        }
    }

    fn destroy(&mut self) {
        self.markers.clear();
        self.popups.clear();
        self.destroyed = true;
        self.calls.push(EngineCall::Destroy);
    }
}
