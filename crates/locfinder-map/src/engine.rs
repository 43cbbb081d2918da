//! The seam to the rendering map engine.
//!
//! The surface drives an engine through [`MapEngine`]; the engine reports
//! user and animation events back as [`MapEvent`]s. Removing a marker must
//! also drop the hover/click listeners the engine attached to it.

use locfinder_core::{ControlPosition, Coordinate, MapDefaults};

use crate::error::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupHandle(pub u64);

/// Everything the engine needs to create its map instance.
#[derive(Clone, PartialEq)]
pub struct MapInit {
    pub access_token: String,
    pub style: String,
    pub center: Coordinate,
    pub zoom: f64,
    pub cooperative_gestures: bool,
    pub attribution_control: bool,
    pub show_compass: bool,
    pub control_position: ControlPosition,
}

impl MapInit {
    #[must_use]
    pub fn new(access_token: &str, defaults: &MapDefaults, control_position: ControlPosition) -> Self {
        Self {
            access_token: access_token.to_owned(),
            style: defaults.style.clone(),
            center: defaults.center,
            zoom: defaults.zoom,
            cooperative_gestures: defaults.cooperative_gestures,
            attribution_control: defaults.attribution_control,
            show_compass: defaults.show_compass,
            control_position,
        }
    }
}

impl std::fmt::Debug for MapInit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapInit")
            .field("access_token", &"[redacted]")
            .field("style", &self.style)
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("cooperative_gestures", &self.cooperative_gestures)
            .field("attribution_control", &self.attribution_control)
            .field("show_compass", &self.show_compass)
            .field("control_position", &self.control_position)
            .finish()
    }
}

/// Events the engine feeds back into the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The map instance finished loading.
    Loaded,
    /// A camera movement (animated or user-driven) ended.
    MoveEnd,
    MarkerHover(String),
    MarkerClick(String),
    /// Click on the map outside any marker or popup.
    MapClick,
    /// The user closed the popup with its own close control.
    PopupClosed,
}

/// Imperative primitives of a map engine.
pub trait MapEngine {
    /// Creates the map instance.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::EngineInit`] if the engine cannot start.
    fn create(&mut self, init: &MapInit) -> Result<(), MapError>;

    /// Adds a marker for `location_id` and wires its hover/click events.
    fn add_marker(&mut self, location_id: &str, at: Coordinate) -> MarkerHandle;

    /// Removes a marker and its listeners.
    fn remove_marker(&mut self, marker: MarkerHandle);

    /// Starts an animated camera move. `None` keeps the current zoom.
    fn fly_to(&mut self, center: Coordinate, zoom: Option<f64>);

    fn show_popup(&mut self, at: Coordinate, html: &str) -> PopupHandle;

    fn remove_popup(&mut self, popup: PopupHandle);

    /// Releases the map instance.
    fn destroy(&mut self);
}
