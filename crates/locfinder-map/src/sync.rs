//! Keeps the card list and the map viewport in step.

use locfinder_core::{Coordinate, LocationRecord, MapDefaults, TextDirection};

use crate::surface::MapNavigator;

/// Container the cards are presented in. Selection behaves the same in
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardLayout {
    /// Vertical scrolling list beside the map.
    #[default]
    Desktop,
    /// Horizontal swiper below the map.
    Mobile,
}

pub struct ListSync {
    layout: CardLayout,
    direction: TextDirection,
    focus_zoom: f64,
    overview_zoom: f64,
    last_flown: Option<Coordinate>,
    active: Option<String>,
}

impl ListSync {
    #[must_use]
    pub fn new(defaults: &MapDefaults, direction: TextDirection) -> Self {
        Self {
            layout: CardLayout::default(),
            direction,
            focus_zoom: defaults.focus_zoom,
            overview_zoom: defaults.overview_zoom,
            last_flown: None,
            active: None,
        }
    }

    #[must_use]
    pub fn layout(&self) -> CardLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: CardLayout) {
        self.layout = layout;
    }

    /// Scroll direction for the swiper.
    #[must_use]
    pub fn direction(&self) -> TextDirection {
        self.direction
    }

    /// Id of the card styled as active.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Reacts to a new visible set.
    ///
    /// Flies to the first record unless the camera already went there for
    /// an earlier set. The active card is dropped if it is no longer listed.
    pub fn on_visible_changed(&mut self, visible: &[LocationRecord], nav: &mut dyn MapNavigator) {
        if self
            .active
            .as_ref()
            .is_some_and(|id| !visible.iter().any(|r| &r.id == id))
        {
            self.active = None;
        }

        let Some(first) = visible.first() else {
            return;
        };
        let Some(at) = first.coordinate else {
            return;
        };
        if self.last_flown == Some(at) {
            return;
        }
        nav.fly_to_with_popup(at, first, Some(self.overview_zoom));
        self.last_flown = Some(at);
    }

    /// A card was clicked (desktop).
    pub fn card_clicked(&mut self, index: usize, visible: &[LocationRecord], nav: &mut dyn MapNavigator) {
        self.focus(index, visible, nav);
    }

    /// The swiper settled on a new slide (mobile).
    pub fn slide_changed(&mut self, index: usize, visible: &[LocationRecord], nav: &mut dyn MapNavigator) {
        self.focus(index, visible, nav);
    }

    /// The pointer entered a card: preview its popup in place.
    pub fn card_hovered(&self, index: usize, visible: &[LocationRecord], nav: &mut dyn MapNavigator) {
        if let Some((at, record)) = target(index, visible) {
            nav.open_popup_at(at, record);
        }
    }

    fn focus(&mut self, index: usize, visible: &[LocationRecord], nav: &mut dyn MapNavigator) {
        let Some(record) = visible.get(index) else {
            tracing::debug!(index, len = visible.len(), "card index out of range");
            return;
        };
        self.active = Some(record.id.clone());
        if let Some(at) = record.coordinate {
            nav.fly_to_with_popup(at, record, Some(self.focus_zoom));
        }
    }

    /// Forgets the last flown position so the next visible set re-centers.
    pub fn reset(&mut self) {
        self.last_flown = None;
        self.active = None;
    }
}

fn target(index: usize, visible: &[LocationRecord]) -> Option<(Coordinate, &LocationRecord)> {
    let record = visible.get(index)?;
    Some((record.coordinate?, record))
}
