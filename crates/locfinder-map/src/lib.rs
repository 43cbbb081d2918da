//! Interactive location finder.
//!
//! - [`dataset`]: the read-only venue collection.
//! - [`filter`]: city and category filtering with the no-match state.
//! - [`surface`]: the map state machine, markers and popup lifecycle.
//! - [`search`]: debounced, cancellable place search.
//! - [`sync`]: card list and map viewport synchronisation.
//! - [`finder`]: all of the above behind one façade.
//!
//! The rendering engine is reached only through [`engine::MapEngine`].

pub mod dataset;
pub mod engine;
pub mod error;
pub mod filter;
pub mod finder;
pub mod popup;
pub mod recording;
pub mod search;
pub mod surface;
pub mod sync;

pub use dataset::LocationDataset;
pub use engine::{MapEngine, MapEvent, MapInit, MarkerHandle, PopupHandle};
pub use error::MapError;
pub use filter::{apply_filters, FilterOutcome, FilterState};
pub use finder::{FinderView, LocationFinder};
pub use popup::{popup_html, star_rating_svg, PopupRenderer};
pub use recording::RecordingEngine;
pub use search::{matches_query, SearchController, SearchSettings, Suggestions};
pub use surface::{MapNavigator, MapSurface, SurfaceConfig, SurfaceState};
pub use sync::{CardLayout, ListSync};
