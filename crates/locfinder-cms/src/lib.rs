//! Read-only client for the CMS content the location finder is built from.
//!
//! Fetches the city/location tree, the category filter groups and the
//! per-location ratings, and normalises the loosely typed JSON into
//! [`locfinder_core::LocationRecord`]s. Individual malformed records are
//! skipped with a warning rather than failing the whole response.

pub mod blocks;
pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

mod retry;

pub use blocks::{parse_page_blocks, BlockKind, PageBlock};
pub use client::{CityLocations, CmsClient};
pub use error::CmsError;
pub use normalize::{attach_reviews, normalize_location};
