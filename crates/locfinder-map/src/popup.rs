//! Popup markup for a venue.
//!
//! Rendering is pure; [`PopupRenderer`] memoizes it per surface so repeated
//! hovers over the same marker reuse the markup.

use std::collections::HashMap;
use std::sync::Arc;

use locfinder_core::{LocationRecord, RatingFallback, ReviewSummary};
use maud::{html, Markup, PreEscaped};

const STAR_COUNT: u32 = 5;
const STAR_FILLED: &str = "#FFB400";
const STAR_EMPTY: &str = "#D9D9D9";
const STAR_PATH: &str = "M12 2l3.09 6.26L22 9.27l-5 4.87L18.18 21 12 17.27 5.82 21 7 14.14l-5-4.87 6.91-1.01z";

/// The rating shown for `record`, if any.
#[must_use]
pub fn displayed_review(record: &LocationRecord, fallback: RatingFallback) -> Option<ReviewSummary> {
    match (record.review, fallback) {
        (Some(review), _) => Some(review),
        (None, RatingFallback::Placeholder) => Some(ReviewSummary::PLACEHOLDER),
        (None, RatingFallback::Omit) => None,
    }
}

/// Five inline SVG stars, filled up to the rounded rating.
#[must_use]
pub fn star_rating_svg(rating: f64) -> String {
    // Clamped to 0..=5 so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = if rating.is_finite() {
        rating.round().clamp(0.0, f64::from(STAR_COUNT)) as u32
    } else {
        0
    };

    html! {
        span class="map-popup__stars" {
            @for i in 0..STAR_COUNT {
                svg width="14" height="14" viewBox="0 0 24 24" aria-hidden="true" {
                    path fill=(if i < filled { STAR_FILLED } else { STAR_EMPTY }) d=(STAR_PATH) {}
                }
            }
        }
    }
    .into_string()
}

/// Popup markup for `record`.
#[must_use]
pub fn popup_html(record: &LocationRecord, fallback: RatingFallback) -> String {
    popup_markup(record, fallback).into_string()
}

fn popup_markup(record: &LocationRecord, fallback: RatingFallback) -> Markup {
    let links = [
        (record.join_link(), "Join now"),
        (record.info_link(), "More info"),
        (record.register_link(), "Register interest"),
    ];
    let status_label = record.status_label();

    html! {
        div class="map-popup" {
            @if let Some(image) = &record.image_url {
                img class="map-popup__image" src=(image) alt=(record.name);
            }
            h3 class="map-popup__title" { (record.name) }
            @if let Some(address) = &record.address {
                p class="map-popup__address" { (address) }
            }
            @if let Some(review) = displayed_review(record, fallback) {
                div class="map-popup__rating" {
                    span { (format!("{:.1}", review.average_rating)) }
                    (PreEscaped(star_rating_svg(review.average_rating)))
                    span { "(" (review.total_reviews) " reviews)" }
                }
            }
            @if let Some(label) = status_label {
                span class="map-popup__status" { (label) }
            }
            @for (href, label) in links {
                @if let Some(href) = href {
                    a class="map-popup__link" href=(href) { (label) }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PopupKey {
    location_id: String,
    /// `(rating bits, total)` of the displayed review.
    review: Option<(u64, u32)>,
}

/// Per-surface memo of popup markup keyed by location and rating.
#[derive(Debug, Default)]
pub struct PopupRenderer {
    fallback: RatingFallback,
    cache: HashMap<PopupKey, Arc<str>>,
}

impl PopupRenderer {
    #[must_use]
    pub fn new(fallback: RatingFallback) -> Self {
        Self {
            fallback,
            cache: HashMap::new(),
        }
    }

    pub fn render(&mut self, record: &LocationRecord) -> Arc<str> {
        let key = PopupKey {
            location_id: record.id.clone(),
            review: displayed_review(record, self.fallback)
                .map(|r| (r.average_rating.to_bits(), r.total_reviews)),
        };
        let fallback = self.fallback;
        Arc::clone(
            self.cache
                .entry(key)
                .or_insert_with(|| Arc::from(popup_html(record, fallback))),
        )
    }

    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
