//! Typed page-block dispatch.
//!
//! Each CMS page carries `properties.content.items[].content` blocks tagged
//! with a `contentType` string. The tag is parsed once into [`BlockKind`];
//! renderers match on the enum and unknown tags land in
//! [`BlockKind::Unknown`] instead of being silently dropped.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    HeroSlider,
    LocationCards,
    LocationMap,
    LargeText,
    WelcomeBlock,
    Rewards,
    FeaturedCard,
    FreeTrialForm,
    GoogleReview,
    ScrollableClasses,
    ImageGallery,
    Unknown(String),
}

impl BlockKind {
    /// Maps a CMS `contentType` tag to its block kind.
    ///
    /// Several tags alias the same block (e.g. `dayPassForm` renders the
    /// free-trial form).
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "aboutUsHeroSlider" | "aboutUsHero" => BlockKind::HeroSlider,
            "locationCard" => BlockKind::LocationCards,
            "locationMap" => BlockKind::LocationMap,
            "largeTextComponent" => BlockKind::LargeText,
            "welcomeBlock" => BlockKind::WelcomeBlock,
            "rewards" => BlockKind::Rewards,
            "featuredCard" => BlockKind::FeaturedCard,
            "freeTrailForm" | "freeTrialForm" | "dayPassForm" => BlockKind::FreeTrialForm,
            "googleReview" => BlockKind::GoogleReview,
            "scrollableClassesCard" => BlockKind::ScrollableClasses,
            "imageGalleryWithDescription" => BlockKind::ImageGallery,
            other => BlockKind::Unknown(other.to_owned()),
        }
    }

    /// Whether this block mounts the interactive location finder.
    #[must_use]
    pub fn is_location_finder(&self) -> bool {
        matches!(self, BlockKind::LocationMap)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockKind::HeroSlider => write!(f, "hero-slider"),
            BlockKind::LocationCards => write!(f, "location-cards"),
            BlockKind::LocationMap => write!(f, "location-map"),
            BlockKind::LargeText => write!(f, "large-text"),
            BlockKind::WelcomeBlock => write!(f, "welcome-block"),
            BlockKind::Rewards => write!(f, "rewards"),
            BlockKind::FeaturedCard => write!(f, "featured-card"),
            BlockKind::FreeTrialForm => write!(f, "free-trial-form"),
            BlockKind::GoogleReview => write!(f, "google-review"),
            BlockKind::ScrollableClasses => write!(f, "scrollable-classes"),
            BlockKind::ImageGallery => write!(f, "image-gallery"),
            BlockKind::Unknown(tag) => write!(f, "unknown({tag})"),
        }
    }
}

/// One content block of a page, with its properties left untyped for the
/// presentational layer.
#[derive(Debug, Clone)]
pub struct PageBlock {
    pub kind: BlockKind,
    pub id: Option<String>,
    pub properties: Value,
}

/// Extracts the ordered content blocks from a page response.
///
/// Items without a `contentType` tag are skipped.
#[must_use]
pub fn parse_page_blocks(page: &Value) -> Vec<PageBlock> {
    let Some(items) = page
        .pointer("/properties/content/items")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let content = item.get("content")?;
            let tag = content.get("contentType")?.as_str()?;
            let kind = BlockKind::from_tag(tag);
            if let BlockKind::Unknown(ref tag) = kind {
                tracing::debug!(tag = %tag, "page contains a block with no renderer");
            }
            Some(PageBlock {
                kind,
                id: content.get("id").and_then(Value::as_str).map(str::to_owned),
                properties: content.get("properties").cloned().unwrap_or(Value::Null),
            })
        })
        .collect()
}
