use thiserror::Error;

/// Errors raised while bringing up the map surface.
///
/// Both are fatal to the map component only: the surface logs them and
/// stays non-interactive; they never propagate to the page.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("no map access token configured")]
    MissingAccessToken,

    #[error("map engine failed to initialize: {reason}")]
    EngineInit { reason: String },
}
