use thiserror::Error;

/// Errors returned by the place-search client.
#[derive(Debug, Error)]
pub enum GeocoderError {
    /// Network or TLS failure. The request URL is stripped so the access
    /// token never reaches logs.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("geocoder returned HTTP {status}")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for geocoder response: {source}")]
    Deserialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid geocoder base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
