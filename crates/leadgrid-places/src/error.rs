use thiserror::Error;

/// Errors returned by the places API client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a status outside `OK`/`ZERO_RESULTS`, surfaced
    /// verbatim so callers can relay it.
    #[error("places API error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: String,
        message: Option<String>,
    },

    /// The response body was not the expected JSON shape.
    #[error("invalid response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
