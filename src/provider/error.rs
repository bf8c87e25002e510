use thiserror::Error;

/// Errors from the provider API. All of them are fatal for the run: a bad
/// open link or an API outage will not be fixed by asking again.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("API error (HTTP {code}) from {endpoint}: {message}")]
    ApiStatus {
        code: u16,
        endpoint: String,
        message: String,
    },

    #[error("Open link was not accepted: no session id in response")]
    NoSession,

    #[error("Camera {camera_id}: cannot parse {field} '{value}'")]
    Timestamp {
        camera_id: String,
        field: &'static str,
        value: String,
    },

    #[error("Malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
