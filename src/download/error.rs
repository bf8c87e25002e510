use thiserror::Error;

use crate::retry::Transient;

/// Why a single image could not be fetched.
///
/// Image failures never abort the walk; this type only decides whether the
/// fetch is worth another attempt before the frame is given up on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP error fetching {url}: {source}")]
    Http { source: reqwest::Error, url: String },
}

impl Transient for FetchError {
    fn is_transient(&self) -> bool {
        match self {
            FetchError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            FetchError::Http { .. } => true,
        }
    }
}
