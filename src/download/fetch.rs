use reqwest::Client;
use sha2::{Digest, Sha256};

use super::error::FetchError;
use crate::retry::{self, RetryConfig};

/// SHA-256 of an image's bytes, used to spot a camera serving the same
/// frame again (typically while it is offline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&Sha256::digest(bytes));
        Self(hash)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// A frame is a duplicate only of the last frame that was accepted; there
/// is no archive-wide uniqueness check.
pub fn is_duplicate(previous: Option<&Fingerprint>, current: &Fingerprint) -> bool {
    previous == Some(current)
}

/// Retrieval of one image by URL. `None` means "nothing to save"; the
/// implementation has already logged why.
#[async_trait::async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// Plain HTTP fetcher for image URLs. Image hosts don't need the API
/// credentials, so this uses its own client without them.
pub struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    pub fn new(client: Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }
}

#[async_trait::async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let result = retry::retry_transient(&self.retry, "Image fetch", || {
            attempt_fetch(&self.client, url)
        })
        .await;

        match result {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }
}

async fn attempt_fetch(client: &Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let http_err = |source| FetchError::Http {
        source,
        url: url.to_string(),
    };
    let response = client.get(url).send().await.map_err(http_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await.map_err(http_err)?;
    Ok(bytes.to_vec())
}
