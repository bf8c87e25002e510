//! URL construction for the OxBlue REST API.

use chrono::NaiveDate;
use url::Url;

use super::error::ProviderError;

pub const DEFAULT_API_URL: &str = "https://api.oxblue.com/v1/";

/// Identifier of the public web viewer; the API rejects requests without it.
pub const DEFAULT_APP_ID: &str = "fc18eb502cb52d060bd93897e21d9491";

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Validate the API base URL. Only `http`/`https` bases with a path are
    /// accepted so that every endpoint can be joined below it.
    pub fn new(api_url: &str) -> Result<Self, ProviderError> {
        let base =
            Url::parse(api_url).map_err(|_| ProviderError::InvalidBaseUrl(api_url.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ProviderError::InvalidBaseUrl(api_url.to_string()));
        }
        Ok(Self { base })
    }

    /// `POST openlink-sessions`: redeem an open link for a session id.
    pub fn open_link_sessions(&self) -> Result<Url, ProviderError> {
        self.join(&["openlink-sessions"])
    }

    /// `GET openlink-cameras`: cameras shared through the redeemed link.
    pub fn open_link_cameras(&self) -> Result<Url, ProviderError> {
        self.join(&["openlink-cameras"])
    }

    /// `GET cameras/{id}/images?date=YYYYMMDD&useMostRecentTime=false`.
    pub fn camera_images(&self, camera_id: &str, date: NaiveDate) -> Result<Url, ProviderError> {
        let mut url = self.join(&["cameras", camera_id, "images"])?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y%m%d").to_string())
            .append_pair("useMostRecentTime", "false");
        Ok(url)
    }

    fn join(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
