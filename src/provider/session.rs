use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::endpoints::Endpoints;
use super::error::ProviderError;
use super::responses::{CameraImagesResponse, OpenLinkCamerasResponse, OpenLinkSessionResponse};
use super::types::{Camera, DayManifest};

const APP_ID_HEADER: &str = "X-APP-ID";

/// An open-link session with the provider API.
///
/// Every request carries the application id header; once the link has been
/// redeemed, requests also carry the session id as a bearer token. The
/// session lives for the whole run and is never refreshed.
pub struct Session {
    client: Client,
    endpoints: Endpoints,
    session_id: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoints", &self.endpoints)
            .field("session_id", &"<redacted>")
            .finish()
    }
}

impl Session {
    /// Redeem `open_link` (the token after `/open/` in a shared URL) for a
    /// session id.
    pub async fn open(
        endpoints: Endpoints,
        app_id: &str,
        open_link: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(APP_ID_HEADER, HeaderValue::from_str(app_id)?);

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        let url = endpoints.open_link_sessions()?;
        tracing::debug!("POST {}", url);
        let response = client
            .post(url.clone())
            .form(&[("openLink", open_link)])
            .send()
            .await?;
        let opened: OpenLinkSessionResponse = decode(response, url.as_str()).await?;

        let session_id = opened
            .session_id
            .filter(|id| !id.is_empty())
            .ok_or(ProviderError::NoSession)?;
        tracing::debug!("Open link session established");

        Ok(Self {
            client,
            endpoints,
            session_id,
        })
    }

    /// Cameras visible through the open link, in the order the API lists them.
    pub async fn list_cameras(&self) -> Result<Vec<Camera>, ProviderError> {
        let url = self.endpoints.open_link_cameras()?;
        let response: OpenLinkCamerasResponse = self.get_json(url).await?;
        response
            .cameras
            .into_iter()
            .map(Camera::from_record)
            .collect()
    }

    pub async fn day_manifest(
        &self,
        camera_id: &str,
        date: NaiveDate,
    ) -> Result<DayManifest, ProviderError> {
        let url = self.endpoints.camera_images(camera_id, date)?;
        let response: CameraImagesResponse = self.get_json(url).await?;
        Ok(DayManifest::from_response(date, response))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: url::Url) -> Result<T, ProviderError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.session_id)
            .send()
            .await?;
        decode(response, url.as_str()).await
    }
}

/// Turn a response into `T`, treating any non-success status as fatal.
async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::ApiStatus {
            code: status.as_u16(),
            endpoint: endpoint.to_string(),
            message: body.chars().take(200).collect(),
        });
    }
    serde_json::from_str(&body).map_err(|source| ProviderError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
