//! OxBlue open-link API client.
//!
//! A shared camera URL (`https://app.oxblue.com/open/<token>`) is redeemed for
//! a session id, which then authorizes the camera listing and the per-day
//! image manifests the download engine walks.

pub mod endpoints;
pub mod error;
pub mod responses;
pub mod session;
pub mod types;

use chrono::NaiveDate;

pub use self::error::ProviderError;
pub use self::session::Session;
pub use self::types::{Camera, DayManifest};

/// The provider calls the download engine depends on. Implemented by
/// [`Session`]; tests substitute an in-memory archive.
#[async_trait::async_trait]
pub trait ArchiveApi: Send + Sync {
    async fn list_cameras(&self) -> Result<Vec<Camera>, ProviderError>;

    async fn day_manifest(
        &self,
        camera_id: &str,
        date: NaiveDate,
    ) -> Result<DayManifest, ProviderError>;
}

#[async_trait::async_trait]
impl ArchiveApi for Session {
    async fn list_cameras(&self) -> Result<Vec<Camera>, ProviderError> {
        Session::list_cameras(self).await
    }

    async fn day_manifest(
        &self,
        camera_id: &str,
        date: NaiveDate,
    ) -> Result<DayManifest, ProviderError> {
        Session::day_manifest(self, camera_id, date).await
    }
}
