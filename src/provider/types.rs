use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::error::ProviderError;
use super::responses::{CameraImagesResponse, CameraRecord};

/// A camera shared through the open link, with the bounds of its archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    pub id: String,
    pub name: Option<String>,
    pub first_upload: NaiveDate,
    pub last_upload: NaiveDate,
}

impl Camera {
    pub fn from_record(record: CameraRecord) -> Result<Self, ProviderError> {
        let first_upload = parse_upload_date(&record.first_upload).ok_or_else(|| {
            ProviderError::Timestamp {
                camera_id: record.id.clone(),
                field: "firstUpload",
                value: record.first_upload.clone(),
            }
        })?;
        let last_upload = parse_upload_date(&record.last_upload).ok_or_else(|| {
            ProviderError::Timestamp {
                camera_id: record.id.clone(),
                field: "lastUpload",
                value: record.last_upload.clone(),
            }
        })?;
        Ok(Self {
            id: record.id,
            name: record.name,
            first_upload,
            last_upload,
        })
    }

    /// Human-friendly label for log lines.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// The captures available for one camera on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayManifest {
    pub date: NaiveDate,
    pub times: Vec<String>,
    /// Capture the provider picks when asked for "the" image of the day.
    pub default_time: String,
    /// Image URL of the default capture; its path contains `/<default_time>/`.
    pub save_path: String,
}

impl DayManifest {
    pub fn from_response(date: NaiveDate, response: CameraImagesResponse) -> Self {
        Self {
            date,
            times: response.times,
            default_time: response.time,
            save_path: response.paths.save_path,
        }
    }
}

/// Formats of the provider's `M/D/YYYY h:mm AM` style timestamps.
const PROVIDER_FORMATS: &[&str] = &["%m/%d/%Y %I:%M %p", "%m/%d/%Y %I:%M:%S %p"];

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"];

/// Parse an upload timestamp down to its calendar date.
///
/// `lastUpload` arrives as `1/3/2021 5:30 PM` while `firstUpload` is ISO 8601,
/// so both families are tried for either field. Offsets are dropped: the date
/// the camera itself reported is the date of the archive folder.
pub fn parse_upload_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    PROVIDER_FORMATS
        .iter()
        .chain(ISO_DATETIME_FORMATS)
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        })
}
