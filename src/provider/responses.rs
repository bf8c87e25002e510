//! Wire formats of the OxBlue API.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Response from `POST openlink-sessions`.
#[derive(Debug, Deserialize)]
pub struct OpenLinkSessionResponse {
    #[serde(rename = "sessionID", default)]
    pub session_id: Option<String>,
}

/// Response from `GET openlink-cameras`.
#[derive(Debug, Deserialize)]
pub struct OpenLinkCamerasResponse {
    #[serde(default)]
    pub cameras: Vec<CameraRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub first_upload: String,
    pub last_upload: String,
}

/// Response from `GET cameras/{id}/images`.
#[derive(Debug, Deserialize)]
pub struct CameraImagesResponse {
    #[serde(default, deserialize_with = "strings_or_numbers")]
    pub times: Vec<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub time: String,
    pub paths: ImagePaths,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePaths {
    pub save_path: String,
}

/// Ids and capture times show up as either JSON strings or bare numbers
/// depending on the endpoint; both are kept in their textual form because
/// they are spliced into URLs and filenames verbatim.
fn value_to_text<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_text(Value::deserialize(deserializer)?)
}

fn strings_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    values.into_iter().map(value_to_text).collect()
}
