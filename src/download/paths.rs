use std::path::{Path, PathBuf};

use chrono::NaiveDate;

pub const IMAGE_EXTENSION: &str = "jpg";

/// Name of a saved frame, without extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameLabel {
    /// Representative image of a day: `YYYYMMDD`.
    Day(NaiveDate),
    /// One capture of a day: `YYYYMMDD-<time>`.
    DayTime(NaiveDate, String),
}

impl std::fmt::Display for FrameLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameLabel::Day(date) => write!(f, "{}", date.format("%Y%m%d")),
            FrameLabel::DayTime(date, time) => {
                write!(f, "{}-{}", date.format("%Y%m%d"), clean_filename(time))
            }
        }
    }
}

/// Remove characters that are invalid in file names on common filesystems:
/// `/`, `\`, `:`, `*`, `?`, `"`, `<`, `>`, `|`.
pub fn clean_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

/// Directory name for a camera. Ids that clean down to nothing, or to a
/// relative path component, are replaced so they cannot escape the root.
pub fn camera_dir_name(camera_id: &str) -> String {
    let clean = clean_filename(camera_id);
    if matches!(clean.trim(), "" | "." | "..") {
        "_".repeat(clean.len().max(1))
    } else {
        clean
    }
}

pub fn camera_dir(root: &Path, camera_id: &str) -> PathBuf {
    root.join(camera_dir_name(camera_id))
}

/// `<root>/<camera>/<label>.jpg`
pub fn frame_path(root: &Path, camera_id: &str, label: &FrameLabel) -> PathBuf {
    camera_dir(root, camera_id).join(format!("{}.{}", label, IMAGE_EXTENSION))
}
