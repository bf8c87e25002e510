use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("default time is empty for {url}")]
    EmptyTime { url: String },

    #[error("default time '{time}' is not a path segment of {url}")]
    MissingTime { time: String, url: String },
}

/// An image URL with a slot for the capture time.
///
/// The provider only hands out the URL of the day's default capture; other
/// captures of the same day live at the same URL with the `/<time>/` path
/// segment swapped. The slot is located once, up front, so a URL without
/// that segment is an error instead of silently refetching the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    prefix: String,
    suffix: String,
}

impl UrlTemplate {
    /// Locate `/<default_time>/` in `url`. When the segment occurs more than
    /// once the last occurrence is the slot, since the capture time sits
    /// closest to the file name.
    pub fn parse(url: &str, default_time: &str) -> Result<Self, TemplateError> {
        if default_time.is_empty() {
            return Err(TemplateError::EmptyTime {
                url: url.to_string(),
            });
        }
        let segment = format!("/{}/", default_time);
        let start = url.rfind(&segment).ok_or_else(|| TemplateError::MissingTime {
            time: default_time.to_string(),
            url: url.to_string(),
        })?;
        let slot_start = start + 1;
        let slot_end = slot_start + default_time.len();
        Ok(Self {
            prefix: url[..slot_start].to_string(),
            suffix: url[slot_end..].to_string(),
        })
    }

    pub fn render(&self, time: &str) -> String {
        let mut url = String::with_capacity(self.prefix.len() + time.len() + self.suffix.len());
        url.push_str(&self.prefix);
        url.push_str(time);
        url.push_str(&self.suffix);
        url
    }
}
