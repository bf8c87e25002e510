#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Which captures of a day get mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSelection {
    /// The manifest's default capture only, saved as `<date>.jpg`.
    Representative,
    /// Every capture listed in the manifest, saved as `<date>-<time>.jpg`.
    AllTimes,
}

impl FrameSelection {
    pub fn from_all_times(all_times: bool) -> Self {
        if all_times {
            FrameSelection::AllTimes
        } else {
            FrameSelection::Representative
        }
    }
}
