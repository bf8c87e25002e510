use clap::Parser;

use crate::provider::endpoints::{DEFAULT_API_URL, DEFAULT_APP_ID};
use crate::types::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "oxbluepd-rs",
    version,
    about = "Mirror time-lapse images from an app.oxblue.com open link"
)]
pub struct Cli {
    /// Open link in the form https://app.oxblue.com/open/xxxx/yyyy
    pub url: String,

    /// Date to start from (2021-01-31, 20210131, 2021-01-31T08:00:00 or an interval like 30d).
    /// Defaults to each camera's first upload.
    #[arg(short = 's', long)]
    pub start: Option<String>,

    /// Download every capture time of each day instead of one image per day
    #[arg(short = 'a', long)]
    pub all_times: bool,

    /// Local directory for the mirrored archive
    #[arg(short = 'd', long, default_value = "output")]
    pub directory: String,

    /// Fetch and compare images without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Retries for an image that fails with a transient error (429, 5xx, connection)
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Base delay in seconds between image retries
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// HTTP timeout in seconds for API and image requests
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Provider API base URL
    #[arg(long, env = "OXBLUE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Application id sent with every API request
    #[arg(long, env = "OXBLUE_APP_ID", default_value = DEFAULT_APP_ID, hide_default_value = true)]
    pub app_id: String,
}
