use std::path::PathBuf;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::types::FrameSelection;

const OPEN_LINK_HOST: &str = "app.oxblue.com";
const OPEN_LINK_PATH: &str = "/open/";

/// Application configuration, validated from the command line before any
/// network traffic happens.
pub struct Config {
    pub open_link: String,
    pub directory: PathBuf,
    pub api_url: String,
    pub app_id: String,

    pub start: Option<NaiveDate>,

    pub timeout_secs: u64,
    pub retry_delay_secs: u64,
    pub max_retries: u32,

    pub selection: FrameSelection,

    pub dry_run: bool,
    pub no_progress_bar: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("open_link", &"<redacted>")
            .field("directory", &self.directory)
            .field("start", &self.start)
            .field("selection", &self.selection)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let open_link = parse_open_link(&cli.url)?;
        let start = cli.start.as_deref().map(parse_start_date).transpose()?;

        Ok(Self {
            open_link,
            directory: expand_tilde(&cli.directory),
            api_url: cli.api_url,
            app_id: cli.app_id,
            start,
            timeout_secs: cli.timeout,
            retry_delay_secs: cli.retry_delay,
            max_retries: cli.max_retries,
            selection: FrameSelection::from_all_times(cli.all_times),
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        })
    }
}

/// Extract the open-link token (everything after `/open/`) from a shared
/// camera URL. The scheme may be left off, as people often paste the link
/// without it.
pub(crate) fn parse_open_link(input: &str) -> anyhow::Result<String> {
    let invalid = || {
        anyhow::anyhow!(
            "Invalid URL format '{}'. Must look like https://{}{}xxxx/yyyy",
            input,
            OPEN_LINK_HOST,
            OPEN_LINK_PATH
        )
    };

    let trimmed = input.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = url::Url::parse(&with_scheme).map_err(|_| invalid())?;
    if !url.host_str().is_some_and(|h| h.eq_ignore_ascii_case(OPEN_LINK_HOST)) {
        return Err(invalid());
    }

    let token = url
        .path()
        .strip_prefix(OPEN_LINK_PATH)
        .map(|t| t.trim_matches('/'))
        .ok_or_else(invalid)?;
    if token.is_empty() {
        return Err(invalid());
    }
    Ok(token.to_string())
}

/// Parse the `--start` value into a calendar date.
///
/// Accepts an ISO date (`2021-01-31`), a compact date (`20210131`), an ISO
/// datetime whose time part is dropped (`2021-01-31T08:00:00`), or a relative
/// interval (`30d`, thirty days before today).
pub(crate) fn parse_start_date(s: &str) -> anyhow::Result<NaiveDate> {
    if let Some(days_str) = s.strip_suffix('d') {
        if let Ok(days) = days_str.parse::<u64>() {
            let today = Local::now().date_naive();
            if let Some(date) = today.checked_sub_days(chrono::Days::new(days)) {
                return Ok(date);
            }
        }
    }
    for format in ["%Y-%m-%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Ok(date);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.date());
    }
    anyhow::bail!(
        "Cannot parse '{}' as a start date. Expected ISO date (2021-01-31), \
         compact date (20210131), datetime (2021-01-31T08:00:00), or interval (30d)",
        s
    )
}
