//! oxbluepd-rs: mirrors the image archive of OxBlue construction cameras
//! shared through an open link.
//!
//! Every camera behind the link is walked day by day from its first upload
//! (or `--start`) to its last upload. A frame identical to the previously
//! saved one is skipped, so long runs of an idle or offline camera collapse
//! to a single image.

#![warn(clippy::all)]

mod cli;
mod config;
mod download;
mod provider;
mod retry;
mod shutdown;
mod types;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use download::fetch::HttpFetcher;
use download::store::DirectoryStore;
use download::MirrorConfig;
use provider::endpoints::Endpoints;
use provider::Session;
use retry::RetryConfig;

/// Upper bound for the backoff between image retries.
const MAX_RETRY_DELAY_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::debug!(?config, "Starting oxbluepd-rs");

    let timeout = Duration::from_secs(config.timeout_secs);
    let endpoints = Endpoints::new(&config.api_url)?;
    let session = Session::open(endpoints, &config.app_id, &config.open_link, timeout)
        .await
        .context("Opening the shared camera link")?;

    let image_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Building image client")?;
    let fetcher = HttpFetcher::new(
        image_client,
        RetryConfig {
            max_retries: config.max_retries,
            base_delay_secs: config.retry_delay_secs,
            max_delay_secs: MAX_RETRY_DELAY_SECS,
        },
    );

    let store = DirectoryStore::new(config.directory.clone());
    if config.dry_run {
        tracing::info!("[DRY RUN] Nothing will be written to {}", store.root().display());
    } else {
        tracing::info!("Saving frames under {}", store.root().display());
    }

    let mirror_config = MirrorConfig {
        start: config.start,
        selection: config.selection,
        dry_run: config.dry_run,
        no_progress_bar: config.no_progress_bar,
    };

    let shutdown_token = shutdown::install_signal_handler()?;
    let summary =
        download::mirror_open_link(&session, &fetcher, &store, &mirror_config, shutdown_token)
            .await?;

    if summary.totals.interrupted {
        tracing::info!("Stopped before the archive was fully mirrored; rerun to continue");
    }
    Ok(())
}
