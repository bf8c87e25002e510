//! Archive mirroring engine: walks each camera's days in order, fetches the
//! selected captures, and keeps only frames that differ from the last one
//! saved for that camera.

pub mod error;
pub mod fetch;
pub mod paths;
pub mod store;
pub mod template;

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use self::fetch::{Fetch, Fingerprint};
use self::paths::FrameLabel;
use self::store::ArchiveStore;
use self::template::UrlTemplate;
use crate::provider::{ArchiveApi, Camera, DayManifest};
use crate::types::FrameSelection;

/// Subset of application config consumed by the mirroring engine.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub(crate) start: Option<NaiveDate>,
    pub(crate) selection: FrameSelection,
    pub(crate) dry_run: bool,
    pub(crate) no_progress_bar: bool,
}

/// One image to fetch: where it lives and what it is saved as.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    label: FrameLabel,
    url: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CameraSummary {
    pub days: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub interrupted: bool,
}

impl CameraSummary {
    fn absorb(&mut self, other: &CameraSummary) {
        self.days += other.days;
        self.saved += other.saved;
        self.duplicates += other.duplicates;
        self.failed += other.failed;
        self.interrupted |= other.interrupted;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorSummary {
    pub cameras: usize,
    pub totals: CameraSummary,
}

/// First day of a camera's walk: the explicit start when given (even if it
/// lies before the first upload), otherwise the first upload.
pub fn lower_bound(camera: &Camera, start: Option<NaiveDate>) -> NaiveDate {
    start.unwrap_or(camera.first_upload)
}

/// Every calendar day in `lower..=upper`, ascending. Empty when
/// `lower > upper`.
pub fn date_range(lower: NaiveDate, upper: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(lower), |d| d.succ_opt()).take_while(move |d| *d <= upper)
}

fn day_count(lower: NaiveDate, upper: NaiveDate) -> u64 {
    u64::try_from((upper - lower).num_days() + 1).unwrap_or(0)
}

/// Captures to fetch for one day.
fn select_frames(manifest: &DayManifest, selection: FrameSelection) -> Vec<Frame> {
    let date = manifest.date;
    match selection {
        FrameSelection::Representative => vec![Frame {
            label: FrameLabel::Day(date),
            url: manifest.save_path.clone(),
        }],
        FrameSelection::AllTimes => {
            match UrlTemplate::parse(&manifest.save_path, &manifest.default_time) {
                Ok(template) => manifest
                    .times
                    .iter()
                    .map(|time| Frame {
                        label: FrameLabel::DayTime(date, time.clone()),
                        url: template.render(time),
                    })
                    .collect(),
                Err(e) => {
                    if manifest.times.is_empty() {
                        return Vec::new();
                    }
                    tracing::warn!(
                        "{}: {} other captures skipped, fetching only the default capture",
                        e,
                        manifest.times.len().saturating_sub(1)
                    );
                    vec![Frame {
                        label: FrameLabel::DayTime(date, manifest.default_time.clone()),
                        url: manifest.save_path.clone(),
                    }]
                }
            }
        }
    }
}

/// Create a progress bar over a camera's days.
///
/// Hidden when disabled or when stdout is not a TTY, so piped output and
/// cron logs stay clean.
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} days ({eta}) {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Mirror one camera's archive.
///
/// The fingerprint of the last accepted frame is carried across timestamps
/// and days for the whole walk, so frames must be processed strictly in
/// date/time order.
pub async fn mirror_camera(
    api: &dyn ArchiveApi,
    fetcher: &dyn Fetch,
    store: &dyn ArchiveStore,
    camera: &Camera,
    config: &MirrorConfig,
    shutdown_token: &CancellationToken,
) -> Result<CameraSummary> {
    if !config.dry_run {
        store.ensure_location(&camera.id).await?;
    }

    let lower = lower_bound(camera, config.start);
    let upper = camera.last_upload;
    tracing::info!(
        camera = %camera.id,
        "Mirroring {} from {} to {}",
        camera.display_name(),
        lower,
        upper
    );

    let pb = create_progress_bar(config.no_progress_bar, day_count(lower, upper));
    pb.set_message(camera.display_name().to_string());

    let mut summary = CameraSummary::default();
    let mut last_saved: Option<Fingerprint> = None;

    'days: for date in date_range(lower, upper) {
        if shutdown_token.is_cancelled() {
            summary.interrupted = true;
            break;
        }

        let manifest = api
            .day_manifest(&camera.id, date)
            .await
            .with_context(|| format!("Fetching image list of camera {} for {}", camera.id, date))?;

        for frame in select_frames(&manifest, config.selection) {
            if shutdown_token.is_cancelled() {
                summary.interrupted = true;
                break 'days;
            }
            mirror_frame(
                fetcher,
                store,
                &camera.id,
                &frame,
                &mut last_saved,
                config.dry_run,
                &mut summary,
                &pb,
            )
            .await?;
        }

        summary.days += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    tracing::info!(
        camera = %camera.id,
        days = summary.days,
        saved = summary.saved,
        duplicates = summary.duplicates,
        failed = summary.failed,
        "Finished {}",
        camera.display_name()
    );
    Ok(summary)
}

/// Fetch one frame and save it unless it repeats the last saved frame.
///
/// A missing image is counted and skipped; only storage failures are fatal.
#[allow(clippy::too_many_arguments)]
async fn mirror_frame(
    fetcher: &dyn Fetch,
    store: &dyn ArchiveStore,
    camera_id: &str,
    frame: &Frame,
    last_saved: &mut Option<Fingerprint>,
    dry_run: bool,
    summary: &mut CameraSummary,
    pb: &ProgressBar,
) -> Result<()> {
    tracing::debug!("Downloading {}", frame.url);
    let Some(bytes) = fetcher.fetch(&frame.url).await else {
        pb.suspend(|| tracing::warn!("Error {}: image unavailable", frame.label));
        summary.failed += 1;
        return Ok(());
    };

    let fingerprint = Fingerprint::of(&bytes);
    if fetch::is_duplicate(last_saved.as_ref(), &fingerprint) {
        pb.suspend(|| tracing::info!("Skipping {} (unchanged since last saved frame)", frame.label));
        summary.duplicates += 1;
        return Ok(());
    }

    if dry_run {
        pb.suspend(|| tracing::info!("[DRY RUN] Would save {}", frame.label));
    } else {
        let path = store.persist(camera_id, &frame.label, &bytes).await?;
        pb.suspend(|| tracing::info!("Saved {}", path.display()));
    }
    tracing::debug!(%fingerprint, "Accepted {}", frame.label);
    *last_saved = Some(fingerprint);
    summary.saved += 1;
    Ok(())
}

/// Mirror every camera shared through the session, one after another.
/// Any API or storage failure aborts the run.
pub async fn mirror_open_link(
    api: &dyn ArchiveApi,
    fetcher: &dyn Fetch,
    store: &dyn ArchiveStore,
    config: &MirrorConfig,
    shutdown_token: CancellationToken,
) -> Result<MirrorSummary> {
    let started = Instant::now();
    let cameras = api.list_cameras().await.context("Listing cameras")?;
    tracing::info!("Found {} camera(s)", cameras.len());

    let mut summary = MirrorSummary::default();
    for camera in &cameras {
        if shutdown_token.is_cancelled() {
            summary.totals.interrupted = true;
            break;
        }
        let camera_summary =
            mirror_camera(api, fetcher, store, camera, config, &shutdown_token).await?;
        summary.cameras += 1;
        summary.totals.absorb(&camera_summary);
    }

    let totals = &summary.totals;
    tracing::info!("── Summary ──");
    tracing::info!(
        "  {} camera(s), {} day(s) walked in {}",
        summary.cameras,
        totals.days,
        format_duration(started.elapsed())
    );
    tracing::info!(
        "  {} saved, {} unchanged, {} unavailable",
        totals.saved,
        totals.duplicates,
        totals.failed
    );
    if totals.interrupted {
        tracing::info!("  Stopped early on shutdown request");
    }
    Ok(summary)
}

/// Format a duration as `"1h 23m 45s"`, `"5m 30s"`, or `"42s"`.
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h {:02}m {:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use crate::provider::ProviderError;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn camera(id: &str, first: NaiveDate, last: NaiveDate) -> Camera {
        Camera {
            id: id.into(),
            name: None,
            first_upload: first,
            last_upload: last,
        }
    }

    fn config(selection: FrameSelection, start: Option<NaiveDate>) -> MirrorConfig {
        MirrorConfig {
            start,
            selection,
            dry_run: false,
            no_progress_bar: true,
        }
    }

    /// In-memory provider: every day has the same capture times, and the
    /// image URL embeds camera, date and time.
    struct FakeApi {
        cameras: Vec<Camera>,
        times: Vec<String>,
        default_time: String,
        requested: Mutex<Vec<(String, NaiveDate)>>,
        fail_on: Option<NaiveDate>,
    }

    impl FakeApi {
        fn new(cameras: Vec<Camera>, times: &[&str], default_time: &str) -> Self {
            Self {
                cameras,
                times: times.iter().map(|t| t.to_string()).collect(),
                default_time: default_time.into(),
                requested: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn requested_dates(&self) -> Vec<NaiveDate> {
            self.requested.lock().unwrap().iter().map(|(_, d)| *d).collect()
        }
    }

    #[async_trait::async_trait]
    impl ArchiveApi for FakeApi {
        async fn list_cameras(&self) -> Result<Vec<Camera>, ProviderError> {
            Ok(self.cameras.clone())
        }

        async fn day_manifest(
            &self,
            camera_id: &str,
            date: NaiveDate,
        ) -> Result<DayManifest, ProviderError> {
            self.requested
                .lock()
                .unwrap()
                .push((camera_id.to_string(), date));
            if self.fail_on == Some(date) {
                return Err(ProviderError::ApiStatus {
                    code: 500,
                    endpoint: "images".into(),
                    message: String::new(),
                });
            }
            Ok(DayManifest {
                date,
                times: self.times.clone(),
                default_time: self.default_time.clone(),
                save_path: format!(
                    "https://img.test/{}/{}/{}/full.jpg",
                    camera_id,
                    date.format("%Y%m%d"),
                    self.default_time
                ),
            })
        }
    }

    /// Serves bytes from a script keyed by URL; unknown URLs are "missing".
    /// With `same_bytes`, every URL returns identical content.
    #[derive(Default)]
    struct FakeFetcher {
        same_bytes: bool,
        missing: Vec<String>,
        scripted: HashMap<String, Vec<u8>>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn distinct() -> Self {
            Self::default()
        }

        fn identical() -> Self {
            Self {
                same_bytes: true,
                ..Self::default()
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
            self.fetched.lock().unwrap().push(url.to_string());
            if self.missing.iter().any(|m| m == url) {
                return None;
            }
            if let Some(bytes) = self.scripted.get(url) {
                return Some(bytes.clone());
            }
            if self.same_bytes {
                Some(b"same frame".to_vec())
            } else {
                Some(url.as_bytes().to_vec())
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        locations: Mutex<Vec<String>>,
        saved: Mutex<Vec<(String, String, Vec<u8>)>>,
    }

    impl MemoryStore {
        fn saved_labels(&self) -> Vec<String> {
            self.saved
                .lock()
                .unwrap()
                .iter()
                .map(|(_, label, _)| label.clone())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl ArchiveStore for MemoryStore {
        async fn ensure_location(&self, camera_id: &str) -> anyhow::Result<()> {
            self.locations.lock().unwrap().push(camera_id.to_string());
            Ok(())
        }

        async fn persist(
            &self,
            camera_id: &str,
            label: &FrameLabel,
            bytes: &[u8],
        ) -> anyhow::Result<PathBuf> {
            self.saved
                .lock()
                .unwrap()
                .push((camera_id.to_string(), label.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(format!("{}/{}.jpg", camera_id, label)))
        }
    }

    async fn run_camera(
        api: &FakeApi,
        fetcher: &FakeFetcher,
        store: &MemoryStore,
        cam: &Camera,
        config: &MirrorConfig,
    ) -> CameraSummary {
        mirror_camera(api, fetcher, store, cam, config, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[test]
    fn test_date_range_inclusive_ascending() {
        let days: Vec<_> = date_range(ymd(2020, 12, 30), ymd(2021, 1, 2)).collect();
        assert_eq!(
            days,
            vec![
                ymd(2020, 12, 30),
                ymd(2020, 12, 31),
                ymd(2021, 1, 1),
                ymd(2021, 1, 2)
            ]
        );
    }

    #[test]
    fn test_date_range_crosses_leap_day() {
        let days: Vec<_> = date_range(ymd(2020, 2, 28), ymd(2020, 3, 1)).collect();
        assert_eq!(days, vec![ymd(2020, 2, 28), ymd(2020, 2, 29), ymd(2020, 3, 1)]);
    }

    #[test]
    fn test_date_range_single_day_and_empty() {
        assert_eq!(date_range(ymd(2021, 1, 1), ymd(2021, 1, 1)).count(), 1);
        assert_eq!(date_range(ymd(2021, 1, 5), ymd(2021, 1, 1)).count(), 0);
        assert_eq!(day_count(ymd(2021, 1, 5), ymd(2021, 1, 1)), 0);
        assert_eq!(day_count(ymd(2021, 1, 1), ymd(2021, 1, 3)), 3);
    }

    #[test]
    fn test_lower_bound() {
        let cam = camera("c", ymd(2021, 1, 10), ymd(2021, 2, 1));
        assert_eq!(lower_bound(&cam, None), ymd(2021, 1, 10));
        assert_eq!(lower_bound(&cam, Some(ymd(2021, 1, 20))), ymd(2021, 1, 20));
        // An explicit start before the first upload is honored as given.
        assert_eq!(lower_bound(&cam, Some(ymd(2020, 6, 1))), ymd(2020, 6, 1));
    }

    #[test]
    fn test_select_frames_representative() {
        let manifest = DayManifest {
            date: ymd(2021, 1, 1),
            times: vec!["0800".into(), "1200".into()],
            default_time: "1200".into(),
            save_path: "https://img/1200/full.jpg".into(),
        };
        let frames = select_frames(&manifest, FrameSelection::Representative);
        assert_eq!(
            frames,
            vec![Frame {
                label: FrameLabel::Day(ymd(2021, 1, 1)),
                url: "https://img/1200/full.jpg".into(),
            }]
        );
    }

    #[test]
    fn test_select_frames_all_times_substitutes_each_time() {
        let date = ymd(2021, 1, 1);
        let manifest = DayManifest {
            date,
            times: vec!["t1".into(), "t2".into(), "t3".into()],
            default_time: "t2".into(),
            save_path: "https://img/cam/t2/full.jpg".into(),
        };
        let frames = select_frames(&manifest, FrameSelection::AllTimes);
        let urls: Vec<_> = frames.iter().map(|f| f.url.as_str()).collect();
        let labels: Vec<_> = frames.iter().map(|f| f.label.to_string()).collect();
        assert_eq!(
            urls,
            vec![
                "https://img/cam/t1/full.jpg",
                "https://img/cam/t2/full.jpg",
                "https://img/cam/t3/full.jpg"
            ]
        );
        assert_eq!(labels, vec!["20210101-t1", "20210101-t2", "20210101-t3"]);
    }

    #[test]
    fn test_select_frames_all_times_empty_day() {
        let manifest = DayManifest {
            date: ymd(2021, 1, 1),
            times: Vec::new(),
            default_time: "0800".into(),
            save_path: "https://img/0800/full.jpg".into(),
        };
        assert!(select_frames(&manifest, FrameSelection::AllTimes).is_empty());
    }

    #[test]
    fn test_select_frames_template_without_time_fetches_default_once() {
        let manifest = DayManifest {
            date: ymd(2021, 1, 1),
            times: vec!["0800".into(), "1200".into()],
            default_time: "1200".into(),
            save_path: "https://img/latest.jpg".into(),
        };
        let frames = select_frames(&manifest, FrameSelection::AllTimes);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].url, "https://img/latest.jpg");
        assert_eq!(frames[0].label.to_string(), "20210101-1200");
    }

    #[tokio::test]
    async fn test_walk_visits_each_day_once_in_order() {
        let cam = camera("c1", ymd(2021, 1, 30), ymd(2021, 2, 2));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        let summary = run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, None),
        )
        .await;

        assert_eq!(
            api.requested_dates(),
            vec![ymd(2021, 1, 30), ymd(2021, 1, 31), ymd(2021, 2, 1), ymd(2021, 2, 2)]
        );
        assert_eq!(summary.days, 4);
        assert_eq!(summary.saved, 4);
    }

    #[tokio::test]
    async fn test_start_after_last_upload_fetches_nothing() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 3));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        let summary = run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, Some(ymd(2021, 1, 4))),
        )
        .await;

        assert!(api.requested_dates().is_empty());
        assert!(fetcher.fetched().is_empty());
        assert_eq!(summary, CameraSummary::default());
    }

    #[tokio::test]
    async fn test_explicit_start_overrides_first_upload() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 5));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, Some(ymd(2021, 1, 4))),
        )
        .await;

        assert_eq!(api.requested_dates(), vec![ymd(2021, 1, 4), ymd(2021, 1, 5)]);
    }

    #[tokio::test]
    async fn test_single_mode_distinct_frames_all_saved() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 3));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, None),
        )
        .await;

        assert_eq!(store.saved_labels(), vec!["20210101", "20210102", "20210103"]);
        assert_eq!(*store.locations.lock().unwrap(), vec!["c1".to_string()]);
    }

    #[tokio::test]
    async fn test_single_mode_identical_frames_only_first_saved() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 3));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let fetcher = FakeFetcher::identical();
        let store = MemoryStore::default();

        let summary = run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, None),
        )
        .await;

        assert_eq!(fetcher.fetched().len(), 3);
        assert_eq!(store.saved_labels(), vec!["20210101"]);
        assert_eq!(summary.saved, 1);
        assert_eq!(summary.duplicates, 2);
    }

    #[tokio::test]
    async fn test_dedup_compares_against_last_saved_only() {
        // A, A, B, A: the repeat of A after B is saved again.
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 4));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let url = |day: &str| format!("https://img.test/c1/{}/0800/full.jpg", day);
        let mut fetcher = FakeFetcher::distinct();
        fetcher.scripted.insert(url("20210101"), b"A".to_vec());
        fetcher.scripted.insert(url("20210102"), b"A".to_vec());
        fetcher.scripted.insert(url("20210103"), b"B".to_vec());
        fetcher.scripted.insert(url("20210104"), b"A".to_vec());
        let store = MemoryStore::default();

        run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, None),
        )
        .await;

        assert_eq!(store.saved_labels(), vec!["20210101", "20210103", "20210104"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_fingerprint_and_continues() {
        // A, <missing>, A: the third frame still dedups against the first.
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 3));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let url = |day: &str| format!("https://img.test/c1/{}/0800/full.jpg", day);
        let mut fetcher = FakeFetcher::distinct();
        fetcher.scripted.insert(url("20210101"), b"A".to_vec());
        fetcher.missing.push(url("20210102"));
        fetcher.scripted.insert(url("20210103"), b"A".to_vec());
        let store = MemoryStore::default();

        let summary = run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, None),
        )
        .await;

        assert_eq!(store.saved_labels(), vec!["20210101"]);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.days, 3);
    }

    #[tokio::test]
    async fn test_all_times_fetches_every_capture() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 1));
        let api = FakeApi::new(vec![cam.clone()], &["t1", "t2", "t3"], "t2");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::AllTimes, None),
        )
        .await;

        assert_eq!(
            fetcher.fetched(),
            vec![
                "https://img.test/c1/20210101/t1/full.jpg",
                "https://img.test/c1/20210101/t2/full.jpg",
                "https://img.test/c1/20210101/t3/full.jpg"
            ]
        );
        assert_eq!(
            store.saved_labels(),
            vec!["20210101-t1", "20210101-t2", "20210101-t3"]
        );
    }

    #[tokio::test]
    async fn test_fingerprint_carries_across_days_in_all_times() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 2));
        let api = FakeApi::new(vec![cam.clone()], &["0800", "1600"], "1600");
        let fetcher = FakeFetcher::identical();
        let store = MemoryStore::default();

        let summary = run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::AllTimes, None),
        )
        .await;

        assert_eq!(fetcher.fetched().len(), 4);
        assert_eq!(store.saved_labels(), vec!["20210101-0800"]);
        assert_eq!(summary.duplicates, 3);
    }

    #[tokio::test]
    async fn test_all_times_empty_day_fetches_nothing() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 2));
        let api = FakeApi::new(vec![cam.clone()], &[], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        let summary = run_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::AllTimes, None),
        )
        .await;

        assert_eq!(api.requested_dates().len(), 2);
        assert!(fetcher.fetched().is_empty());
        assert_eq!(summary.days, 2);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 2));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();
        let mut cfg = config(FrameSelection::Representative, None);
        cfg.dry_run = true;

        let summary = run_camera(&api, &fetcher, &store, &cam, &cfg).await;

        assert_eq!(summary.saved, 2);
        assert!(store.saved_labels().is_empty());
        assert!(store.locations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manifest_error_aborts_walk() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 5));
        let mut api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        api.fail_on = Some(ymd(2021, 1, 3));
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        let result = mirror_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, None),
            &CancellationToken::new(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(store.saved_labels(), vec!["20210101", "20210102"]);
    }

    #[tokio::test]
    async fn test_cancelled_walk_stops_before_first_day() {
        let cam = camera("c1", ymd(2021, 1, 1), ymd(2021, 1, 5));
        let api = FakeApi::new(vec![cam.clone()], &["0800"], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();
        let token = CancellationToken::new();
        token.cancel();

        let summary = mirror_camera(
            &api,
            &fetcher,
            &store,
            &cam,
            &config(FrameSelection::Representative, None),
            &token,
        )
        .await
        .unwrap();

        assert!(summary.interrupted);
        assert!(api.requested_dates().is_empty());
    }

    #[tokio::test]
    async fn test_each_camera_starts_with_fresh_fingerprint() {
        let cams = vec![
            camera("north", ymd(2021, 1, 1), ymd(2021, 1, 2)),
            camera("south", ymd(2021, 1, 1), ymd(2021, 1, 2)),
        ];
        let api = FakeApi::new(cams, &["0800"], "0800");
        let fetcher = FakeFetcher::identical();
        let store = MemoryStore::default();

        let summary = mirror_open_link(
            &api,
            &fetcher,
            &store,
            &config(FrameSelection::Representative, None),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let saved: Vec<_> = store
            .saved
            .lock()
            .unwrap()
            .iter()
            .map(|(cam, label, _)| format!("{}/{}", cam, label))
            .collect();
        assert_eq!(saved, vec!["north/20210101", "south/20210101"]);
        assert_eq!(summary.cameras, 2);
        assert_eq!(summary.totals.saved, 2);
        assert_eq!(summary.totals.duplicates, 2);
    }

    #[tokio::test]
    async fn test_enumerator_walks_cameras_in_listed_order() {
        let cams = vec![
            camera("b", ymd(2021, 1, 1), ymd(2021, 1, 1)),
            camera("a", ymd(2021, 1, 1), ymd(2021, 1, 1)),
        ];
        let api = FakeApi::new(cams, &["0800"], "0800");
        let fetcher = FakeFetcher::distinct();
        let store = MemoryStore::default();

        mirror_open_link(
            &api,
            &fetcher,
            &store,
            &config(FrameSelection::Representative, None),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        let order: Vec<_> = api
            .requested
            .lock()
            .unwrap()
            .iter()
            .map(|(cam, _)| cam.clone())
            .collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(754)), "12m 34s");
        assert_eq!(format_duration(Duration::from_secs(5025)), "1h 23m 45s");
    }

    #[test]
    fn test_create_progress_bar_hidden_when_disabled() {
        assert!(create_progress_bar(true, 10).is_hidden());
    }

    #[test]
    fn test_summary_absorb() {
        let mut total = CameraSummary::default();
        total.absorb(&CameraSummary {
            days: 3,
            saved: 2,
            duplicates: 1,
            failed: 0,
            interrupted: false,
        });
        total.absorb(&CameraSummary {
            days: 1,
            saved: 0,
            duplicates: 0,
            failed: 1,
            interrupted: true,
        });
        assert_eq!(total.days, 4);
        assert_eq!(total.saved, 2);
        assert_eq!(total.failed, 1);
        assert!(total.interrupted);
    }
}
