use crate::context::{Phase, PlayerContext, PlayerOptions};
use crate::error::{DashError, DashResult};
use crate::manifest::Manifest;
use crate::segment::fetcher::{BandwidthEstimator, HttpFetcher};
use crate::segment::{FetchItem, FetchStats};
use crate::DashEvent;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

pub type EventCallback = Arc<dyn Fn(DashEvent) + Send + Sync>;

/// Default collaborator: HTTP transport, EWMA bandwidth estimate, downloads written under a
/// timestamped run directory.
pub struct DashPlayer {
    options: PlayerOptions,
    fetcher: HttpFetcher,
    estimator: BandwidthEstimator,
    run_dir: PathBuf,
    callback: Option<EventCallback>,
    fetched: u64,
}

impl DashPlayer {
    pub fn new(options: PlayerOptions) -> Self {
        let run_dir = options
            .output_dir
            .join(Utc::now().format("%Y%m%d-%H%M%S").to_string());
        Self {
            estimator: BandwidthEstimator::new(options.estimator_alpha, options.initial_bandwidth),
            fetcher: HttpFetcher::new(),
            run_dir,
            options,
            callback: None,
            fetched: 0,
        }
    }

    pub fn with_callback(mut self, callback: EventCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn run_dir(&self) -> &PathBuf {
        &self.run_dir
    }

    pub fn estimated_bandwidth(&self) -> f64 {
        self.estimator.estimate()
    }

    fn emit(&self, event: DashEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    /// Plays `source` to the end: load, initialise, then fetch one candidate per round until
    /// the selected representation runs dry.
    pub fn run(&mut self, source: &str) -> DashResult<()> {
        let mut manifest = Manifest::open(self, source)?;
        info!(
            "Playing {} representations, min buffer {}s, max segment duration {}s",
            manifest.representations().len(),
            manifest.min_buffer_time(),
            manifest.max_segment_duration()
        );

        self.event(Phase::Start, "playback");
        let mut position: u64 = 0;
        loop {
            let bandwidth = self.estimator.estimate();
            let segment = match manifest.candidate(bandwidth) {
                Ok(segment) => segment,
                Err(DashError::Exhausted) => {
                    debug!("Representations exhausted after {} segments", position);
                    break;
                }
                Err(e) => return Err(e),
            };

            match self.fetch_item(FetchItem::Segment(&segment)) {
                Ok(stats) => {
                    self.update_bandwidth(stats.duration, stats.length);
                    self.emit(DashEvent::Segment {
                        representation_id: segment.representation_id,
                        bandwidth: segment.bandwidth,
                        segment_number: position,
                        duration: segment.duration,
                        url: segment.url.clone(),
                        length: stats.length,
                        download_time: stats.duration,
                    });
                }
                Err(e) => {
                    error!("Error downloading {}: {}", segment.url, e);
                    self.emit(DashEvent::DownloadError {
                        url: segment.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            position += 1;
        }
        self.event(Phase::Stop, "playback");

        manifest.stop(self);
        Ok(())
    }
}

impl PlayerContext for DashPlayer {
    fn event(&self, phase: Phase, label: &str) {
        match phase {
            Phase::Error => error!("{}: {}", phase, label),
            _ => info!("{}: {}", phase, label),
        }
        self.emit(DashEvent::Lifecycle {
            phase,
            label: label.to_string(),
        });
    }

    fn fetch_item(&mut self, item: FetchItem<'_>) -> DashResult<FetchStats> {
        let (data, duration) = self.fetcher.fetch(item.url(), item.range())?;

        let file_name = match item {
            FetchItem::Initialization(_) => {
                format!("init_{}_{}", item.representation_id(), item.file_name())
            }
            FetchItem::Segment(_) => {
                self.fetched += 1;
                format!("{:06}_{}_{}", self.fetched, item.representation_id(), item.file_name())
            }
        };
        let path = self.create_directory("downloads")?.join(file_name);
        std::fs::write(&path, &data)?;
        debug!("Fetched {} ({} bytes in {:.3}s)", item.url(), data.len(), duration);

        Ok(FetchStats {
            duration,
            length: data.len() as u64,
        })
    }

    fn update_bandwidth(&mut self, total_duration: f64, total_length: u64) {
        self.estimator.record(total_length, total_duration);
        debug!("Estimated bandwidth: {:.0} bps", self.estimator.estimate());
    }

    fn create_directory(&self, path: &str) -> DashResult<PathBuf> {
        let dir = self.run_dir.join(path.trim_matches('/'));
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn options(&self) -> &PlayerOptions {
        &self.options
    }
}
