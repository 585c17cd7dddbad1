use crate::error::DashResult;
use crate::segment::{FetchItem, FetchStats};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Stop,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Start => "start",
            Phase::Stop => "stop",
            Phase::Error => "error",
        };
        f.write_str(s)
    }
}

/// Capabilities the manifest core needs from whoever drives playback.
pub trait PlayerContext {
    /// Lifecycle and progress notifications.
    fn event(&self, phase: Phase, label: &str);

    /// Retrieves an initialization or media segment.
    fn fetch_item(&mut self, item: FetchItem<'_>) -> DashResult<FetchStats>;

    /// Reports aggregate download time (seconds) and size (bytes) for bandwidth estimation.
    fn update_bandwidth(&mut self, total_duration: f64, total_length: u64);

    /// Provisions a local directory and returns its path.
    fn create_directory(&self, path: &str) -> DashResult<PathBuf>;

    fn options(&self) -> &PlayerOptions;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    /// Validate the manifest against `schema_path` before parsing it.
    pub xml_validation: bool,
    pub schema_path: PathBuf,
    /// Root for downloaded manifests and segments.
    pub output_dir: PathBuf,
    /// Weight of the newest sample in the bandwidth EWMA.
    pub estimator_alpha: f64,
    /// Bandwidth assumed before any sample was recorded, in bits per second.
    pub initial_bandwidth: f64,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            xml_validation: false,
            schema_path: PathBuf::from("validation/DASH-MPD.xsd"),
            output_dir: PathBuf::from("output"),
            estimator_alpha: 0.25,
            initial_bandwidth: 50_000_000.0,
        }
    }
}

impl PlayerOptions {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> DashResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
