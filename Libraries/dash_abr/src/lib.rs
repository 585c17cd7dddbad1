pub mod args;
pub mod context;
pub mod error;
pub mod manifest;
pub mod mpd;
pub mod player;
pub mod segment;
pub mod selector;

use context::Phase;

/// Events emitted by the player
#[derive(Debug, Clone)]
pub enum DashEvent {
    Lifecycle {
        phase: Phase,
        label: String,
    },
    Segment {
        representation_id: u64,
        bandwidth: u64,
        segment_number: u64,
        duration: f64,
        url: String,
        length: u64,
        download_time: f64,
    },
    DownloadError {
        url: String,
        reason: String,
    },
}

pub use context::{PlayerContext, PlayerOptions};
pub use error::{DashError, DashResult};
pub use manifest::Manifest;
pub use player::DashPlayer;
