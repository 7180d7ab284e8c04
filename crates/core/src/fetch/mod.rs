mod ytdlp;

use crate::youtube::VideoReference;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use ytdlp::{YtDlpFetcher, YtDlpOptions};

/// A downloaded audio file owned by the current run. The orchestrator
/// deletes it during cleanup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub duration_seconds: f64,
    pub sample_rate: u32,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("video unavailable: {0}")]
    Unavailable(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("failed to launch yt-dlp: {0}")]
    Spawn(String),
    #[error("yt-dlp reported success but no audio file at {}", .0.display())]
    MissingOutput(PathBuf),
    #[error("downloaded audio unreadable: {0}")]
    BadAudio(String),
}

impl FetchError {
    /// Only network failures are worth another attempt; availability errors
    /// (private, removed, region-blocked, age-gated) never resolve on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

pub trait AudioFetcher: Send + Sync {
    fn fetch(&self, video: VideoReference) -> BoxFuture<'_, Result<AudioAsset, FetchError>>;
}
