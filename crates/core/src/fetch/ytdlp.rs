use crate::audio;
use crate::fetch::{AudioAsset, AudioFetcher, FetchError};
use crate::util::retry::{retry_with_backoff, RetryConfig};
use crate::youtube::VideoReference;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Substrings yt-dlp prints when the video itself is the problem. Anything
// else on a failed exit is treated as a transient network error.
const UNAVAILABLE_MARKERS: [&str; 5] = [
    "Video unavailable",
    "Private video",
    "This video is not available",
    "Sign in to confirm your age",
    "not available in your country",
];

#[derive(Clone, Debug)]
pub struct YtDlpOptions {
    pub binary: PathBuf,
    pub work_dir: PathBuf,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for YtDlpOptions {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            work_dir: std::env::temp_dir(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(3),
        }
    }
}

/// Drives the `yt-dlp` binary to extract a 16 kHz mono WAV from a video.
/// Output files are named `{video_id}_{unix_timestamp}.wav` so concurrent
/// invocations of the tool never collide.
#[derive(Clone, Debug)]
pub struct YtDlpFetcher {
    options: YtDlpOptions,
}

impl YtDlpFetcher {
    pub fn new(options: YtDlpOptions) -> Self {
        Self { options }
    }

    fn output_path(&self, video: &VideoReference) -> PathBuf {
        let unix_ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.options
            .work_dir
            .join(format!("{}_{}.wav", video.id(), unix_ts))
    }

    async fn download_once(
        &self,
        video: &VideoReference,
        output_path: &Path,
    ) -> Result<AudioAsset, FetchError> {
        tracing::info!(video_id = video.id(), "invoking yt-dlp");

        let result = tokio::process::Command::new(&self.options.binary)
            .args([
                "-x",
                "--audio-format",
                "wav",
                "--postprocessor-args",
                "ffmpeg:-ar 16000 -ac 1",
                "--no-playlist",
                "-o",
            ])
            .arg(output_path)
            .arg(video.url())
            .output()
            .await
            .map_err(|e| FetchError::Spawn(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(classify_failure(&stderr));
        }

        if !output_path.exists() {
            return Err(FetchError::MissingOutput(output_path.to_path_buf()));
        }

        let (duration_seconds, sample_rate) =
            audio::probe_wav(output_path).map_err(|e| FetchError::BadAudio(e.to_string()))?;

        let size = std::fs::metadata(output_path).map(|m| m.len()).unwrap_or(0);
        tracing::info!(
            video_id = video.id(),
            duration_seconds,
            size_mb = size as f64 / 1_048_576.0,
            "audio downloaded"
        );

        Ok(AudioAsset {
            path: output_path.to_path_buf(),
            duration_seconds,
            sample_rate,
        })
    }
}

impl AudioFetcher for YtDlpFetcher {
    fn fetch(&self, video: VideoReference) -> BoxFuture<'_, Result<AudioAsset, FetchError>> {
        let this = self.clone();
        async move {
            let output_path = this.output_path(&video);
            let retry = RetryConfig::new(this.options.max_attempts, this.options.retry_delay);

            retry_with_backoff(
                &retry,
                || this.download_once(&video, &output_path),
                FetchError::is_transient,
            )
            .await
        }
        .boxed()
    }
}

fn classify_failure(stderr: &str) -> FetchError {
    let line = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("yt-dlp exited with an error")
        .trim()
        .to_owned();

    if UNAVAILABLE_MARKERS.iter().any(|m| stderr.contains(m)) {
        FetchError::Unavailable(line)
    } else {
        FetchError::Network(line)
    }
}
