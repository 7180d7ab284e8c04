#[cfg(feature = "whisper-rs")]
mod whisper;

use crate::config::LanguageHint;
use crate::fetch::AudioAsset;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[cfg(feature = "whisper-rs")]
pub use whisper::WhisperTranscriber;

/// Sample rate whisper models expect.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Whisper model size, trading latency for accuracy.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl ModelSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSize::Tiny => "tiny",
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }

    /// File name of the ggml weights for this size.
    pub fn model_file_name(&self) -> String {
        format!("ggml-{}.bin", self.as_str())
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown model size {0:?} (expected tiny|base|small|medium|large)")]
pub struct ParseModelSizeError(String);

impl FromStr for ModelSize {
    type Err = ParseModelSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tiny" => Ok(ModelSize::Tiny),
            "base" => Ok(ModelSize::Base),
            "small" => Ok(ModelSize::Small),
            "medium" => Ok(ModelSize::Medium),
            "large" => Ok(ModelSize::Large),
            _ => Err(ParseModelSizeError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

/// The transcription output for one audio asset. Immutable once produced.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TranscriptResult {
    pub text: String,
    pub language: Option<String>,
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptResult {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TranscriptionError {
    #[error("model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),
    #[error("failed to load model: {0} (try a smaller --model-size)")]
    ModelLoadFailed(String),
    #[error("audio unreadable: {0}")]
    AudioUnreadable(String),
    #[error("transcription failed: {0}")]
    InferenceFailed(String),
}

pub trait Transcriber: Send + Sync {
    fn transcribe(
        &self,
        asset: AudioAsset,
        model_size: ModelSize,
        language_hint: Option<LanguageHint>,
    ) -> BoxFuture<'_, Result<TranscriptResult, TranscriptionError>>;
}
