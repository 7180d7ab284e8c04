mod analyzer;
mod features;
mod report;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use analyzer::EmotionAnalyzer;
pub use features::{pitch_autocorrelation, rms_energy, zero_crossing_rate};
pub use report::{EmotionReport, ReportError};

/// The fixed label set windows are bucketed into.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Neutral,
    Excited,
    Calm,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 6] = [
        EmotionLabel::Happy,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Neutral,
        EmotionLabel::Excited,
        EmotionLabel::Calm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "happy",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Angry => "angry",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Excited => "excited",
            EmotionLabel::Calm => "calm",
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acoustic features of one window. A silent or unvoiced window carries
/// pitch 0 and flows through the same classification rules as any other.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct WindowFeatures {
    pub avg_pitch_hz: f64,
    pub avg_energy: f64,
    pub zero_crossing_rate: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmotionWindow {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub features: WindowFeatures,
    pub label: EmotionLabel,
}

/// Full analysis of one audio asset: the window timeline plus aggregates.
/// `windows` covers `[0, duration_seconds)` with no gaps or overlaps.
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionAnalysis {
    pub windows: Vec<EmotionWindow>,
    pub overall_mood: EmotionLabel,
    pub confidence_score: f64,
    pub avg_pitch_hz: f64,
    pub avg_energy: f64,
    pub speaking_rate_wpm: f64,
    pub pause_frequency: f64,
    pub volume_variability: f64,
    pub pitch_variability: f64,
    pub duration_seconds: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(
        "audio too short for analysis: {duration_seconds:.2}s is less than one {window_seconds:.0}s window"
    )]
    InsufficientAudio {
        duration_seconds: f64,
        window_seconds: f64,
    },
    #[error("sample rate must be positive")]
    ZeroSampleRate,
}
