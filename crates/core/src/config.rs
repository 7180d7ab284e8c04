use crate::transcribe::ModelSize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_ROOT: &str = "outputs";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_MODEL_DIR: &str = "models";
pub const ENV_YT_DLP_PATH: &str = "YT_DLP_PATH";
pub const ENV_WHISPER_MODEL_DIR: &str = "WHISPER_MODEL_DIR";

pub const DEFAULT_WINDOW_SECONDS: f64 = 5.0;
pub const DEFAULT_MIN_WINDOW_SECONDS: f64 = 1.0;

// Emotion rule thresholds, calibrated once against spoken-voice recordings.
// Pitch bands are in Hz over the autocorrelation estimate; energy values are
// RMS over normalized [-1, 1] samples.
pub const PITCH_LOW_HZ: f64 = 100.0;
pub const PITCH_MEDIUM_HZ: f64 = 150.0;
pub const PITCH_HIGH_HZ: f64 = 200.0;
pub const ENERGY_LOW: f64 = 0.04;
pub const ENERGY_MEDIUM: f64 = 0.07;
pub const ENERGY_HIGH: f64 = 0.10;
pub const SILENCE_ENERGY: f64 = 0.01;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageHint(String);

impl LanguageHint {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyLanguageHint);
        }
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Directories a run reads from and writes to. Creation happens once per
/// process in [`OutputLayout::ensure`]; everything downstream assumes the
/// directories exist.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputLayout {
    pub transcripts_dir: PathBuf,
    pub analysis_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub work_dir: PathBuf,
}

impl OutputLayout {
    pub fn rooted(output_root: &Path, logs_dir: &Path, work_dir: &Path) -> Self {
        Self {
            transcripts_dir: output_root.join("transcripts"),
            analysis_dir: output_root.join("analysis"),
            logs_dir: logs_dir.to_path_buf(),
            work_dir: work_dir.to_path_buf(),
        }
    }

    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in [
            &self.transcripts_dir,
            &self.analysis_dir,
            &self.logs_dir,
            &self.work_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::rooted(
            Path::new(DEFAULT_OUTPUT_ROOT),
            Path::new(DEFAULT_LOG_DIR),
            &std::env::temp_dir(),
        )
    }
}

/// Tunable knobs of the emotion analyzer. The defaults are the calibrated
/// constants above; they are plain fields so callers can adjust them without
/// a rebuild.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalyzerConfig {
    pub window_seconds: f64,
    pub min_window_seconds: f64,
    pub pitch_low_hz: f64,
    pub pitch_medium_hz: f64,
    pub pitch_high_hz: f64,
    pub energy_low: f64,
    pub energy_medium: f64,
    pub energy_high: f64,
    pub silence_energy: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            min_window_seconds: DEFAULT_MIN_WINDOW_SECONDS,
            pitch_low_hz: PITCH_LOW_HZ,
            pitch_medium_hz: PITCH_MEDIUM_HZ,
            pitch_high_hz: PITCH_HIGH_HZ,
            energy_low: ENERGY_LOW,
            energy_medium: ENERGY_MEDIUM,
            energy_high: ENERGY_HIGH,
            silence_energy: SILENCE_ENERGY,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub url: String,
    pub model_size: ModelSize,
    pub language_hint: Option<LanguageHint>,
    pub analyze: bool,
    pub render_chart: bool,
    pub layout: OutputLayout,
    pub analyzer: AnalyzerConfig,
    pub yt_dlp_path: PathBuf,
    pub model_dir: PathBuf,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("language hint must not be empty")]
    EmptyLanguageHint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_hint_rejects_empty() {
        assert_eq!(
            LanguageHint::new("  "),
            Err(ConfigError::EmptyLanguageHint)
        );
        let hint = LanguageHint::new("en").expect("valid hint");
        assert_eq!(hint.as_str(), "en");
    }

    #[test]
    fn layout_rooted_nests_transcripts_and_analysis() {
        let layout = OutputLayout::rooted(
            Path::new("outputs"),
            Path::new("logs"),
            Path::new("/tmp"),
        );
        assert_eq!(layout.transcripts_dir, PathBuf::from("outputs/transcripts"));
        assert_eq!(layout.analysis_dir, PathBuf::from("outputs/analysis"));
        assert_eq!(layout.logs_dir, PathBuf::from("logs"));
    }

    #[test]
    fn analyzer_thresholds_are_ordered() {
        let c = AnalyzerConfig::default();
        assert!(c.pitch_low_hz < c.pitch_medium_hz);
        assert!(c.pitch_medium_hz < c.pitch_high_hz);
        assert!(c.energy_low < c.energy_medium);
        assert!(c.energy_medium < c.energy_high);
        assert!(c.silence_energy < c.energy_low);
        assert!(c.min_window_seconds < c.window_seconds);
    }
}
