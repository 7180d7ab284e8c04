use crate::analyze::{EmotionAnalysis, EmotionLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// The persisted JSON shape of an analysis. Field layout is the report
/// contract; renaming anything here breaks downstream consumers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmotionReport {
    pub overall_mood: EmotionLabel,
    pub confidence_score: f64,
    pub tone_analysis: ToneAnalysis,
    pub speech_patterns: SpeechPatterns,
    pub emotion_distribution: BTreeMap<EmotionLabel, DistributionEntry>,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToneAnalysis {
    pub avg_pitch_hz: f64,
    pub avg_energy: f64,
    pub speaking_rate_wpm: f64,
    pub pause_frequency: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpeechPatterns {
    pub duration_seconds: f64,
    pub volume_variability: f64,
    pub pitch_variability: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DistributionEntry {
    pub percentage: f64,
    pub segment_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub label: EmotionLabel,
}

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl EmotionReport {
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl From<&EmotionAnalysis> for EmotionReport {
    fn from(analysis: &EmotionAnalysis) -> Self {
        let total = analysis.windows.len();
        let mut emotion_distribution = BTreeMap::new();
        for label in EmotionLabel::ALL {
            let count = analysis.windows.iter().filter(|w| w.label == label).count();
            if count == 0 {
                continue;
            }
            emotion_distribution.insert(
                label,
                DistributionEntry {
                    percentage: count as f64 / total as f64 * 100.0,
                    segment_count: count,
                },
            );
        }

        Self {
            overall_mood: analysis.overall_mood,
            confidence_score: analysis.confidence_score,
            tone_analysis: ToneAnalysis {
                avg_pitch_hz: analysis.avg_pitch_hz,
                avg_energy: analysis.avg_energy,
                speaking_rate_wpm: analysis.speaking_rate_wpm,
                pause_frequency: analysis.pause_frequency,
            },
            speech_patterns: SpeechPatterns {
                duration_seconds: analysis.duration_seconds,
                volume_variability: analysis.volume_variability,
                pitch_variability: analysis.pitch_variability,
            },
            emotion_distribution,
            timeline: analysis
                .windows
                .iter()
                .map(|w| TimelineEntry {
                    start_seconds: w.start_seconds,
                    end_seconds: w.end_seconds,
                    label: w.label,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{EmotionWindow, WindowFeatures};

    fn window(start: f64, label: EmotionLabel) -> EmotionWindow {
        EmotionWindow {
            start_seconds: start,
            end_seconds: start + 5.0,
            features: WindowFeatures {
                avg_pitch_hz: 180.0,
                avg_energy: 0.08,
                zero_crossing_rate: 0.1,
            },
            label,
        }
    }

    fn sample_analysis() -> EmotionAnalysis {
        EmotionAnalysis {
            windows: vec![
                window(0.0, EmotionLabel::Happy),
                window(5.0, EmotionLabel::Happy),
                window(10.0, EmotionLabel::Sad),
            ],
            overall_mood: EmotionLabel::Happy,
            confidence_score: 2.0 / 3.0,
            avg_pitch_hz: 180.0,
            avg_energy: 0.08,
            speaking_rate_wpm: 120.0,
            pause_frequency: 0.0,
            volume_variability: 0.01,
            pitch_variability: 12.0,
            duration_seconds: 15.0,
        }
    }

    #[test]
    fn distribution_sums_to_one_hundred_percent() {
        let report = EmotionReport::from(&sample_analysis());

        let happy = &report.emotion_distribution[&EmotionLabel::Happy];
        let sad = &report.emotion_distribution[&EmotionLabel::Sad];
        assert_eq!(happy.segment_count, 2);
        assert_eq!(sad.segment_count, 1);
        assert!((happy.percentage + sad.percentage - 100.0).abs() < 1e-9);
        assert!(!report
            .emotion_distribution
            .contains_key(&EmotionLabel::Angry));
    }

    #[test]
    fn json_round_trip_preserves_mood_confidence_and_timeline() {
        let report = EmotionReport::from(&sample_analysis());
        let json = serde_json::to_string(&report).expect("serialize");
        let parsed: EmotionReport = serde_json::from_str(&json).expect("parse");

        assert_eq!(parsed.overall_mood, EmotionLabel::Happy);
        assert!((parsed.confidence_score - report.confidence_score).abs() < 1e-12);
        assert_eq!(parsed.timeline.len(), 3);
        assert_eq!(parsed, report);
    }

    #[test]
    fn labels_serialize_lowercase() {
        let json = serde_json::to_string(&EmotionLabel::Excited).expect("serialize");
        assert_eq!(json, "\"excited\"");

        let report = EmotionReport::from(&sample_analysis());
        let json = serde_json::to_string(&report).expect("serialize");
        assert!(json.contains("\"overall_mood\":\"happy\""));
        assert!(json.contains("\"emotion_distribution\":{\"happy\""));
    }
}
