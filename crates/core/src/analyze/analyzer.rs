use crate::analyze::features::{pitch_autocorrelation, rms_energy, zero_crossing_rate};
use crate::analyze::{AnalysisError, EmotionAnalysis, EmotionLabel, EmotionWindow, WindowFeatures};
use crate::config::AnalyzerConfig;

/// Deterministic rule-table emotion classifier over fixed-width windows.
/// No trained model anywhere: features go through an ordered list of
/// threshold predicates, first match wins.
#[derive(Clone, Debug, Default)]
pub struct EmotionAnalyzer {
    config: AnalyzerConfig,
}

impl EmotionAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyzes normalized mono samples. `transcript_words` feeds the
    /// speaking-rate aggregate and may be 0 when no transcript exists.
    pub fn analyze(
        &self,
        samples: &[f32],
        sample_rate: u32,
        transcript_words: usize,
    ) -> Result<EmotionAnalysis, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::ZeroSampleRate);
        }
        let duration_seconds = samples.len() as f64 / f64::from(sample_rate);
        let bounds = self.partition(samples.len(), sample_rate, duration_seconds)?;

        let windows: Vec<EmotionWindow> = bounds
            .into_iter()
            .map(|(start, end)| {
                let slice = &samples[start..end];
                let features = WindowFeatures {
                    avg_pitch_hz: pitch_autocorrelation(slice, sample_rate),
                    avg_energy: rms_energy(slice),
                    zero_crossing_rate: zero_crossing_rate(slice),
                };
                EmotionWindow {
                    start_seconds: start as f64 / f64::from(sample_rate),
                    end_seconds: end as f64 / f64::from(sample_rate),
                    features,
                    label: self.classify(&features),
                }
            })
            .collect();

        let (overall_mood, plurality) = plurality_label(&windows);
        let confidence_score = plurality as f64 / windows.len() as f64;

        let pitches: Vec<f64> = windows.iter().map(|w| w.features.avg_pitch_hz).collect();
        let energies: Vec<f64> = windows.iter().map(|w| w.features.avg_energy).collect();
        let pauses = energies
            .iter()
            .filter(|&&e| e < self.config.silence_energy)
            .count();

        let minutes = duration_seconds / 60.0;
        let speaking_rate_wpm = if minutes > 0.0 {
            transcript_words as f64 / minutes
        } else {
            0.0
        };

        Ok(EmotionAnalysis {
            overall_mood,
            confidence_score,
            avg_pitch_hz: mean(&pitches),
            avg_energy: mean(&energies),
            speaking_rate_wpm,
            pause_frequency: pauses as f64 / windows.len() as f64,
            volume_variability: std_dev(&energies),
            pitch_variability: std_dev(&pitches),
            duration_seconds,
            windows,
        })
    }

    /// Splits `[0, total)` into consecutive window bounds in samples. The
    /// last window may be short; below the floor it is folded into the
    /// previous one.
    fn partition(
        &self,
        total: usize,
        sample_rate: u32,
        duration_seconds: f64,
    ) -> Result<Vec<(usize, usize)>, AnalysisError> {
        let window_len = (self.config.window_seconds * f64::from(sample_rate)) as usize;
        let min_len = (self.config.min_window_seconds * f64::from(sample_rate)) as usize;
        if window_len == 0 || total < window_len {
            return Err(AnalysisError::InsufficientAudio {
                duration_seconds,
                window_seconds: self.config.window_seconds,
            });
        }

        let mut bounds = Vec::new();
        let mut start = 0usize;
        while start < total {
            let end = (start + window_len).min(total);
            bounds.push((start, end));
            start = end;
        }

        if bounds.len() > 1 {
            let (last_start, last_end) = bounds[bounds.len() - 1];
            if last_end - last_start < min_len {
                bounds.pop();
                let idx = bounds.len() - 1;
                bounds[idx].1 = last_end;
            }
        }

        Ok(bounds)
    }

    /// The ordered rule table. Order is significant: a window that clears
    /// both the `excited` and `happy` thresholds is `excited`.
    fn classify(&self, f: &WindowFeatures) -> EmotionLabel {
        let c = &self.config;
        let rules = [
            (
                f.avg_energy > c.energy_high && f.avg_pitch_hz > c.pitch_high_hz,
                EmotionLabel::Excited,
            ),
            (
                f.avg_pitch_hz > c.pitch_medium_hz && f.avg_energy > c.energy_medium,
                EmotionLabel::Happy,
            ),
            (
                f.avg_energy > c.energy_high && f.avg_pitch_hz < c.pitch_low_hz,
                EmotionLabel::Angry,
            ),
            (
                f.avg_pitch_hz < c.pitch_low_hz && f.avg_energy < c.energy_low,
                EmotionLabel::Sad,
            ),
            (
                f.avg_energy < c.energy_low
                    && (c.pitch_low_hz..=c.pitch_high_hz).contains(&f.avg_pitch_hz),
                EmotionLabel::Calm,
            ),
        ];

        rules
            .iter()
            .find(|(hit, _)| *hit)
            .map(|(_, label)| *label)
            .unwrap_or(EmotionLabel::Neutral)
    }
}

/// Most frequent label and its count; ties go to the label occurring
/// earliest in the window sequence.
fn plurality_label(windows: &[EmotionWindow]) -> (EmotionLabel, usize) {
    let mut counts: Vec<(EmotionLabel, usize)> = Vec::new();
    for w in windows {
        match counts.iter_mut().find(|(label, _)| *label == w.label) {
            Some((_, count)) => *count += 1,
            None => counts.push((w.label, 1)),
        }
    }

    let mut best = counts[0];
    for &(label, count) in &counts[1..] {
        if count > best.1 {
            best = (label, count);
        }
    }
    best
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, matching the reference statistics.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 16_000;

    fn analyzer() -> EmotionAnalyzer {
        EmotionAnalyzer::new(AnalyzerConfig::default())
    }

    fn features(pitch: f64, energy: f64) -> WindowFeatures {
        WindowFeatures {
            avg_pitch_hz: pitch,
            avg_energy: energy,
            zero_crossing_rate: 0.1,
        }
    }

    fn sine(freq_hz: f64, amplitude: f32, seconds: f64) -> Vec<f32> {
        let n = (seconds * f64::from(SR)) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(SR);
                amplitude * (2.0 * std::f64::consts::PI * freq_hz * t).sin() as f32
            })
            .collect()
    }

    #[test]
    fn windows_cover_duration_without_gaps() {
        let a = analyzer();
        let samples = sine(220.0, 0.3, 12.0);
        let analysis = a.analyze(&samples, SR, 24).expect("analyzable");

        assert_eq!(analysis.windows.len(), 3);
        assert_eq!(analysis.windows[0].start_seconds, 0.0);
        assert_eq!(analysis.windows[0].end_seconds, 5.0);
        assert_eq!(analysis.windows[1].start_seconds, 5.0);
        assert_eq!(analysis.windows[1].end_seconds, 10.0);
        assert_eq!(analysis.windows[2].start_seconds, 10.0);
        assert!((analysis.windows[2].end_seconds - 12.0).abs() < 1e-9);

        for pair in analysis.windows.windows(2) {
            assert_eq!(pair[0].end_seconds, pair[1].start_seconds);
        }
    }

    #[test]
    fn evenly_dividing_duration_has_no_short_tail() {
        let a = analyzer();
        let samples = sine(220.0, 0.3, 15.0);
        let analysis = a.analyze(&samples, SR, 0).expect("analyzable");
        assert_eq!(analysis.windows.len(), 3);
        assert!((analysis.windows[2].end_seconds - 15.0).abs() < 1e-9);
    }

    #[test]
    fn short_tail_is_folded_into_previous_window() {
        let a = analyzer();
        // 10.5 s: the 0.5 s tail is under the 1 s floor and merges backward.
        let samples = sine(220.0, 0.3, 10.5);
        let analysis = a.analyze(&samples, SR, 0).expect("analyzable");
        assert_eq!(analysis.windows.len(), 2);
        assert!((analysis.windows[1].end_seconds - 10.5).abs() < 1e-9);
    }

    #[test]
    fn audio_shorter_than_one_window_is_rejected() {
        let a = analyzer();
        let samples = sine(220.0, 0.3, 3.0);
        let err = a.analyze(&samples, SR, 0).expect_err("too short");
        assert!(matches!(err, AnalysisError::InsufficientAudio { .. }));
    }

    #[test]
    fn rule_order_prefers_excited_over_happy() {
        let a = analyzer();
        // Clears both the excited and the happy thresholds.
        let label = a.classify(&features(250.0, 0.2));
        assert_eq!(label, EmotionLabel::Excited);
    }

    #[test]
    fn rule_table_maps_each_band() {
        let a = analyzer();
        assert_eq!(a.classify(&features(180.0, 0.08)), EmotionLabel::Happy);
        assert_eq!(a.classify(&features(80.0, 0.2)), EmotionLabel::Angry);
        assert_eq!(a.classify(&features(80.0, 0.02)), EmotionLabel::Sad);
        assert_eq!(a.classify(&features(150.0, 0.02)), EmotionLabel::Calm);
        assert_eq!(a.classify(&features(130.0, 0.06)), EmotionLabel::Neutral);
    }

    #[test]
    fn silent_window_is_never_excited_or_angry() {
        let a = analyzer();
        let label = a.classify(&features(0.0, 0.0));
        assert!(matches!(label, EmotionLabel::Sad | EmotionLabel::Calm));
    }

    #[test]
    fn silence_yields_full_pause_frequency() {
        let a = analyzer();
        let samples = vec![0.0f32; (10.0 * f64::from(SR)) as usize];
        let analysis = a.analyze(&samples, SR, 0).expect("analyzable");
        assert_eq!(analysis.pause_frequency, 1.0);
        assert_eq!(analysis.overall_mood, EmotionLabel::Sad);
    }

    #[test]
    fn plurality_wins_and_ties_break_earliest() {
        let mk = |label| EmotionWindow {
            start_seconds: 0.0,
            end_seconds: 5.0,
            features: features(0.0, 0.0),
            label,
        };

        let (mood, count) = plurality_label(&[
            mk(EmotionLabel::Happy),
            mk(EmotionLabel::Happy),
            mk(EmotionLabel::Sad),
        ]);
        assert_eq!(mood, EmotionLabel::Happy);
        assert_eq!(count, 2);

        // 2-2 tie: the earliest-occurring label wins.
        let (mood, _) = plurality_label(&[
            mk(EmotionLabel::Calm),
            mk(EmotionLabel::Sad),
            mk(EmotionLabel::Sad),
            mk(EmotionLabel::Calm),
        ]);
        assert_eq!(mood, EmotionLabel::Calm);
    }

    #[test]
    fn confidence_is_plurality_share() {
        let a = analyzer();
        let samples = sine(220.0, 0.3, 12.0);
        let analysis = a.analyze(&samples, SR, 0).expect("analyzable");
        // A constant tone classifies every window identically.
        assert_eq!(analysis.confidence_score, 1.0);
        assert!((0.0..=1.0).contains(&analysis.confidence_score));
    }

    #[test]
    fn single_window_has_full_confidence() {
        let a = analyzer();
        let samples = sine(220.0, 0.3, 5.0);
        let analysis = a.analyze(&samples, SR, 0).expect("analyzable");
        assert_eq!(analysis.windows.len(), 1);
        assert_eq!(analysis.confidence_score, 1.0);
    }

    #[test]
    fn speaking_rate_is_words_per_minute() {
        let a = analyzer();
        let samples = sine(220.0, 0.3, 30.0);
        let analysis = a.analyze(&samples, SR, 75).expect("analyzable");
        assert!((analysis.speaking_rate_wpm - 150.0).abs() < 1e-9);
    }

    #[test]
    fn loud_high_tone_is_excited_throughout() {
        let a = analyzer();
        let samples = sine(220.0, 0.3, 10.0);
        let analysis = a.analyze(&samples, SR, 0).expect("analyzable");
        assert_eq!(analysis.overall_mood, EmotionLabel::Excited);
        for w in &analysis.windows {
            assert_eq!(w.label, EmotionLabel::Excited);
        }
    }

    #[test]
    fn std_dev_of_constant_series_is_zero() {
        assert_eq!(std_dev(&[0.5, 0.5, 0.5]), 0.0);
        let sd = std_dev(&[1.0, 2.0, 3.0, 4.0]);
        assert!((sd - 1.118033988749895).abs() < 1e-12);
    }
}
