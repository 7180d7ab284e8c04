use crate::analyze::{EmotionAnalysis, EmotionLabel};
use crate::chart::{ChartRenderer, RenderError};
use plotters::prelude::*;
use std::path::Path;

const PANEL_FONT: (&str, u32) = ("sans-serif", 18);
const TITLE_FONT: (&str, u32) = ("sans-serif", 28);

/// Four-panel PNG: emotion distribution, pitch and energy over time, and
/// the label timeline.
#[derive(Clone, Copy, Debug)]
pub struct PlottersChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PlottersChartRenderer {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 960,
        }
    }
}

fn backend_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn label_color(label: EmotionLabel) -> RGBColor {
    match label {
        EmotionLabel::Happy => RGBColor(240, 180, 40),
        EmotionLabel::Sad => RGBColor(70, 90, 180),
        EmotionLabel::Angry => RGBColor(200, 60, 50),
        EmotionLabel::Neutral => RGBColor(150, 150, 150),
        EmotionLabel::Excited => RGBColor(235, 120, 30),
        EmotionLabel::Calm => RGBColor(90, 170, 120),
    }
}

fn label_name(index: f64) -> String {
    let i = index.floor();
    if i >= 0.0 && (i as usize) < EmotionLabel::ALL.len() && index == i {
        EmotionLabel::ALL[i as usize].as_str().to_owned()
    } else {
        String::new()
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn render(&self, analysis: &EmotionAnalysis, path: &Path) -> Result<(), RenderError> {
        if analysis.windows.is_empty() {
            return Err(RenderError::Empty);
        }

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;
        let root = root
            .titled("Audio Emotion Analysis", TITLE_FONT)
            .map_err(backend_err)?;
        let panels = root.split_evenly((2, 2));

        self.draw_distribution(&panels[0], analysis)?;
        self.draw_series(
            &panels[1],
            analysis,
            "Pitch over time",
            "pitch (Hz)",
            |w| w.features.avg_pitch_hz,
        )?;
        self.draw_series(
            &panels[2],
            analysis,
            "Energy over time",
            "rms energy",
            |w| w.features.avg_energy,
        )?;
        self.draw_timeline(&panels[3], analysis)?;

        root.present().map_err(backend_err)?;
        tracing::info!(path = %path.display(), "emotion chart rendered");
        Ok(())
    }
}

type Panel<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

impl PlottersChartRenderer {
    fn draw_distribution(
        &self,
        area: &Panel<'_>,
        analysis: &EmotionAnalysis,
    ) -> Result<(), RenderError> {
        let counts: Vec<usize> = EmotionLabel::ALL
            .iter()
            .map(|label| {
                analysis
                    .windows
                    .iter()
                    .filter(|w| w.label == *label)
                    .count()
            })
            .collect();
        let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption("Emotion distribution", PANEL_FONT)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(0.0..EmotionLabel::ALL.len() as f64, 0.0..max_count * 1.1)
            .map_err(backend_err)?;
        chart
            .configure_mesh()
            .x_label_formatter(&|v: &f64| label_name(*v))
            .y_desc("windows")
            .draw()
            .map_err(backend_err)?;
        chart
            .draw_series(EmotionLabel::ALL.iter().enumerate().map(|(i, label)| {
                Rectangle::new(
                    [
                        (i as f64 + 0.15, 0.0),
                        (i as f64 + 0.85, counts[i] as f64),
                    ],
                    label_color(*label).filled(),
                )
            }))
            .map_err(backend_err)?;
        Ok(())
    }

    fn draw_series(
        &self,
        area: &Panel<'_>,
        analysis: &EmotionAnalysis,
        title: &str,
        y_desc: &str,
        value: impl Fn(&crate::analyze::EmotionWindow) -> f64,
    ) -> Result<(), RenderError> {
        let points: Vec<(f64, f64)> = analysis
            .windows
            .iter()
            .map(|w| ((w.start_seconds + w.end_seconds) / 2.0, value(w)))
            .collect();
        let y_max = points
            .iter()
            .map(|(_, y)| *y)
            .fold(0.0f64, f64::max)
            .max(f64::EPSILON);

        let mut chart = ChartBuilder::on(area)
            .caption(title, PANEL_FONT)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(0.0..analysis.duration_seconds.max(1.0), 0.0..y_max * 1.1)
            .map_err(backend_err)?;
        chart
            .configure_mesh()
            .x_desc("time (s)")
            .y_desc(y_desc)
            .draw()
            .map_err(backend_err)?;
        chart
            .draw_series(LineSeries::new(points, &RGBColor(60, 100, 180)))
            .map_err(backend_err)?;
        Ok(())
    }

    fn draw_timeline(
        &self,
        area: &Panel<'_>,
        analysis: &EmotionAnalysis,
    ) -> Result<(), RenderError> {
        let mut chart = ChartBuilder::on(area)
            .caption("Label timeline", PANEL_FONT)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(70)
            .build_cartesian_2d(
                0.0..analysis.duration_seconds.max(1.0),
                0.0..EmotionLabel::ALL.len() as f64,
            )
            .map_err(backend_err)?;
        chart
            .configure_mesh()
            .x_desc("time (s)")
            .y_label_formatter(&|v: &f64| label_name(*v))
            .draw()
            .map_err(backend_err)?;
        chart
            .draw_series(analysis.windows.iter().map(|w| {
                let band = EmotionLabel::ALL
                    .iter()
                    .position(|l| *l == w.label)
                    .unwrap_or(0) as f64;
                Rectangle::new(
                    [
                        (w.start_seconds, band + 0.1),
                        (w.end_seconds, band + 0.9),
                    ],
                    label_color(w.label).filled(),
                )
            }))
            .map_err(backend_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{EmotionWindow, WindowFeatures};

    fn empty_analysis() -> EmotionAnalysis {
        EmotionAnalysis {
            windows: Vec::new(),
            overall_mood: EmotionLabel::Neutral,
            confidence_score: 0.0,
            avg_pitch_hz: 0.0,
            avg_energy: 0.0,
            speaking_rate_wpm: 0.0,
            pause_frequency: 0.0,
            volume_variability: 0.0,
            pitch_variability: 0.0,
            duration_seconds: 0.0,
        }
    }

    #[test]
    fn empty_analysis_is_rejected() {
        let renderer = PlottersChartRenderer::default();
        let err = renderer
            .render(&empty_analysis(), Path::new("/tmp/never_written.png"))
            .expect_err("no windows");
        assert!(matches!(err, RenderError::Empty));
    }

    #[test]
    fn label_name_maps_band_indices() {
        assert_eq!(label_name(0.0), "happy");
        assert_eq!(label_name(5.0), "calm");
        assert_eq!(label_name(6.0), "");
        assert_eq!(label_name(1.5), "");
    }

    #[test]
    #[ignore]
    fn chart_render_smoke_ignored() {
        // Intentionally ignored: needs a system font for captions.
        // Kept to allow local manual verification.
        let mut analysis = empty_analysis();
        analysis.duration_seconds = 10.0;
        analysis.windows = vec![
            EmotionWindow {
                start_seconds: 0.0,
                end_seconds: 5.0,
                features: WindowFeatures {
                    avg_pitch_hz: 220.0,
                    avg_energy: 0.2,
                    zero_crossing_rate: 0.1,
                },
                label: EmotionLabel::Excited,
            },
            EmotionWindow {
                start_seconds: 5.0,
                end_seconds: 10.0,
                features: WindowFeatures {
                    avg_pitch_hz: 0.0,
                    avg_energy: 0.0,
                    zero_crossing_rate: 0.0,
                },
                label: EmotionLabel::Sad,
            },
        ];

        let path = std::env::temp_dir().join(format!(
            "yt_transcriber_chart_smoke_{}.png",
            std::process::id()
        ));
        PlottersChartRenderer::default()
            .render(&analysis, &path)
            .expect("render");
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }
}
