mod null;
mod panels;

use crate::analyze::EmotionAnalysis;
use std::path::Path;

pub use null::NullChartRenderer;
pub use panels::PlottersChartRenderer;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("nothing to draw: analysis has no windows")]
    Empty,
    #[error("chart backend error: {0}")]
    Backend(String),
}

/// Renders an analysis to an image file. Kept behind a trait so the
/// pipeline and its tests never depend on a drawing backend.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, analysis: &EmotionAnalysis, path: &Path) -> Result<(), RenderError>;
}
