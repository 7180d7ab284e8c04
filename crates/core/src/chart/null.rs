use crate::analyze::EmotionAnalysis;
use crate::chart::{ChartRenderer, RenderError};
use std::path::Path;

/// Renderer that draws nothing. Used when charts are disabled and by
/// pipeline tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullChartRenderer;

impl ChartRenderer for NullChartRenderer {
    fn render(&self, _analysis: &EmotionAnalysis, path: &Path) -> Result<(), RenderError> {
        tracing::debug!(path = %path.display(), "chart rendering disabled, skipping");
        Ok(())
    }
}
