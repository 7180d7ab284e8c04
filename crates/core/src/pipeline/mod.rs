use crate::analyze::{AnalysisError, EmotionAnalyzer, EmotionReport, ReportError};
use crate::audio::{self, AudioError};
use crate::chart::{ChartRenderer, RenderError};
use crate::config::{AnalyzerConfig, LanguageHint, OutputLayout};
use crate::fetch::{AudioAsset, AudioFetcher, FetchError};
use crate::transcribe::{ModelSize, Transcriber, TranscriptionError};
use crate::youtube::{self, UrlError};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Pipeline stage the error belongs to, for log context.
    pub fn stage(&self) -> &'static str {
        match self {
            RunError::Url(_) => "validate",
            RunError::Fetch(_) => "fetch",
            RunError::Transcription(_) => "transcribe",
            RunError::Analysis(_) | RunError::Report(_) | RunError::Render(_)
            | RunError::Audio(_) => "analyze",
            RunError::Io(_) => "persist",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub model_size: ModelSize,
    pub language_hint: Option<LanguageHint>,
    pub layout: OutputLayout,
    pub analyzer: AnalyzerConfig,
    pub render_chart: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageTimings {
    pub fetch: Duration,
    pub transcribe: Duration,
    pub analyze: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct AnalysisArtifacts {
    pub report: EmotionReport,
    pub report_path: PathBuf,
    pub chart_path: Option<PathBuf>,
}

/// Everything a finished run reports back to the user.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub video_id: String,
    pub language: Option<String>,
    pub word_count: usize,
    pub char_count: usize,
    pub transcript_path: PathBuf,
    pub transcript_bytes: u64,
    pub analysis: Option<AnalysisArtifacts>,
    pub timings: StageTimings,
}

/// Sequential orchestration of one video: validate, fetch, transcribe,
/// optionally analyze. Each stage runs to completion before the next
/// starts; the temporary audio file is removed whether the run succeeds
/// or fails.
pub struct Pipeline<F, T, R> {
    pub fetch: F,
    pub transcribe: T,
    pub render: R,
    pub config: PipelineConfig,
}

impl<F, T, R> Pipeline<F, T, R>
where
    F: AudioFetcher,
    T: Transcriber,
    R: ChartRenderer,
{
    pub async fn run(&self, raw_url: &str, analyze: bool) -> Result<RunSummary, RunError> {
        let video = youtube::parse(raw_url)?;
        tracing::info!(video_id = video.id(), "starting run");

        let fetch_started = Instant::now();
        let asset = match self.fetch.fetch(video.clone()).await {
            Ok(asset) => asset,
            Err(e) => {
                let e = RunError::from(e);
                tracing::error!(video_id = video.id(), stage = e.stage(), error = %e, "run failed");
                return Err(e);
            }
        };
        let fetch_time = fetch_started.elapsed();

        let result = self.process(&video, &asset, analyze, fetch_time).await;
        cleanup_audio(&asset);

        if let Err(e) = &result {
            tracing::error!(video_id = video.id(), stage = e.stage(), error = %e, "run failed");
        }
        result
    }

    async fn process(
        &self,
        video: &youtube::VideoReference,
        asset: &AudioAsset,
        analyze: bool,
        fetch_time: Duration,
    ) -> Result<RunSummary, RunError> {
        let transcribe_started = Instant::now();
        let transcript = self
            .transcribe
            .transcribe(
                asset.clone(),
                self.config.model_size,
                self.config.language_hint.clone(),
            )
            .await?;
        let transcribe_time = transcribe_started.elapsed();

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let transcript_path = self
            .config
            .layout
            .transcripts_dir
            .join(format!("transcript_{}_{}.txt", video.id(), stamp));
        std::fs::write(&transcript_path, &transcript.text)?;
        let transcript_bytes = std::fs::metadata(&transcript_path).map(|m| m.len())?;
        tracing::info!(
            path = %transcript_path.display(),
            bytes = transcript_bytes,
            "transcript saved"
        );

        let mut analyze_time = None;
        let analysis = if analyze {
            let analyze_started = Instant::now();
            let artifacts = self
                .analyze_audio(asset, transcript.word_count(), &stamp.to_string())
                .await?;
            analyze_time = Some(analyze_started.elapsed());
            Some(artifacts)
        } else {
            None
        };

        Ok(RunSummary {
            video_id: video.id().to_owned(),
            language: transcript.language.clone(),
            word_count: transcript.word_count(),
            char_count: transcript.char_count(),
            transcript_path,
            transcript_bytes,
            analysis,
            timings: StageTimings {
                fetch: fetch_time,
                transcribe: transcribe_time,
                analyze: analyze_time,
            },
        })
    }

    async fn analyze_audio(
        &self,
        asset: &AudioAsset,
        word_count: usize,
        stamp: &str,
    ) -> Result<AnalysisArtifacts, RunError> {
        let pcm = audio::read_wav(&asset.path)?;
        let analyzer = EmotionAnalyzer::new(self.config.analyzer);
        let analysis = analyzer.analyze(&pcm.samples, pcm.sample_rate, word_count)?;
        let report = EmotionReport::from(&analysis);

        let report_path = self
            .config
            .layout
            .analysis_dir
            .join(format!("emotion_report_{stamp}.json"));
        report.write_json(&report_path)?;
        tracing::info!(path = %report_path.display(), "emotion report saved");

        let chart_path = if self.config.render_chart {
            let path = self
                .config
                .layout
                .analysis_dir
                .join(format!("emotion_analysis_{stamp}.png"));
            self.render.render(&analysis, &path)?;
            Some(path)
        } else {
            None
        };

        Ok(AnalysisArtifacts {
            report,
            report_path,
            chart_path,
        })
    }
}

/// Best-effort removal of the run's temporary audio file.
fn cleanup_audio(asset: &AudioAsset) {
    match std::fs::remove_file(&asset.path) {
        Ok(()) => tracing::info!(path = %asset.path.display(), "temporary audio cleaned"),
        Err(e) => {
            tracing::warn!(path = %asset.path.display(), error = %e, "could not clean audio file")
        }
    }
}
