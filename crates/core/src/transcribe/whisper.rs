use crate::audio;
use crate::config::LanguageHint;
use crate::fetch::AudioAsset;
use crate::transcribe::{
    ModelSize, Transcriber, TranscriptResult, TranscriptSegment, TranscriptionError,
    WHISPER_SAMPLE_RATE,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Transcribes audio assets with whisper.cpp. Model weights are resolved as
/// `{model_dir}/ggml-{size}.bin`; loading and inference run on a blocking
/// task since a single pass can take minutes.
#[derive(Clone, Debug)]
pub struct WhisperTranscriber {
    model_dir: PathBuf,
}

impl WhisperTranscriber {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(
        &self,
        asset: AudioAsset,
        model_size: ModelSize,
        language_hint: Option<LanguageHint>,
    ) -> BoxFuture<'_, Result<TranscriptResult, TranscriptionError>> {
        let model_path = self.model_dir.join(model_size.model_file_name());
        async move {
            if !model_path.exists() {
                return Err(TranscriptionError::ModelNotFound(model_path));
            }

            tracing::info!(
                model = %model_size,
                audio = %asset.path.display(),
                "starting transcription"
            );

            let result = tokio::task::spawn_blocking(move || {
                run_whisper(&model_path, &asset, language_hint)
            })
            .await
            .map_err(|e| TranscriptionError::InferenceFailed(e.to_string()))??;

            tracing::info!(
                segments = result.segments.len(),
                words = result.word_count(),
                language = result.language.as_deref().unwrap_or("unknown"),
                "transcription completed"
            );
            Ok(result)
        }
        .boxed()
    }
}

fn run_whisper(
    model_path: &std::path::Path,
    asset: &AudioAsset,
    language_hint: Option<LanguageHint>,
) -> Result<TranscriptResult, TranscriptionError> {
    let pcm = audio::read_wav(&asset.path)
        .map_err(|e| TranscriptionError::AudioUnreadable(e.to_string()))?;
    let samples = if pcm.sample_rate == WHISPER_SAMPLE_RATE {
        pcm.samples
    } else {
        audio::resample_linear(&pcm.samples, pcm.sample_rate, WHISPER_SAMPLE_RATE)
    };

    let model_path_str = model_path
        .to_str()
        .ok_or_else(|| TranscriptionError::ModelLoadFailed("non-utf8 model path".to_owned()))?;
    let ctx = WhisperContext::new_with_params(model_path_str, WhisperContextParameters::default())
        .map_err(|e| TranscriptionError::ModelLoadFailed(e.to_string()))?;

    let language = language_hint
        .as_ref()
        .map(|h| h.as_str().to_owned())
        .unwrap_or_else(|| "auto".to_owned());

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_language(Some(&language));
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_token_timestamps(false);

    let mut state = ctx
        .create_state()
        .map_err(|e| TranscriptionError::ModelLoadFailed(e.to_string()))?;
    state
        .full(params, &samples)
        .map_err(|e| TranscriptionError::InferenceFailed(e.to_string()))?;

    let num_segments = state
        .full_n_segments()
        .map_err(|e| TranscriptionError::InferenceFailed(e.to_string()))?;

    let mut segments = Vec::new();
    let mut text = String::new();
    for i in 0..num_segments {
        let raw = state
            .full_get_segment_text(i)
            .map_err(|e| TranscriptionError::InferenceFailed(e.to_string()))?;
        let start = state
            .full_get_segment_t0(i)
            .map_err(|e| TranscriptionError::InferenceFailed(e.to_string()))?
            as f64
            / 100.0;
        let end = state
            .full_get_segment_t1(i)
            .map_err(|e| TranscriptionError::InferenceFailed(e.to_string()))?
            as f64
            / 100.0;

        let clean = clean_whisper_text(&raw);
        if clean.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&clean);
        segments.push(TranscriptSegment {
            start_seconds: start,
            end_seconds: end,
            text: clean,
        });
    }

    let detected = if language == "auto" {
        state
            .full_lang_id()
            .ok()
            .and_then(whisper_rs::get_lang_str)
            .map(str::to_owned)
    } else {
        Some(language)
    };

    Ok(TranscriptResult {
        text,
        language: detected,
        segments,
    })
}

/// Strips `<|...|>` special tokens whisper emits around transcribed text.
fn clean_whisper_text(text: &str) -> String {
    let re = regex::Regex::new(r"<\|[^|]+\|>").unwrap();
    re.replace_all(text, "").trim().to_string()
}
