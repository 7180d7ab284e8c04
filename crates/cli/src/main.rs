#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use yt_transcriber_core::config::{
    AnalyzerConfig, AppConfig, LanguageHint, OutputLayout, DEFAULT_LOG_DIR, DEFAULT_MODEL_DIR,
    DEFAULT_OUTPUT_ROOT, ENV_WHISPER_MODEL_DIR, ENV_YT_DLP_PATH,
};
#[cfg(feature = "whisper-rs")]
use yt_transcriber_core::pipeline::RunSummary;
use yt_transcriber_core::transcribe::ModelSize;
use yt_transcriber_core::youtube;

#[derive(Parser, Debug)]
#[command(name = "yt-transcriber")]
#[command(about = "YouTube audio transcription with acoustic emotion analysis")]
struct Args {
    /// Video URL; when omitted, the tool prompts interactively.
    #[arg(long)]
    url: Option<String>,

    #[arg(long, default_value = "base")]
    model_size: ModelSize,

    /// Language hint for the speech model (auto-detected when omitted).
    #[arg(long)]
    language: Option<String>,

    /// Run emotion analysis without the interactive prompt.
    #[arg(long)]
    analyze: bool,

    /// Skip rendering the chart image alongside the JSON report.
    #[arg(long)]
    no_chart: bool,

    #[arg(long, env = ENV_YT_DLP_PATH)]
    yt_dlp_path: Option<PathBuf>,

    #[arg(long, env = ENV_WHISPER_MODEL_DIR, default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,

    /// Directory for the temporary audio download (system temp by default).
    #[arg(long)]
    work_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
    output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let work_dir = args
        .work_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let layout = OutputLayout::rooted(&args.output_dir, &args.log_dir, &work_dir);
    layout
        .ensure()
        .context("cannot create output directories")?;

    let _log_guard = init_tracing(&layout, &args.log_level)?;

    let cfg = build_config(args, layout)?;
    tracing::info!(
        model_size = %cfg.model_size,
        analyze = cfg.analyze,
        "config loaded"
    );

    run(cfg).await
}

#[cfg(feature = "whisper-rs")]
async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    use yt_transcriber_core::chart::PlottersChartRenderer;
    use yt_transcriber_core::fetch::{YtDlpFetcher, YtDlpOptions};
    use yt_transcriber_core::pipeline::{Pipeline, PipelineConfig};
    use yt_transcriber_core::transcribe::WhisperTranscriber;

    let fetcher = YtDlpFetcher::new(YtDlpOptions {
        binary: cfg.yt_dlp_path.clone(),
        work_dir: cfg.layout.work_dir.clone(),
        ..YtDlpOptions::default()
    });
    let transcriber = WhisperTranscriber::new(cfg.model_dir.clone());
    let renderer = PlottersChartRenderer::default();

    let pipeline = Pipeline {
        fetch: fetcher,
        transcribe: transcriber,
        render: renderer,
        config: PipelineConfig {
            model_size: cfg.model_size,
            language_hint: cfg.language_hint.clone(),
            layout: cfg.layout.clone(),
            analyzer: cfg.analyzer,
            render_chart: cfg.render_chart,
        },
    };

    let summary = pipeline.run(&cfg.url, cfg.analyze).await?;
    print_summary(&summary);
    Ok(())
}

#[cfg(not(feature = "whisper-rs"))]
async fn run(_cfg: AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("built without speech recognition; rebuild with the whisper-rs feature")
}

fn build_config(args: Args, layout: OutputLayout) -> anyhow::Result<AppConfig> {
    let url = match args.url {
        Some(u) => u,
        None => match prompt_for_url()? {
            Some(u) => u,
            None => {
                println!("Exiting.");
                std::process::exit(0);
            }
        },
    };

    let analyze = if args.analyze {
        true
    } else {
        prompt_yes_no("Run emotion analysis? (y/n): ")?
    };

    let language_hint = args
        .language
        .map(LanguageHint::new)
        .transpose()
        .context("invalid --language")?;

    Ok(AppConfig {
        url,
        model_size: args.model_size,
        language_hint,
        analyze,
        render_chart: !args.no_chart,
        layout,
        analyzer: AnalyzerConfig::default(),
        yt_dlp_path: args.yt_dlp_path.unwrap_or_else(|| PathBuf::from("yt-dlp")),
        model_dir: args.model_dir,
    })
}

/// Prompts until a valid YouTube URL is entered. `None` means the user quit.
fn prompt_for_url() -> anyhow::Result<Option<String>> {
    loop {
        let line = prompt_line("Enter a YouTube URL ('q' to quit): ")?;
        let input = line.trim();

        if matches!(input.to_ascii_lowercase().as_str(), "q" | "quit" | "exit") {
            return Ok(None);
        }
        if input.is_empty() {
            println!("URL cannot be empty.");
            continue;
        }
        match youtube::parse(input) {
            Ok(_) => return Ok(Some(input.to_owned())),
            Err(e) => println!("Invalid YouTube URL: {e}"),
        }
    }
}

fn prompt_yes_no(message: &str) -> anyhow::Result<bool> {
    let line = prompt_line(message)?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn prompt_line(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    Ok(line)
}

#[cfg(feature = "whisper-rs")]
fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run completed for video {}", summary.video_id);
    println!(
        "  Transcript: {} ({} words, {} characters, {} bytes)",
        summary.transcript_path.display(),
        summary.word_count,
        summary.char_count,
        summary.transcript_bytes
    );
    if let Some(language) = &summary.language {
        println!("  Detected language: {language}");
    }
    println!(
        "  Timings: fetch {:.1}s, transcribe {:.1}s",
        summary.timings.fetch.as_secs_f64(),
        summary.timings.transcribe.as_secs_f64()
    );

    let Some(artifacts) = &summary.analysis else {
        return;
    };
    let report = &artifacts.report;

    println!();
    println!("==================================================");
    println!(" EMOTION ANALYSIS");
    println!("==================================================");
    println!(" Overall mood: {}", report.overall_mood);
    println!(" Confidence score: {:.2}", report.confidence_score);
    println!();
    println!(" Tone:");
    println!(
        "   Average pitch: {:.1} Hz",
        report.tone_analysis.avg_pitch_hz
    );
    println!("   Average energy: {:.3}", report.tone_analysis.avg_energy);
    println!(
        "   Speaking rate: {:.1} words/min",
        report.tone_analysis.speaking_rate_wpm
    );
    println!(
        "   Pause frequency: {:.2}",
        report.tone_analysis.pause_frequency
    );
    println!();
    println!(" Speech patterns:");
    println!(
        "   Duration: {:.1} s",
        report.speech_patterns.duration_seconds
    );
    println!(
        "   Volume variability: {:.3}",
        report.speech_patterns.volume_variability
    );
    println!(
        "   Pitch variability: {:.1}",
        report.speech_patterns.pitch_variability
    );
    println!();
    println!(" Distribution:");
    for (label, entry) in &report.emotion_distribution {
        println!(
            "   {}: {:.1}% ({} segments)",
            label, entry.percentage, entry.segment_count
        );
    }
    println!();
    println!(" Report: {}", artifacts.report_path.display());
    if let Some(chart) = &artifacts.chart_path {
        println!(" Chart: {}", chart.display());
    }
}

fn init_tracing(
    layout: &OutputLayout,
    level: &str,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    let log_path = layout.logs_dir.join(format!(
        "yt-transcriber_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = std::fs::File::create(&log_path)
        .with_context(|| format!("cannot create log file {}", log_path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();
    Ok(guard)
}
