//! Deception-cue analysis CLI.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use veritas_gemini::{GeminiClient, GeminiConfig};
use veritas_media::{check_ffmpeg, check_ffprobe, FfmpegDemuxer};
use veritas_pipeline::{render, PipelineConfig, PipelineController};

/// Analyze a video for vocal and visual deception cues.
#[derive(Debug, Parser)]
#[command(name = "veritas", version, about)]
struct Cli {
    /// Video file to analyze
    video: PathBuf,

    /// Gemini model to use
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Directory for the temporary audio file
    #[arg(long, env = "VERITAS_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Run the audio and video analyses concurrently
    #[arg(long)]
    concurrent: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // TLS for reqwest
    let _ = rustls::crypto::ring::default_provider().install_default();

    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut gemini = GeminiConfig::from_env().context("Gemini API key not configured")?;
    if let Some(model) = cli.model {
        gemini = gemini.with_model(model);
    }

    let mut config = PipelineConfig::from_env();
    if let Some(dir) = cli.work_dir {
        config.work_dir = dir;
    }
    config.concurrent_analysis |= cli.concurrent;

    check_ffmpeg().context("ffmpeg is required to extract audio")?;
    check_ffprobe().context("ffprobe is required to inspect the video")?;

    info!("Using model {}", gemini.model);
    let client = Arc::new(GeminiClient::new(gemini)?);
    let demuxer = Arc::new(FfmpegDemuxer::new().with_timeout(config.extract_timeout_secs));

    let mut controller = PipelineController::new(client, demuxer, config)?;
    let report = controller
        .run(&cli.video)
        .await
        .with_context(|| format!("analysis of {} failed", cli.video.display()))?;

    println!("{}", render(&report));
    Ok(report.exit_code())
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("veritas=info,warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false),
            )
            .with(env_filter)
            .init();
    }
}
