//! Pipeline controller.
//!
//! Orchestrates one run: extract audio, analyze both modalities, synthesize
//! a final score when both analyses succeed, and clean up the temp audio on
//! every exit path.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;
use veritas_gemini::InferenceClient;
use veritas_media::{audio_codec_args, Demuxer};
use veritas_models::{CueAnalysisResult, FinalScoreResult, MediaFile};

use crate::analyzer::CueAnalyzer;
use crate::config::PipelineConfig;
use crate::error::{AnalysisError, PipelineError, PipelineResult, SynthesisError};
use crate::extractor::AudioExtractor;
use crate::logging::RunLogger;
use crate::synthesizer::ScoreSynthesizer;
use crate::uploader::Uploader;

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Init,
    Extracting,
    AnalyzingAudio,
    AnalyzingVideo,
    Synthesizing,
    Reporting,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Init => "init",
            PipelineStage::Extracting => "extracting",
            PipelineStage::AnalyzingAudio => "analyzing_audio",
            PipelineStage::AnalyzingVideo => "analyzing_video",
            PipelineStage::Synthesizing => "synthesizing",
            PipelineStage::Reporting => "reporting",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a stage produced no result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub message: String,
    /// Model output that could not be decoded, if that was the failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl StageFailure {
    fn analysis(stage: PipelineStage, error: &AnalysisError) -> Self {
        Self {
            stage,
            message: error.to_string(),
            raw_response: error.raw_response().map(str::to_string),
        }
    }

    fn synthesis(error: &SynthesisError) -> Self {
        Self {
            stage: PipelineStage::Synthesizing,
            message: error.to_string(),
            raw_response: error.raw_response().map(str::to_string),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineReport {
    /// Both analyses succeeded. `final_score` is `None` when synthesis failed.
    Complete {
        audio: CueAnalysisResult,
        video: CueAnalysisResult,
        final_score: Option<FinalScoreResult>,
        synthesis_error: Option<StageFailure>,
    },
    /// At least one analysis failed; synthesis was skipped.
    Partial {
        audio: Option<CueAnalysisResult>,
        video: Option<CueAnalysisResult>,
        failures: Vec<StageFailure>,
    },
    /// Nothing could be analyzed.
    Aborted { reason: String },
}

impl PipelineReport {
    pub fn is_complete(&self) -> bool {
        matches!(self, PipelineReport::Complete { .. })
    }

    pub fn truth_score(&self) -> Option<f64> {
        match self {
            PipelineReport::Complete {
                final_score: Some(score),
                ..
            } => score.truth_score,
            _ => None,
        }
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineReport::Complete {
                synthesis_error: None,
                ..
            } => 0,
            PipelineReport::Complete { .. } | PipelineReport::Partial { .. } => 2,
            PipelineReport::Aborted { .. } => 1,
        }
    }
}

/// Runs the full analysis for one video.
pub struct PipelineController {
    extractor: AudioExtractor,
    audio_analyzer: CueAnalyzer,
    video_analyzer: CueAnalyzer,
    synthesizer: ScoreSynthesizer,
    concurrent: bool,
    stage: PipelineStage,
    history: Vec<PipelineStage>,
}

impl PipelineController {
    /// Create a controller.
    ///
    /// Fails when the configured audio extension has no known codec.
    pub fn new(
        client: Arc<dyn InferenceClient>,
        demuxer: Arc<dyn Demuxer>,
        config: PipelineConfig,
    ) -> PipelineResult<Self> {
        audio_codec_args(&config.audio_extension).map_err(|e| {
            PipelineError::config(format!(
                "unusable audio extension '{}': {}",
                config.audio_extension, e
            ))
        })?;

        let uploader = Uploader::new(client.clone(), config.upload.clone());

        Ok(Self {
            extractor: AudioExtractor::new(demuxer, &config.work_dir, &config.audio_extension),
            audio_analyzer: CueAnalyzer::audio(uploader.clone(), client.clone()),
            video_analyzer: CueAnalyzer::video(uploader, client.clone()),
            synthesizer: ScoreSynthesizer::new(client),
            concurrent: config.concurrent_analysis,
            stage: PipelineStage::Init,
            history: vec![PipelineStage::Init],
        })
    }

    /// Current stage.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Stages entered during the last run, in order.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.history
    }

    /// Analyze `video`.
    ///
    /// Stage failures are reported in the returned [`PipelineReport`]; only a
    /// missing input ends the run with an error.
    pub async fn run(&mut self, video: &Path) -> PipelineResult<PipelineReport> {
        let is_file = tokio::fs::metadata(video)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(PipelineError::InputNotFound(video.to_path_buf()));
        }

        self.stage = PipelineStage::Init;
        self.history = vec![PipelineStage::Init];

        let logger = RunLogger::new(&video.display().to_string());
        let span = logger.create_span();
        self.execute(MediaFile::video(video), &logger)
            .instrument(span)
            .await
    }

    async fn execute(
        &mut self,
        video: MediaFile,
        logger: &RunLogger,
    ) -> PipelineResult<PipelineReport> {
        logger.log_start();

        self.transition(logger, PipelineStage::Extracting);
        let artifact = match self.extractor.extract(&video).await {
            Ok(artifact) => artifact,
            Err(e) => {
                if e.is_no_audio_track() {
                    logger.log_warning(PipelineStage::Extracting, &e.to_string());
                } else {
                    logger.log_error(PipelineStage::Extracting, &e.to_string());
                }
                self.transition(logger, PipelineStage::Done);
                return Ok(PipelineReport::Aborted {
                    reason: format!("Failed to extract audio: {}", e),
                });
            }
        };
        let audio = MediaFile::audio(artifact.path());

        let (audio_result, video_result) = if self.concurrent {
            self.transition(logger, PipelineStage::AnalyzingAudio);
            self.transition(logger, PipelineStage::AnalyzingVideo);
            tokio::join!(
                self.audio_analyzer.analyze(&audio),
                self.video_analyzer.analyze(&video)
            )
        } else {
            self.transition(logger, PipelineStage::AnalyzingAudio);
            let audio_result = self.audio_analyzer.analyze(&audio).await;
            self.transition(logger, PipelineStage::AnalyzingVideo);
            let video_result = self.video_analyzer.analyze(&video).await;
            (audio_result, video_result)
        };

        let report = match (audio_result, video_result) {
            (Ok(audio), Ok(video)) => {
                self.transition(logger, PipelineStage::Synthesizing);
                match self.synthesizer.synthesize(&audio, &video).await {
                    Ok(final_score) => PipelineReport::Complete {
                        audio,
                        video,
                        final_score: Some(final_score),
                        synthesis_error: None,
                    },
                    Err(e) => {
                        logger.log_error(PipelineStage::Synthesizing, &e.to_string());
                        PipelineReport::Complete {
                            audio,
                            video,
                            final_score: None,
                            synthesis_error: Some(StageFailure::synthesis(&e)),
                        }
                    }
                }
            }
            (audio, video) => {
                let mut failures = Vec::new();
                if let Err(e) = &audio {
                    logger.log_error(PipelineStage::AnalyzingAudio, &e.to_string());
                    failures.push(StageFailure::analysis(PipelineStage::AnalyzingAudio, e));
                }
                if let Err(e) = &video {
                    logger.log_error(PipelineStage::AnalyzingVideo, &e.to_string());
                    failures.push(StageFailure::analysis(PipelineStage::AnalyzingVideo, e));
                }
                logger.log_warning(
                    PipelineStage::Synthesizing,
                    "skipping final analysis, not all analyses succeeded",
                );
                PipelineReport::Partial {
                    audio: audio.ok(),
                    video: video.ok(),
                    failures,
                }
            }
        };

        self.transition(logger, PipelineStage::Reporting);

        if let Err(e) = artifact.remove() {
            logger.log_warning(
                PipelineStage::Reporting,
                &format!("could not remove temporary audio: {}", e),
            );
        }

        self.transition(logger, PipelineStage::Done);
        logger.log_completion(match &report {
            PipelineReport::Complete { .. } => "complete",
            PipelineReport::Partial { .. } => "partial",
            PipelineReport::Aborted { .. } => "aborted",
        });
        Ok(report)
    }

    fn transition(&mut self, logger: &RunLogger, to: PipelineStage) {
        logger.log_stage(self.stage, to);
        self.stage = to;
        self.history.push(to);
    }
}
