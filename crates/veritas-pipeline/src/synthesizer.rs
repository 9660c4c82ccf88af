//! Final score synthesis across both modalities.

use std::sync::Arc;

use tracing::{error, info};
use veritas_gemini::InferenceClient;
use veritas_models::{format_score, CueAnalysisResult, FinalScoreResult};

use crate::error::SynthesisError;
use crate::parser::parse_structured;

/// Combines the audio and video analyses into one truth score.
///
/// Text-only: no file is uploaded for this call.
#[derive(Clone)]
pub struct ScoreSynthesizer {
    client: Arc<dyn InferenceClient>,
}

impl ScoreSynthesizer {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    pub async fn synthesize(
        &self,
        audio: &CueAnalysisResult,
        video: &CueAnalysisResult,
    ) -> Result<FinalScoreResult, SynthesisError> {
        info!("--- Starting Combined Analysis ---");

        let prompt = build_prompt(audio, video);
        let text = self.client.generate(&prompt, None).await.map_err(|e| {
            error!("Error during final analysis: {}", e);
            SynthesisError::Inference(e)
        })?;

        let result: FinalScoreResult = parse_structured(&text)?;
        info!("Final truth score: {}", format_score(result.truth_score));
        Ok(result)
    }
}

/// Build the synthesis prompt.
///
/// Absent scores are written as `N/A`, absent proxies as `[]`, empty analysis
/// text as a short placeholder.
pub fn build_prompt(audio: &CueAnalysisResult, video: &CueAnalysisResult) -> String {
    let audio_analysis = text_or(&audio.analysis, "No audio analysis available.");
    let video_analysis = text_or(&video.analysis, "No video analysis available.");

    format!(
        r#"
Two independent analyses of the same person speaking are given below: one
based on their voice, one based on their visible behaviour. Act as the final
arbiter and combine them into a single "truth_score" from 0 (very truthful)
to 10 (very deceptive).

Audio Analysis:
- Analysis Text: "{audio_analysis}"
- Reported Audio Score (0-10): {audio_score}
- Detected Vocal Proxies: {audio_proxies}

Video Analysis:
- Analysis Text: "{video_analysis}"
- Reported Video Score (0-10): {video_score}
- Detected Visual Proxies: {video_proxies}

Write a synthesized summary that draws on both analyses and the specific
proxies detected. If the modalities contradict each other (for example a calm
voice but very nervous body language), say so explicitly. State whether the
vocal and visual proxies support or contradict each other.

Finish with the final "truth_score".

Reply with a single valid JSON object and nothing else, shaped like:
{{
  "summary": "Combined summary noting contradictions and proxy correlations...",
  "truth_score": <number from 0 to 10>
}}
"#,
        audio_score = format_score(audio.deception_score),
        audio_proxies = format_proxies(&audio.detected_proxies),
        video_score = format_score(video.deception_score),
        video_proxies = format_proxies(&video.detected_proxies),
    )
}

fn text_or<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}

fn format_proxies(proxies: &[String]) -> String {
    serde_json::to_string(proxies).unwrap_or_else(|_| "[]".to_string())
}
